//! Walk loop: consumes an iterator of [`WalkOutcome`], classifies regular files and hands accepted
//! image paths to the worker pool one at a time.

use crossbeam_channel::{Sender, select};
use std::path::{Path, PathBuf};
use std::thread::{self, JoinHandle};

use crate::engine::tools::{classify, is_within};
use crate::error::ThumbError;
use crate::utils::config::is_accepted_mime;

use super::cancel::CancelToken;
use super::context::WalkContext;
use super::error_handler::fail_pipeline;

/// One result from a directory walk.
pub enum WalkOutcome {
    /// Regular file (after following links, when enabled).
    File(PathBuf),
    /// Directory, symlink, socket, fifo... Skipped without error.
    Other(PathBuf),
    Err(ThumbError),
}

/// Convert a walkdir result into [`WalkOutcome`].
pub fn to_outcome_walkdir(r: Result<walkdir::DirEntry, walkdir::Error>) -> WalkOutcome {
    match r {
        Ok(entry) if entry.file_type().is_file() => WalkOutcome::File(entry.into_path()),
        Ok(entry) => WalkOutcome::Other(entry.into_path()),
        Err(err) => WalkOutcome::Err(err.into()),
    }
}

fn walkdir_iter(ctx: &WalkContext) -> Box<dyn Iterator<Item = WalkOutcome>> {
    Box::new(
        walkdir::WalkDir::new(&ctx.root)
            .follow_links(ctx.follow_links)
            .into_iter()
            .map(to_outcome_walkdir),
    )
}

pub fn spawn_walk_thread(
    path_tx: Sender<PathBuf>,
    walk_err_tx: Sender<Option<ThumbError>>,
    ctx: WalkContext,
) -> JoinHandle<usize> {
    thread::spawn(move || {
        let iter = walkdir_iter(&ctx);
        run_walk_loop(path_tx, walk_err_tx, ctx, iter)
    })
}

/// Accept `path` as a source image or explain why not.
pub fn check_source(path: &Path) -> Result<(), ThumbError> {
    let mime = classify(path)?;
    if !is_accepted_mime(&mime) {
        return Err(ThumbError::UnsupportedType {
            path: path.to_path_buf(),
            mime,
        });
    }
    Ok(())
}

/// Deliver `path` unless the token fires first. Checked before blocking so a fired token always wins.
pub fn send_path(
    path_tx: &Sender<PathBuf>,
    path: PathBuf,
    cancel: &CancelToken,
) -> Result<(), ThumbError> {
    if cancel.is_cancelled() {
        return Err(ThumbError::Cancelled);
    }
    select! {
        send(path_tx, path) -> res => res.map_err(|_| ThumbError::Cancelled),
        recv(cancel.receiver()) -> _ => Err(ThumbError::Cancelled),
    }
}

/// Run the walk loop over `iter`: skip non-regular entries and the output directory, stop on the
/// first traversal / classification / type error (recorded and cancelling the run), stop with
/// [`ThumbError::Cancelled`] when the token fires during a send.
///
/// Always drops `path_tx` and sends the terminal outcome on `walk_err_tx` (capacity 1, never blocks).
/// Returns the number of paths delivered.
pub fn run_walk_loop<I>(
    path_tx: Sender<PathBuf>,
    walk_err_tx: Sender<Option<ThumbError>>,
    ctx: WalkContext,
    iter: I,
) -> usize
where
    I: Iterator<Item = WalkOutcome>,
{
    let mut count = 0_usize;
    let mut terminal: Option<ThumbError> = None;
    for outcome in iter {
        let path = match outcome {
            WalkOutcome::File(path) => path,
            WalkOutcome::Other(_) => continue,
            WalkOutcome::Err(err) => {
                terminal = Some(err);
                break;
            }
        };
        if let Some(out) = &ctx.output_canonical
            && is_within(&path, out)
        {
            continue;
        }
        if let Err(err) = check_source(&path) {
            terminal = Some(err);
            break;
        }
        if let Err(err) = send_path(&path_tx, path, &ctx.cancel) {
            terminal = Some(err);
            break;
        }
        count += 1;
    }
    drop(path_tx);

    match &terminal {
        Some(err) if !err.is_cancellation() => {
            log::debug!("walk stopped after {} paths: {}", count, err);
            fail_pipeline(&ctx.errors, &ctx.cancel, err.clone());
        }
        Some(_) => log::debug!("walk canceled after {} paths", count),
        None => log::debug!("walk finished: {} paths", count),
    }
    let _ = walk_err_tx.send(terminal);
    count
}
