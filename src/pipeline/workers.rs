use crossbeam_channel::{Receiver, Sender, select};
use std::path::{Path, PathBuf};
use std::thread::{self, JoinHandle};

use crate::error::ThumbError;
use crate::types::{Thumbnail, ThumbnailResult};

use super::cancel::CancelToken;
use super::context::WorkerContext;

/// Decode and resize one source. A failed decode returns straight away; resize only ever sees a
/// decoded image.
pub fn make_thumbnail(source: &Path, ctx: &WorkerContext) -> Result<Thumbnail, ThumbError> {
    let decoded = ctx.codec.decode(source)?;
    let image = ctx.codec.thumbnail(&decoded.image, ctx.width, ctx.height);
    Ok(Thumbnail {
        image,
        format: decoded.format,
    })
}

/// Pull the next path, or None when the input is closed or the token fired.
fn next_path(path_rx: &Receiver<PathBuf>, cancel: &CancelToken) -> Option<PathBuf> {
    if cancel.is_cancelled() {
        return None;
    }
    select! {
        recv(path_rx) -> msg => msg.ok(),
        recv(cancel.receiver()) -> _ => None,
    }
}

/// Hand a result to the persister unless the token fires first. False means stop.
fn emit_result(
    result_tx: &Sender<ThumbnailResult>,
    result: ThumbnailResult,
    cancel: &CancelToken,
) -> bool {
    if cancel.is_cancelled() {
        return false;
    }
    select! {
        send(result_tx, result) -> res => res.is_ok(),
        recv(cancel.receiver()) -> _ => false,
    }
}

/// Single worker: read paths from path_rx, thumbnail them, send results on result_tx.
/// Exits when path_rx closes or the token fires; an item in hand at cancel time is dropped.
fn thumbnail_worker_loop(
    id: usize,
    path_rx: Receiver<PathBuf>,
    result_tx: Sender<ThumbnailResult>,
    ctx: WorkerContext,
) {
    let mut done = 0_usize;
    while let Some(source) = next_path(&path_rx, &ctx.cancel) {
        let result = match make_thumbnail(&source, &ctx) {
            Ok(thumb) => ThumbnailResult::ok(source, thumb),
            Err(err) => {
                log::debug!("{}", err);
                ThumbnailResult::err(source, err)
            }
        };
        if !emit_result(&result_tx, result, &ctx.cancel) {
            break;
        }
        done += 1;
    }
    log::debug!("worker {} exiting after {} items", id, done);
    drop(result_tx);
}

/// Spawn `num_workers` thumbnail workers sharing `path_rx`. Each holds its own clone of `result_tx`;
/// the caller must drop its sender after this so the result channel closes once the last worker exits.
pub fn spawn_thumbnail_workers(
    path_rx: Receiver<PathBuf>,
    result_tx: &Sender<ThumbnailResult>,
    ctx: &WorkerContext,
    num_workers: usize,
) -> Vec<JoinHandle<()>> {
    (0..num_workers)
        .map(|id| {
            let path_rx = path_rx.clone();
            let result_tx = result_tx.clone();
            let ctx = ctx.clone();
            thread::spawn(move || thumbnail_worker_loop(id, path_rx, result_tx, ctx))
        })
        .collect()
}
