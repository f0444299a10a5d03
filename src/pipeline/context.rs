//! Pipeline context and channels: shared data handed to the walk thread, the workers and the persister.

use crossbeam_channel::{Receiver, Sender, bounded};
use std::path::PathBuf;
use std::sync::Arc;
use std::thread::JoinHandle;

use crate::Opts;
use crate::engine::codec::Codec;
use crate::error::ThumbError;

use super::cancel::CancelToken;
use super::error_handler::ErrorSlot;

/// Walk settings. Built in `run_pipeline` and moved into the walk thread.
pub struct WalkContext {
    pub root: PathBuf,
    /// Canonical output directory; never walked.
    pub output_canonical: Option<PathBuf>,
    pub follow_links: bool,
    pub cancel: CancelToken,
    pub errors: ErrorSlot,
}

/// Shared by every worker thread.
#[derive(Clone)]
pub struct WorkerContext {
    pub codec: Arc<dyn Codec>,
    pub width: u32,
    pub height: u32,
    pub cancel: CancelToken,
}

/// Persister settings; runs on the caller's thread.
pub struct PersistContext {
    pub output_dir: PathBuf,
    pub codec: Arc<dyn Codec>,
    pub cancel: CancelToken,
    pub verbose: bool,
}

/// Handles returned by [`spawn_pipeline`](super::orchestrator::spawn_pipeline): receive results,
/// then join everything with [`shutdown_pipeline_handles`](super::orchestrator::shutdown_pipeline_handles).
pub struct PipelineHandles {
    pub result_rx: Receiver<crate::ThumbnailResult>,
    /// Receives the walk's terminal outcome once, after the walk ends.
    pub walk_err_rx: Receiver<Option<ThumbError>>,
    pub walk_handle: JoinHandle<usize>,
    pub worker_handles: Vec<JoinHandle<()>>,
}

/// Channels and shared state for one run. Walk gets path_tx + walk_err_tx; workers get path_rx + result_tx;
/// the persister gets result_rx.
pub struct PipelineChannels {
    pub path_tx: Sender<PathBuf>,
    pub path_rx: Receiver<PathBuf>,
    pub result_tx: Sender<crate::ThumbnailResult>,
    pub result_rx: Receiver<crate::ThumbnailResult>,
    pub walk_err_tx: Sender<Option<ThumbError>>,
    pub walk_err_rx: Receiver<Option<ThumbError>>,
    pub walk_ctx: WalkContext,
    pub worker_ctx: WorkerContext,
}

/// Build rendezvous channels (capacity 0) between stages and a one-slot channel for the walk's outcome.
pub fn create_pipeline_channels(
    root: PathBuf,
    output_canonical: Option<PathBuf>,
    opts: &Opts,
    codec: Arc<dyn Codec>,
    cancel: &CancelToken,
    errors: &ErrorSlot,
) -> PipelineChannels {
    let (path_tx, path_rx) = bounded::<PathBuf>(0);
    let (result_tx, result_rx) = bounded::<crate::ThumbnailResult>(0);
    let (walk_err_tx, walk_err_rx) = bounded::<Option<ThumbError>>(1);

    let walk_ctx = WalkContext {
        root,
        output_canonical,
        follow_links: opts.follow_links,
        cancel: cancel.clone(),
        errors: errors.clone(),
    };
    let worker_ctx = WorkerContext {
        codec,
        width: opts.width,
        height: opts.height,
        cancel: cancel.clone(),
    };

    PipelineChannels {
        path_tx,
        path_rx,
        result_tx,
        result_rx,
        walk_err_tx,
        walk_err_rx,
        walk_ctx,
        worker_ctx,
    }
}
