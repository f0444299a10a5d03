use anyhow::{Context, Result};
use log::debug;
use std::path::Path;
use std::sync::Arc;
use std::thread::JoinHandle;

use crate::engine::codec::Codec;
use crate::engine::tools::{canonical_output_dir, canonicalize_root};
use crate::{Opts, RunSummary};

use super::cancel::CancelToken;
use super::context::{PersistContext, PipelineChannels, PipelineHandles, create_pipeline_channels};
use super::error_handler::{ErrorSlot, check_for_pipeline_error, fail_pipeline};
use super::persist::persist_all;
use super::walk::spawn_walk_thread;
use super::workers::spawn_thumbnail_workers;

/// Start the walk thread and `num_workers` thumbnail workers. The caller receives from
/// `result_rx` and must then join with [`shutdown_pipeline_handles`].
pub fn spawn_pipeline(channels: PipelineChannels, num_workers: usize) -> PipelineHandles {
    let PipelineChannels {
        path_tx,
        path_rx,
        result_tx,
        result_rx,
        walk_err_tx,
        walk_err_rx,
        walk_ctx,
        worker_ctx,
    } = channels;

    let walk_handle = spawn_walk_thread(path_tx, walk_err_tx, walk_ctx);
    let worker_handles = spawn_thumbnail_workers(path_rx, &result_tx, &worker_ctx, num_workers);

    // Dropping the last sender outside the workers closes the channel once they all exit.
    drop(result_tx);

    PipelineHandles {
        result_rx,
        walk_err_rx,
        walk_handle,
        worker_handles,
    }
}

/// Join the walk thread and every worker. Returns the number of paths the walk delivered.
pub fn shutdown_pipeline_handles(
    walk_handle: JoinHandle<usize>,
    worker_handles: Vec<JoinHandle<()>>,
) -> Result<usize> {
    let discovered = walk_handle
        .join()
        .map_err(|_| anyhow::anyhow!("walk thread panicked"))?;
    let mut panicked = 0_usize;
    for h in worker_handles {
        if h.join().is_err() {
            panicked += 1;
        }
    }
    if panicked > 0 {
        anyhow::bail!("{} thumbnail worker(s) panicked", panicked);
    }
    Ok(discovered)
}

/// Main orchestrator: walk → path channel → workers (decode + resize) → result channel → persister.
///
/// The persister runs on this thread. The first real failure from any stage is recorded and fires
/// `cancel`, which unwinds every blocked send/receive. Returns only after all threads are joined.
/// If `cancel` is fired from outside during the run, the run fails with `Cancelled`.
pub fn run_pipeline(
    root: &Path,
    opts: &Opts,
    codec: Arc<dyn Codec>,
    cancel: &CancelToken,
) -> Result<RunSummary> {
    opts.validate()?;
    let root = canonicalize_root(root)?;
    std::fs::create_dir_all(&opts.output_dir)
        .with_context(|| format!("create output directory {}", opts.output_dir.display()))?;
    let output_canonical = canonical_output_dir(&opts.output_dir);
    debug!(
        "thumbnailing {} -> {} ({} workers, {}x{})",
        root.display(),
        opts.output_dir.display(),
        opts.workers,
        opts.width,
        opts.height
    );

    let errors = ErrorSlot::new();
    let channels = create_pipeline_channels(
        root,
        output_canonical,
        opts,
        Arc::clone(&codec),
        cancel,
        &errors,
    );
    let persist_ctx = PersistContext {
        output_dir: opts.output_dir.clone(),
        codec,
        cancel: cancel.clone(),
        verbose: opts.verbose,
    };

    let PipelineHandles {
        result_rx,
        walk_err_rx,
        walk_handle,
        worker_handles,
    } = spawn_pipeline(channels, opts.workers);

    let written = match persist_all(&result_rx, &persist_ctx) {
        Ok(n) => n,
        Err(err) => {
            fail_pipeline(&errors, cancel, err);
            0
        }
    };
    let cancelled_during_run = cancel.is_cancelled();
    // Any worker still parked on a send sees the disconnect.
    drop(result_rx);

    let discovered = shutdown_pipeline_handles(walk_handle, worker_handles)?;
    if let Ok(Some(walk_err)) = walk_err_rx.try_recv() {
        errors.record(walk_err);
    }
    check_for_pipeline_error(&errors, cancelled_during_run)?;

    debug!("{} paths walked, {} thumbnails written", discovered, written);
    Ok(RunSummary {
        discovered,
        written,
        output_dir: opts.output_dir.clone(),
    })
}
