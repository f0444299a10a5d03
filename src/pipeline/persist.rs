//! Persister: the root stage. Runs on the caller's thread and decides whether an item failure is fatal.

use crossbeam_channel::{Receiver, select};
use log::debug;

use crate::engine::progress::{create_counter, finish_counter, report_progress_batched};
use crate::engine::tools::destination_for;
use crate::error::ThumbError;
use crate::types::ThumbnailResult;
use crate::utils::config::ProgressConsts;

use super::cancel::CancelToken;
use super::context::PersistContext;

/// Next result in arrival order; `Ok(None)` once every worker has exited.
fn next_result(
    result_rx: &Receiver<ThumbnailResult>,
    cancel: &CancelToken,
) -> Result<Option<ThumbnailResult>, ThumbError> {
    if cancel.is_cancelled() {
        return Err(ThumbError::Cancelled);
    }
    select! {
        recv(result_rx) -> msg => Ok(msg.ok()),
        recv(cancel.receiver()) -> _ => Err(ThumbError::Cancelled),
    }
}

/// Write one result. An item error is returned as-is; a write failure becomes [`ThumbError::Persist`].
pub fn persist_one(result: ThumbnailResult, ctx: &PersistContext) -> Result<(), ThumbError> {
    let thumb = result.outcome?;
    let dest =
        destination_for(&ctx.output_dir, &result.source).ok_or_else(|| ThumbError::Persist {
            path: result.source.clone(),
            msg: "source has no file name".to_string(),
        })?;
    ctx.codec.save(&thumb, &dest)?;
    debug!("wrote {}", dest.display());
    Ok(())
}

/// Consume results in arrival order until the channel closes. Stops at the first item or write
/// error and returns it; returns [`ThumbError::Cancelled`] if the token fires while waiting.
/// Nothing already written is rolled back. Returns the number of thumbnails written.
pub fn persist_all(
    result_rx: &Receiver<ThumbnailResult>,
    ctx: &PersistContext,
) -> Result<usize, ThumbError> {
    let chunk = ProgressConsts::UPDATE_BATCH_SIZE;
    let mut bar = ctx.verbose.then(|| create_counter("Thumbnails"));
    let mut written = 0_usize;
    let outcome = loop {
        let result = match next_result(result_rx, &ctx.cancel) {
            Ok(Some(result)) => result,
            Ok(None) => break Ok(written),
            Err(err) => break Err(err),
        };
        if let Err(err) = persist_one(result, ctx) {
            break Err(err);
        }
        written += 1;
        report_progress_batched(&mut bar, written, chunk);
    };
    finish_counter(bar, written, chunk);
    outcome
}
