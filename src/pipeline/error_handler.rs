use std::sync::{Arc, Mutex, MutexGuard};

use crate::error::ThumbError;

use super::cancel::CancelToken;

/// Set-once error slot shared by all stages: the first real error recorded wins, later ones are
/// logged and dropped. Cancellation artifacts are never stored.
#[derive(Clone, Default)]
pub struct ErrorSlot {
    first_error: Arc<Mutex<Option<ThumbError>>>,
}

impl ErrorSlot {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Option<ThumbError>> {
        self.first_error
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Record `err` if the slot is empty. Returns true when this call set the slot.
    pub fn record(&self, err: ThumbError) -> bool {
        if err.is_cancellation() {
            return false;
        }
        let mut slot = self.lock();
        if slot.is_some() {
            log::debug!("dropping later error: {}", err);
            return false;
        }
        *slot = Some(err);
        true
    }

    pub fn is_set(&self) -> bool {
        self.lock().is_some()
    }

    pub fn take(&self) -> Option<ThumbError> {
        self.lock().take()
    }
}

/// A stage failed: record the cause (first wins) and fire the shared token so every other stage unwinds.
pub fn fail_pipeline(slot: &ErrorSlot, cancel: &CancelToken, err: ThumbError) {
    if slot.record(err) {
        log::debug!("first failure recorded; cancelling pipeline");
    }
    cancel.cancel();
}

/// Resolve the run after every thread has been joined.
/// A recorded error wins; otherwise a token that fired during the run (an external cancel)
/// surfaces as [`ThumbError::Cancelled`], since some items may have been dropped.
pub fn check_for_pipeline_error(
    slot: &ErrorSlot,
    cancelled_during_run: bool,
) -> Result<(), ThumbError> {
    if let Some(err) = slot.take() {
        return Err(err);
    }
    if cancelled_during_run {
        return Err(ThumbError::Cancelled);
    }
    Ok(())
}
