//! Cooperative cancellation for batch runs
//!
//! The pipeline checks the token before each record and before each
//! inter-batch pause. A call already in flight runs to completion.

use super::EnhancementError;
use crate::tip::TipId;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;

/// Shared cancellation flag. Clones observe the same state.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    requested: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_cancelled(&self) -> bool {
        self.requested.load(Ordering::Acquire)
    }

    /// Request cancellation. Takes effect at the next check; repeated
    /// requests are ignored.
    pub fn cancel(&self) {
        if !self.requested.swap(true, Ordering::AcqRel) {
            info!("cancellation requested, stopping before the next tip");
        }
    }

    /// `Err(Cancelled)` for `tip_id` once cancellation has been requested
    pub fn check(&self, tip_id: &TipId) -> Result<(), EnhancementError> {
        if self.is_cancelled() {
            Err(EnhancementError::Cancelled {
                tip_id: tip_id.clone(),
            })
        } else {
            Ok(())
        }
    }
}
