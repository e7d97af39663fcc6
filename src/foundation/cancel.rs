use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::foundation::error::{AnimError, AnimResult};

/// Shared cooperative cancellation flag.
///
/// Clones observe the same flag. Nothing is torn down when it is set; pipeline stages poll it at
/// their checkpoints and unwind with [`AnimError::Cancelled`].
#[derive(Clone, Debug, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    /// Create an unset token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Release);
    }

    /// `true` once [`CancelToken::cancel`] has been called on any clone.
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }

    /// Checkpoint: `Err(Cancelled)` when the flag is set.
    pub fn check(&self) -> AnimResult<()> {
        if self.is_cancelled() {
            return Err(AnimError::Cancelled);
        }
        Ok(())
    }
}
