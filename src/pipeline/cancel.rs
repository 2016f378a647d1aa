//! Cooperative cancellation for running pipelines.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A shared flag that asks a running pipeline to wind down.
///
/// Cancellation is cooperative: the driver stops dispatching new batches at
/// the next record boundary, workers drop batches instead of transforming
/// them, and the channels still close in order so every thread joins. A
/// cancelled run returns [`PipelineError::Cancelled`] unless a real error
/// was latched first.
///
/// [`PipelineError::Cancelled`]: crate::PipelineError::Cancelled
///
/// # Example
///
/// ```
/// use recpipe::CancelToken;
///
/// let token = CancelToken::new();
/// let handle = token.clone();
///
/// // ... hand `token` to a pipeline, then from anywhere:
/// handle.cancel();
/// assert!(token.is_cancelled());
/// ```
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    /// Creates a token in the not-cancelled state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation. Idempotent.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    /// True once cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancel_is_visible_to_clones() {
        let token = CancelToken::new();
        let clone = token.clone();
        assert!(!clone.is_cancelled());

        token.cancel();
        assert!(clone.is_cancelled());

        // Idempotent.
        clone.cancel();
        assert!(token.is_cancelled());
    }
}
