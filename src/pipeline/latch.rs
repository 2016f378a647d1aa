//! First-error latch shared by the driver, workers, and sink.

use std::sync::{Arc, OnceLock};

use crate::error::PipelineError;

/// A write-once cell holding the first error observed during a run.
///
/// Workers, the sink, and the driver all hold clones; the first `set` wins
/// and later errors are discarded. The driver polls `is_set` at batch
/// boundaries only, which keeps the hot path free of contention, and moves
/// the error out with `into_error` after every thread has joined.
#[derive(Clone)]
pub(crate) struct ErrorLatch {
    cell: Arc<OnceLock<PipelineError>>,
}

impl ErrorLatch {
    pub(crate) fn new() -> Self {
        Self {
            cell: Arc::new(OnceLock::new()),
        }
    }

    /// Records the error if none has been recorded yet.
    pub(crate) fn set(&self, err: PipelineError) {
        let _ = self.cell.set(err);
    }

    /// True once any error has been recorded.
    pub(crate) fn is_set(&self) -> bool {
        self.cell.get().is_some()
    }

    /// Moves the recorded error out.
    ///
    /// Only meaningful after all other clones have been dropped, i.e. after
    /// workers and sink have joined; a still-shared latch yields `None`.
    pub(crate) fn into_error(self) -> Option<PipelineError> {
        Arc::try_unwrap(self.cell).ok().and_then(OnceLock::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_write_wins() {
        let latch = ErrorLatch::new();
        assert!(!latch.is_set());

        latch.set(PipelineError::TagRequired);
        latch.set(PipelineError::GarbledInput);
        assert!(latch.is_set());

        let err = latch.into_error().unwrap();
        assert!(matches!(err, PipelineError::TagRequired));
    }

    #[test]
    fn test_empty_latch_yields_none() {
        let latch = ErrorLatch::new();
        assert!(latch.into_error().is_none());
    }

    #[test]
    fn test_set_across_threads() {
        let latch = ErrorLatch::new();
        std::thread::scope(|scope| {
            for _ in 0..4 {
                let latch = latch.clone();
                scope.spawn(move || latch.set(PipelineError::Cancelled));
            }
        });
        assert!(matches!(
            latch.into_error(),
            Some(PipelineError::Cancelled)
        ));
    }
}
