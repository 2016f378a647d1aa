//! Record splitters - turning a byte stream into complete records.
//!
//! A [`Splitter`] is a small state machine that a [`RecordSource`] drives
//! over successive slices of buffered input:
//!
//! - [`Splitter`] - the incremental split contract
//! - [`SplitStep`] - the outcome of a single split call
//! - [`LineSplitter`] - splits on a single separator byte
//! - [`TagSplitter`] - batches complete XML-ish elements
//!
//! [`RecordSource`]: crate::RecordSource

use bytes::Bytes;

use crate::error::PipelineError;

mod line;
mod tag;

pub use line::LineSplitter;
pub use tag::TagSplitter;

/// Outcome of a single [`Splitter::split`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SplitStep {
    /// More input is required before a record can be produced.
    ///
    /// At end of input this signals final termination.
    NeedMore,

    /// `advance` input bytes were consumed without yielding a record.
    ///
    /// Splitters that buffer internally (like [`TagSplitter`]) consume
    /// every byte they are handed and report progress this way.
    Consumed {
        /// Number of input bytes the caller may discard.
        advance: usize,
    },

    /// A complete record was produced after consuming `advance` bytes.
    Record {
        /// Number of input bytes the caller may discard.
        advance: usize,
        /// The record bytes.
        record: Bytes,
    },
}

/// Incremental splitter over a stream of bytes.
///
/// The caller hands the splitter a slice of buffered input together with an
/// end-of-input flag and acts on the returned [`SplitStep`]:
///
/// - [`SplitStep::NeedMore`] with `at_eof = false`: read more data and call
///   again at the same position.
/// - [`SplitStep::NeedMore`] with `at_eof = true`: the stream is exhausted.
/// - [`SplitStep::Consumed`]: drop `advance` bytes and continue.
/// - [`SplitStep::Record`]: drop `advance` bytes and hand the record on.
///
/// A splitter is an explicit object so that state carried across calls
/// (scratch buffers, precomputed patterns, terminal flags) is visible and
/// testable rather than hidden in captured variables.
///
/// # Example
///
/// ```
/// use recpipe::{LineSplitter, Splitter, SplitStep};
///
/// let mut splitter = LineSplitter::default();
/// let step = splitter.split(b"one\ntwo", false)?;
/// assert!(matches!(step, SplitStep::Record { advance: 4, .. }));
/// # Ok::<(), recpipe::PipelineError>(())
/// ```
pub trait Splitter {
    /// Scans `data` for the next record.
    ///
    /// `at_eof` tells the splitter that no more input will arrive, which is
    /// its cue to flush any buffered partial state.
    fn split(&mut self, data: &[u8], at_eof: bool) -> Result<SplitStep, PipelineError>;
}

impl<S: Splitter + ?Sized> Splitter for Box<S> {
    fn split(&mut self, data: &[u8], at_eof: bool) -> Result<SplitStep, PipelineError> {
        (**self).split(data, at_eof)
    }
}
