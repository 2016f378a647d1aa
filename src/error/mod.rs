//! Error types for recpipe.
//!
//! This module defines the error type used throughout the crate.
//!
//! - [`PipelineError`] - Represents all possible errors during a pipeline run
//! - [`TransformError`] - Boxed error returned by user transformations

use std::fmt;

/// Boxed error type returned by user transformations.
///
/// Transformations are free to fail with any error type; the pipeline only
/// forwards the first observed failure out of [`Pipeline::run`].
///
/// [`Pipeline::run`]: crate::Pipeline::run
pub type TransformError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors that can occur while running a pipeline or splitting a stream.
///
/// The pipeline returns at most one error per run: the first one observed by
/// the driver, a worker, or the sink. Concurrent later errors are discarded.
///
/// # Example
///
/// ```
/// use recpipe::PipelineError;
///
/// fn handle_error(err: PipelineError) {
///     match err {
///         PipelineError::Io(io_err) => eprintln!("I/O error: {}", io_err),
///         PipelineError::Transform(e) => eprintln!("transform failed: {}", e),
///         other => eprintln!("{}", other),
///     }
/// }
/// ```
#[derive(Debug)]
pub enum PipelineError {
    /// An I/O error occurred while reading input or writing output.
    Io(std::io::Error),

    /// Invalid configuration parameter.
    ///
    /// Raised on first use, e.g. when `num_workers` or `batch_size` is zero.
    InvalidConfig {
        /// Description of what was invalid.
        message: &'static str,
    },

    /// The tag splitter was used without a tag.
    TagRequired,

    /// A closing tag appeared before any opening tag.
    ///
    /// The input is likely not well-formed, or the stream started in the
    /// middle of an element.
    GarbledInput,

    /// An element contained a nested element with the same name.
    ///
    /// Self-similar nesting is diagnosed, not handled.
    NestedTagsUnsupported,

    /// The splitter scratch buffer exceeded its hard cap.
    ///
    /// Raised when a single element grows past the limit, which usually
    /// means the input is not the expected format.
    MaxBufferExceeded {
        /// The configured hard cap in bytes.
        limit: usize,
    },

    /// A user transformation returned an error.
    Transform(TransformError),

    /// The run was cancelled through a [`CancelToken`].
    ///
    /// [`CancelToken`]: crate::CancelToken
    Cancelled,
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineError::Io(e) => write!(f, "io error: {}", e),
            PipelineError::InvalidConfig { message } => {
                write!(f, "invalid config: {}", message)
            }
            PipelineError::TagRequired => write!(f, "tag required"),
            PipelineError::GarbledInput => {
                write!(f, "garbled input: closing tag before opening tag")
            }
            PipelineError::NestedTagsUnsupported => {
                write!(f, "nested tags with the same name are not supported")
            }
            PipelineError::MaxBufferExceeded { limit } => {
                write!(f, "splitter buffer exceeded {} bytes", limit)
            }
            PipelineError::Transform(e) => write!(f, "transform error: {}", e),
            PipelineError::Cancelled => write!(f, "cancelled"),
        }
    }
}

impl std::error::Error for PipelineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PipelineError::Io(e) => Some(e),
            PipelineError::Transform(e) => Some(e.as_ref()),
            _ => None,
        }
    }
}

impl From<std::io::Error> for PipelineError {
    fn from(e: std::io::Error) -> Self {
        PipelineError::Io(e)
    }
}
