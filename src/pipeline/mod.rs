//! Parallel record pipeline - the public entry point.
//!
//! - [`Pipeline`] - reads records, transforms them on a worker pool, writes
//!   results
//! - [`CancelToken`] - cooperative cancellation of a running pipeline

use std::io::{Read, Write};

use bytes::Bytes;

use crate::config::PipelineConfig;
use crate::error::{PipelineError, TransformError};
use crate::split::Splitter;

mod batch;
mod cancel;
mod dispatch;
mod latch;

pub use cancel::CancelToken;

/// A parallel record-processing pipeline.
///
/// `Pipeline` reads records from an input stream, groups them into batches,
/// applies a user transformation concurrently on a pool of worker threads,
/// and writes the results through a single buffered sink. Record order is
/// **not** preserved: the sink writes results in worker completion order,
/// which differs between runs.
///
/// By default records are lines (see
/// [`with_record_separator`](Pipeline::with_record_separator)); installing
/// a custom [`Splitter`] switches the pipeline to splitter mode, where each
/// splitter token is dispatched as one batch and the line-mode knobs
/// (`batch_size`, `record_separator`, `skip_empty`) are ignored.
///
/// The transformation runs concurrently on multiple workers with disjoint
/// inputs and must be [`Sync`]; the pipeline does not guard against side
/// effects inside it. The first error observed by any worker, the sink, or
/// the driver stops dispatch, drains in-flight work, and is returned from
/// [`run`](Pipeline::run).
///
/// # Example
///
/// ```
/// use std::io::Cursor;
/// use bytes::Bytes;
/// use recpipe::Pipeline;
///
/// let input = Cursor::new("hello\nworld\n");
/// let mut output = Vec::new();
///
/// Pipeline::new(input, &mut output, |record| {
///     Ok(Bytes::from(record.to_ascii_uppercase()))
/// })
/// .with_num_workers(2)
/// .run()?;
///
/// let mut lines: Vec<&[u8]> = output.split_inclusive(|&b| b == b'\n').collect();
/// lines.sort();
/// assert_eq!(lines, vec![b"HELLO\n".as_slice(), b"WORLD\n".as_slice()]);
/// # Ok::<(), recpipe::PipelineError>(())
/// ```
///
/// # Splitter mode
///
/// ```
/// use std::io::Cursor;
/// use bytes::Bytes;
/// use recpipe::{Pipeline, TagSplitter};
///
/// let input = Cursor::new("<a>1</a>noise<a>2</a>");
/// let mut output = Vec::new();
///
/// Pipeline::new(input, &mut output, |batch| {
///     Ok(Bytes::copy_from_slice(batch))
/// })
/// .with_splitter(TagSplitter::new("a").with_max_bytes(1))
/// .run()?;
///
/// assert_eq!(output.len(), 16); // both elements, in some order
/// # Ok::<(), recpipe::PipelineError>(())
/// ```
pub struct Pipeline<R, W, F> {
    reader: R,
    writer: W,
    transform: F,
    config: PipelineConfig,
    splitter: Option<Box<dyn Splitter>>,
    cancel: Option<CancelToken>,
}

impl<R, W, F> Pipeline<R, W, F>
where
    F: Fn(&[u8]) -> Result<Bytes, TransformError> + Sync,
{
    /// Creates a pipeline with default configuration: line records, one
    /// worker per core, batches of
    /// [`DEFAULT_BATCH_SIZE`](crate::config::DEFAULT_BATCH_SIZE) records,
    /// empty records skipped.
    pub fn new(reader: R, writer: W, transform: F) -> Self {
        Self {
            reader,
            writer,
            transform,
            config: PipelineConfig::default(),
            splitter: None,
            cancel: None,
        }
    }

    /// Replaces the whole configuration.
    pub fn with_config(mut self, config: PipelineConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the number of worker threads.
    pub fn with_num_workers(mut self, n: usize) -> Self {
        self.config = self.config.with_num_workers(n);
        self
    }

    /// Sets the number of records per batch (line mode).
    pub fn with_batch_size(mut self, n: usize) -> Self {
        self.config = self.config.with_batch_size(n);
        self
    }

    /// Sets the record separator byte (line mode).
    pub fn with_record_separator(mut self, sep: u8) -> Self {
        self.config = self.config.with_record_separator(sep);
        self
    }

    /// Sets whether blank records are dropped before dispatch (line mode).
    pub fn with_skip_empty(mut self, skip: bool) -> Self {
        self.config = self.config.with_skip_empty(skip);
        self
    }

    /// Switches from line mode to a custom splitter.
    pub fn with_splitter(mut self, splitter: impl Splitter + 'static) -> Self {
        self.splitter = Some(Box::new(splitter));
        self
    }

    /// Non-builder variant of [`with_splitter`](Pipeline::with_splitter).
    pub fn set_splitter(&mut self, splitter: Box<dyn Splitter>) {
        self.splitter = Some(splitter);
    }

    /// Installs a cancellation token, polled per record by the driver and
    /// per batch by workers.
    pub fn with_cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Returns the current configuration.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }
}

impl<R, W, F> Pipeline<R, W, F>
where
    R: Read,
    W: Write + Send,
    F: Fn(&[u8]) -> Result<Bytes, TransformError> + Sync,
{
    /// Runs the pipeline to completion. Blocking.
    ///
    /// Returns the first error observed during the run, or `Ok(())` once
    /// the input is exhausted and every result has been flushed. On
    /// failure the output contains whatever results were written before
    /// shutdown; no thread outlives this call either way.
    ///
    /// # Errors
    ///
    /// Configuration problems surface immediately; transformation,
    /// splitter, and I/O errors surface after in-flight work has drained.
    pub fn run(self) -> Result<(), PipelineError> {
        dispatch::run(
            self.reader,
            self.writer,
            self.transform,
            self.config,
            self.splitter,
            self.cancel,
        )
    }
}
