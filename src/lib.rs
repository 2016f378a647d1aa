//! # recpipe
//!
//! Parallel batch processing of delimited records read from byte streams.
//!
//! `recpipe` speeds up command-line data-transformation filters: read a few
//! million newline- or element-delimited records, apply a pure per-record
//! transformation (parse, filter, re-serialize), write the result. The
//! transformation runs concurrently over batches of records on a fixed
//! worker pool; a single buffered sink collects the output.
//!
//! - **Line mode** - records are separator-delimited (newline by default)
//!   and dispatched in batches of a configurable record count
//! - **Splitter mode** - records come from a pluggable [`Splitter`]; the
//!   built-in [`TagSplitter`] cuts a stream of XML-ish bytes into batches
//!   of complete `<tag>...</tag>` elements under bounded memory
//!
//! ## Design Philosophy
//!
//! This crate intentionally maintains a narrow scope and focuses on doing
//! one thing well: **run a byte-to-byte transformation in parallel over a
//! record stream**. It deliberately does not:
//!
//! - Preserve input record order (results arrive in completion order)
//! - Parse or validate record contents (records are opaque byte spans)
//! - Manage files or file paths (user provides [`std::io::Read`] and
//!   [`std::io::Write`] endpoints)
//! - Retry or interpret transformation failures (the first error is
//!   returned, the rest is the user's policy)
//!
//! ## Concurrency Model
//!
//! The driving thread reads and batches records, `num_workers` threads
//! transform batches, one sink thread writes results. All channels are
//! rendezvous channels, giving end-to-end backpressure without a
//! coordinator. Every thread is joined before [`Pipeline::run`] returns,
//! under success, failure, and cancellation alike.
//!
//! # Examples
//!
//! ## Uppercase every line
//!
//! ```
//! use std::io::Cursor;
//! use bytes::Bytes;
//! use recpipe::Pipeline;
//!
//! let mut output = Vec::new();
//! Pipeline::new(Cursor::new("hello\nworld\n"), &mut output, |record| {
//!     Ok(Bytes::from(record.to_ascii_uppercase()))
//! })
//! .run()?;
//!
//! assert_eq!(output.len(), 12);
//! # Ok::<(), recpipe::PipelineError>(())
//! ```
//!
//! ## Split a stream on XML elements
//!
//! ```
//! use std::io::Cursor;
//! use bytes::Bytes;
//! use recpipe::{Pipeline, TagSplitter};
//!
//! let input = "<record>1</record>junk<record>2</record>";
//! let mut output = Vec::new();
//!
//! Pipeline::new(Cursor::new(input), &mut output, |batch| {
//!     // `batch` holds one or more complete <record> elements.
//!     Ok(Bytes::copy_from_slice(batch))
//! })
//! .with_splitter(TagSplitter::new("record"))
//! .run()?;
//!
//! assert_eq!(output.len(), 36);
//! # Ok::<(), recpipe::PipelineError>(())
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

// Public modules
pub mod config;
mod error;
mod pipeline;
mod source;
mod split;

// Internal modules (implementation details)
mod buffer; // pooled byte buffers for batch dispatch

//
// Public API surface
//
// The public API is intentionally minimal. Only essential types are
// exported to keep the surface area small and the API stable.
//

/// Pipeline entry point and cancellation.
pub use pipeline::{CancelToken, Pipeline};

/// Configuration options for pipeline behavior.
pub use config::PipelineConfig;

/// Error types for pipeline runs.
pub use error::{PipelineError, TransformError};

/// Record splitting contract and built-in splitters.
pub use split::{LineSplitter, SplitStep, Splitter, TagSplitter};

/// Lazy record iteration over a reader.
pub use source::RecordSource;
