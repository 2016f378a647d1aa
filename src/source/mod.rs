//! Record source - lazy record iteration over a reader.
//!
//! [`RecordSource`] couples an [`std::io::Read`] with a
//! [`Splitter`](crate::Splitter) and yields complete records one at a time.
//! It owns the read buffer, compacts it as the splitter consumes input, and
//! hands the splitter an end-of-input flag so buffered partial state can be
//! flushed.

use std::io::Read;

use bytes::Bytes;

use crate::error::PipelineError;
use crate::split::{SplitStep, Splitter};

/// Read size per refill (8 KiB).
const READ_CHUNK_SIZE: usize = 8 * 1024;

/// Iterator over complete records from a reader.
///
/// Reads the underlying stream in fixed-size chunks and drives the splitter
/// over the buffered bytes. The splitter decides what a record is; the
/// source only manages buffering and end-of-input.
///
/// I/O errors from the reader and splitter errors both terminate the
/// iteration; end of input does not count as an error.
///
/// # Example
///
/// ```
/// use std::io::Cursor;
/// use recpipe::{LineSplitter, RecordSource};
///
/// let source = RecordSource::new(Cursor::new("a\nb\n"), LineSplitter::default());
/// let records: Vec<_> = source.collect::<Result<Vec<_>, _>>()?;
/// assert_eq!(records.len(), 2);
/// assert_eq!(&records[0][..], b"a\n");
/// # Ok::<(), recpipe::PipelineError>(())
/// ```
pub struct RecordSource<R, S> {
    reader: R,
    splitter: S,
    /// Buffered input; bytes before `start` are already consumed.
    buf: Vec<u8>,
    start: usize,
    eof: bool,
    done: bool,
}

impl<R: Read, S: Splitter> RecordSource<R, S> {
    /// Creates a record source from a reader and a splitter.
    pub fn new(reader: R, splitter: S) -> Self {
        Self {
            reader,
            splitter,
            buf: Vec::with_capacity(READ_CHUNK_SIZE),
            start: 0,
            eof: false,
            done: false,
        }
    }

    /// Consumes the source and returns the reader and splitter.
    pub fn into_parts(self) -> (R, S) {
        (self.reader, self.splitter)
    }

    /// Drops `advance` consumed bytes from the front of the buffer view.
    fn consume(&mut self, advance: usize) {
        self.start += advance;
        debug_assert!(self.start <= self.buf.len());
        if self.start == self.buf.len() {
            self.buf.clear();
            self.start = 0;
        }
    }

    /// Compacts the buffer and reads one more chunk; sets `eof` when the
    /// reader is exhausted.
    fn refill(&mut self) -> Result<(), PipelineError> {
        if self.start > 0 {
            self.buf.drain(..self.start);
            self.start = 0;
        }
        let mut chunk = [0u8; READ_CHUNK_SIZE];
        let n = self.reader.read(&mut chunk)?;
        if n == 0 {
            self.eof = true;
        } else {
            self.buf.extend_from_slice(&chunk[..n]);
        }
        Ok(())
    }

    fn next_record(&mut self) -> Result<Option<Bytes>, PipelineError> {
        if self.done {
            return Ok(None);
        }
        loop {
            let step = self.splitter.split(&self.buf[self.start..], self.eof)?;
            match step {
                SplitStep::Record { advance, record } => {
                    self.consume(advance);
                    return Ok(Some(record));
                }
                SplitStep::Consumed { advance } if advance > 0 => {
                    self.consume(advance);
                    if self.start >= self.buf.len() && !self.eof {
                        self.refill()?;
                    }
                }
                // NeedMore, or a zero-byte Consumed: enlarge the buffer,
                // or terminate once the stream is exhausted.
                _ => {
                    if self.eof {
                        self.done = true;
                        return Ok(None);
                    }
                    self.refill()?;
                }
            }
        }
    }
}

impl<R: Read, S: Splitter> Iterator for RecordSource<R, S> {
    type Item = Result<Bytes, PipelineError>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.next_record() {
            Ok(Some(record)) => Some(Ok(record)),
            Ok(None) => None,
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}
