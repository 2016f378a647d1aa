//! Line splitting on a single separator byte.

use bytes::Bytes;

use crate::config::DEFAULT_RECORD_SEPARATOR;
use crate::error::PipelineError;

use super::{SplitStep, Splitter};

/// Splits input on a single separator byte, newline by default.
///
/// The separator stays attached to the record, so an identity transformation
/// reproduces the input byte-for-byte (up to record order). A final record
/// without a trailing separator is emitted as-is at end of input.
///
/// Multi-byte separators are not supported; use a custom [`Splitter`] for
/// anything richer.
///
/// # Example
///
/// ```
/// use recpipe::{LineSplitter, Splitter, SplitStep};
///
/// let mut splitter = LineSplitter::new(b',');
/// match splitter.split(b"a,b", true)? {
///     SplitStep::Record { record, .. } => assert_eq!(&record[..], b"a,"),
///     other => panic!("unexpected step: {:?}", other),
/// }
/// # Ok::<(), recpipe::PipelineError>(())
/// ```
#[derive(Debug, Clone, Copy)]
pub struct LineSplitter {
    separator: u8,
}

impl LineSplitter {
    /// Creates a splitter for the given separator byte.
    pub fn new(separator: u8) -> Self {
        Self { separator }
    }

    /// Returns the separator byte.
    pub fn separator(&self) -> u8 {
        self.separator
    }
}

impl Default for LineSplitter {
    fn default() -> Self {
        Self::new(DEFAULT_RECORD_SEPARATOR)
    }
}

impl Splitter for LineSplitter {
    fn split(&mut self, data: &[u8], at_eof: bool) -> Result<SplitStep, PipelineError> {
        match memchr::memchr(self.separator, data) {
            Some(i) => Ok(SplitStep::Record {
                advance: i + 1,
                record: Bytes::copy_from_slice(&data[..=i]),
            }),
            None if at_eof && !data.is_empty() => Ok(SplitStep::Record {
                advance: data.len(),
                record: Bytes::copy_from_slice(data),
            }),
            None => Ok(SplitStep::NeedMore),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(step: SplitStep) -> (usize, Bytes) {
        match step {
            SplitStep::Record { advance, record } => (advance, record),
            other => panic!("expected record, got {:?}", other),
        }
    }

    #[test]
    fn test_split_on_newline() {
        let mut s = LineSplitter::default();
        let (advance, rec) = record(s.split(b"hello\nworld\n", false).unwrap());
        assert_eq!(advance, 6);
        assert_eq!(&rec[..], b"hello\n");
    }

    #[test]
    fn test_need_more_without_separator() {
        let mut s = LineSplitter::default();
        assert_eq!(s.split(b"partial", false).unwrap(), SplitStep::NeedMore);
    }

    #[test]
    fn test_final_record_without_separator() {
        let mut s = LineSplitter::default();
        let (advance, rec) = record(s.split(b"tail", true).unwrap());
        assert_eq!(advance, 4);
        assert_eq!(&rec[..], b"tail");
    }

    #[test]
    fn test_terminates_on_empty_input_at_eof() {
        let mut s = LineSplitter::default();
        assert_eq!(s.split(b"", true).unwrap(), SplitStep::NeedMore);
    }

    #[test]
    fn test_custom_separator() {
        let mut s = LineSplitter::new(b'\0');
        let (advance, rec) = record(s.split(b"a\0b\0", false).unwrap());
        assert_eq!(advance, 2);
        assert_eq!(&rec[..], b"a\0");
    }

    #[test]
    fn test_empty_record() {
        let mut s = LineSplitter::default();
        let (advance, rec) = record(s.split(b"\n\n", false).unwrap());
        assert_eq!(advance, 1);
        assert_eq!(&rec[..], b"\n");
    }
}
