//! Streaming tag splitter - batches of complete XML-ish elements.
//!
//! [`TagSplitter`] implements the [`Splitter`](super::Splitter) contract
//! over a stream of XML-ish bytes. Each emitted record is a concatenation
//! of one or more complete `<tag ...>...</tag>` element spans, sized by an
//! approximate byte bound. The splitter delimits elements, it does not
//! validate XML.

use bytes::Bytes;
use memchr::memmem::Finder;

use crate::error::PipelineError;

use super::{SplitStep, Splitter};

/// Default approximate batch size (16 MiB).
pub const DEFAULT_MAX_BATCH_BYTES: usize = 16 * 1024 * 1024;

/// Minimum scratch size kept around when pruning (16 KiB).
///
/// Small input chunks still need to accumulate enough bytes to span an
/// element boundary, so pruning never cuts below this floor.
pub const SCRATCH_PRUNE_MIN: usize = 16 * 1024;

/// Hard cap on the scratch buffer (1 GiB).
///
/// A single element larger than this trips
/// [`PipelineError::MaxBufferExceeded`] instead of growing without bound.
pub const MAX_SCRATCH_BYTES: usize = 1 << 30;

/// Outcome of one extraction pass over the scratch buffer.
enum Scan {
    /// One complete element was moved into the batch.
    Element,
    /// No opening tag anywhere in the scratch buffer.
    NoOpeningTag,
    /// Opening tag found, closing tag still missing.
    NoClosingTag,
}

/// Splits a byte stream into batches of complete XML-ish elements.
///
/// `TagSplitter` scans for `<tag>` or `<tag ...>` openings and the matching
/// `</tag>` closing, accumulating complete element spans into a batch
/// buffer. A batch is emitted as one record once it reaches the approximate
/// byte bound; it always contains at least one complete element, so a
/// single oversized element may exceed the bound.
///
/// Unconsumed input is carried in an internal scratch buffer across calls.
/// When no opening tag is in sight the scratch is pruned to its trailing
/// half, which bounds memory on streams that mostly consist of unrelated
/// bytes.
///
/// Nested elements with the same name are not supported and fail with
/// [`PipelineError::NestedTagsUnsupported`].
///
/// # Example
///
/// ```
/// use recpipe::{SplitStep, Splitter, TagSplitter};
///
/// let mut splitter = TagSplitter::new("a").with_max_bytes(1);
/// match splitter.split(b"<a>hello</a>", false)? {
///     SplitStep::Record { record, .. } => assert_eq!(&record[..], b"<a>hello</a>"),
///     other => panic!("unexpected step: {:?}", other),
/// }
/// # Ok::<(), recpipe::PipelineError>(())
/// ```
#[derive(Debug)]
pub struct TagSplitter {
    /// Element name to split on.
    tag: String,

    /// Approximate upper bound on emitted record size.
    max_bytes: usize,

    // Patterns derived from the tag, built once at construction. Both
    // opening variants are needed: searching for `<tag` alone would match
    // strict prefixes, e.g. `<a` inside `<aa>`.
    opening_exact: Finder<'static>,
    opening_attr: Finder<'static>,
    closing: Finder<'static>,

    /// Unconsumed input carried across calls.
    scratch: Vec<u8>,

    /// Complete elements staged for the next record.
    batch: Vec<u8>,

    /// Set after the end-of-input drain; nothing more will be emitted.
    done: bool,
}

impl TagSplitter {
    /// Creates a splitter for the given element name.
    ///
    /// An empty tag is diagnosed with [`PipelineError::TagRequired`] on the
    /// first [`split`](Splitter::split) call.
    ///
    /// # Example
    ///
    /// ```
    /// use recpipe::TagSplitter;
    ///
    /// let splitter = TagSplitter::new("PubmedArticle");
    /// assert_eq!(splitter.tag(), "PubmedArticle");
    /// ```
    pub fn new(tag: impl Into<String>) -> Self {
        let tag = tag.into();
        let opening_exact = Finder::new(format!("<{}>", tag).as_bytes()).into_owned();
        let opening_attr = Finder::new(format!("<{} ", tag).as_bytes()).into_owned();
        let closing = Finder::new(format!("</{}>", tag).as_bytes()).into_owned();
        Self {
            tag,
            max_bytes: DEFAULT_MAX_BATCH_BYTES,
            opening_exact,
            opening_attr,
            closing,
            scratch: Vec::new(),
            batch: Vec::new(),
            done: false,
        }
    }

    /// Sets the approximate upper bound on emitted record size.
    ///
    /// A record always contains at least one complete element, which alone
    /// may exceed this bound. Values below one byte are clamped to one.
    pub fn with_max_bytes(mut self, max_bytes: usize) -> Self {
        self.max_bytes = max_bytes.max(1);
        self
    }

    /// Returns the element name this splitter matches.
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Returns the approximate record size bound.
    pub fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    /// Returns the number of unconsumed bytes carried across calls.
    pub fn scratch_len(&self) -> usize {
        self.scratch.len()
    }

    /// Returns the number of staged element bytes not yet emitted.
    pub fn batch_len(&self) -> usize {
        self.batch.len()
    }

    /// Length of the closing pattern `</tag>`.
    fn closing_len(&self) -> usize {
        self.tag.len() + 3
    }

    /// Position of the earliest opening tag, considering both the exact
    /// form `<tag>` and the attribute form `<tag ...>`.
    fn find_opening(&self) -> Option<usize> {
        match (
            self.opening_exact.find(&self.scratch),
            self.opening_attr.find(&self.scratch),
        ) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (Some(a), None) => Some(a),
            (None, Some(b)) => Some(b),
            (None, None) => None,
        }
    }

    /// Moves at most one complete element from the scratch buffer into the
    /// batch, dropping the consumed prefix.
    fn extract_element(&mut self) -> Result<Scan, PipelineError> {
        if self.scratch.len() > MAX_SCRATCH_BYTES {
            return Err(PipelineError::MaxBufferExceeded {
                limit: MAX_SCRATCH_BYTES,
            });
        }
        let open = match self.find_opening() {
            Some(i) => i,
            None => return Ok(Scan::NoOpeningTag),
        };
        let close = match self.closing.find(&self.scratch) {
            Some(i) => i,
            None => return Ok(Scan::NoClosingTag),
        };
        if close < open {
            return Err(PipelineError::GarbledInput);
        }
        // A further same-name opening strictly between the opening and
        // closing positions means self-similar nesting.
        let interior = &self.scratch[open + 1..close];
        if self.opening_exact.find(interior).is_some()
            || self.opening_attr.find(interior).is_some()
        {
            return Err(PipelineError::NestedTagsUnsupported);
        }
        let end = close + self.closing_len();
        self.batch.extend_from_slice(&self.scratch[open..end]);
        self.scratch.drain(..end);
        Ok(Scan::Element)
    }

    /// Shrinks the scratch buffer when no opening tag is in sight.
    ///
    /// Keeps the trailing half once the buffer exceeds
    /// `max(2 * chunk_len, SCRATCH_PRUNE_MIN)`. A partial opening tag at
    /// the buffer tail always survives the cut.
    fn prune_scratch(&mut self, chunk_len: usize) {
        let limit = (2 * chunk_len).max(SCRATCH_PRUNE_MIN);
        if self.scratch.len() > limit {
            let half = self.scratch.len() / 2;
            self.scratch.drain(..half);
        }
    }

    fn take_batch(&mut self) -> Bytes {
        Bytes::from(std::mem::take(&mut self.batch))
    }
}

impl Splitter for TagSplitter {
    fn split(&mut self, data: &[u8], at_eof: bool) -> Result<SplitStep, PipelineError> {
        if self.tag.is_empty() {
            return Err(PipelineError::TagRequired);
        }
        if self.done {
            return Ok(SplitStep::NeedMore);
        }
        self.scratch.extend_from_slice(data);
        loop {
            if self.batch.len() >= self.max_bytes {
                return Ok(SplitStep::Record {
                    advance: data.len(),
                    record: self.take_batch(),
                });
            }
            match self.extract_element()? {
                Scan::Element => continue,
                Scan::NoOpeningTag => {
                    self.prune_scratch(data.len());
                    break;
                }
                // Inside an element: keep the whole scratch until the
                // closing tag shows up.
                Scan::NoClosingTag => break,
            }
        }
        if at_eof {
            self.done = true;
            if !self.batch.is_empty() {
                return Ok(SplitStep::Record {
                    advance: data.len(),
                    record: self.take_batch(),
                });
            }
            return Ok(SplitStep::NeedMore);
        }
        Ok(SplitStep::Consumed {
            advance: data.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::RecordSource;
    use std::io::Cursor;

    /// Runs `input` through a RecordSource with a TagSplitter and collects
    /// every emitted record.
    fn tokens(input: &str, tag: &str, max_bytes: usize) -> Result<Vec<Bytes>, PipelineError> {
        let splitter = TagSplitter::new(tag).with_max_bytes(max_bytes);
        let source = RecordSource::new(Cursor::new(input.as_bytes().to_vec()), splitter);
        source.collect()
    }

    fn strings(tokens: Vec<Bytes>) -> Vec<String> {
        tokens
            .into_iter()
            .map(|b| String::from_utf8(b.to_vec()).unwrap())
            .collect()
    }

    #[test]
    fn test_empty_tag_fails() {
        let err = tokens("<a>1</a>", "", 1).unwrap_err();
        assert!(matches!(err, PipelineError::TagRequired));
    }

    #[test]
    fn test_empty_input() {
        assert!(tokens("", "a", 1).unwrap().is_empty());
    }

    #[test]
    fn test_single_element() {
        let got = strings(tokens("<a>hello</a>", "a", 1).unwrap());
        assert_eq!(got, vec!["<a>hello</a>"]);
    }

    #[test]
    fn test_two_elements() {
        let got = strings(tokens("<a>hello</a><a>hi</a>", "a", 1).unwrap());
        assert_eq!(got, vec!["<a>hello</a>", "<a>hi</a>"]);
    }

    #[test]
    fn test_nested_different_tag() {
        let got = strings(tokens("<a><b>hello</b></a>", "a", 1).unwrap());
        assert_eq!(got, vec!["<a><b>hello</b></a>"]);
    }

    #[test]
    fn test_nested_same_tag_fails() {
        let err = tokens("<a><a>hello</a></a>", "a", 1).unwrap_err();
        assert!(matches!(err, PipelineError::NestedTagsUnsupported));
    }

    #[test]
    fn test_batching_by_bytes() {
        // Two 8-byte elements fit one 9-byte batch, the third spills over.
        let got = strings(tokens("<a>1</a><a>2</a><a>3</a>", "a", 9).unwrap());
        assert_eq!(got, vec!["<a>1</a><a>2</a>", "<a>3</a>"]);
    }

    #[test]
    fn test_noise_between_elements() {
        let got = strings(tokens("<a>1</a>NOISE<b></b><a>2</a>", "a", 1).unwrap());
        assert_eq!(got, vec!["<a>1</a>", "<a>2</a>"]);
    }

    #[test]
    fn test_other_tag_selected() {
        let got = strings(tokens("<a>1</a><a>2</a><x>X</x><a>4</a>", "x", 1).unwrap());
        assert_eq!(got, vec!["<x>X</x>"]);
    }

    #[test]
    fn test_no_matching_tag() {
        assert!(tokens("<a>1</a><a>2</a><x></x>", "z", 1).unwrap().is_empty());
    }

    #[test]
    fn test_prefix_tag_name_is_not_matched() {
        // `<PubmedArticles>` must not satisfy a search for `PubmedArticle`.
        let input = "<PubmedArticles><PubmedArticle>1</PubmedArticle></PubmedArticles>";
        let got = strings(tokens(input, "PubmedArticle", 1).unwrap());
        assert_eq!(got, vec!["<PubmedArticle>1</PubmedArticle>"]);
    }

    #[test]
    fn test_prefix_safety_short_tag() {
        let got = strings(tokens("<aa>x</aa><a>y</a>", "a", 1).unwrap());
        assert_eq!(got, vec!["<a>y</a>"]);
    }

    #[test]
    fn test_attributes() {
        let got = strings(tokens(r#"<a z="ok">1</a>"#, "a", 1).unwrap());
        assert_eq!(got, vec![r#"<a z="ok">1</a>"#]);
    }

    #[test]
    fn test_attributes_and_noise() {
        let got = strings(tokens(r#"NNN <a>1</a> NNN <a k="v">2</a> NNN"#, "a", 1).unwrap());
        assert_eq!(got, vec!["<a>1</a>", r#"<a k="v">2</a>"#]);
    }

    #[test]
    fn test_newlines_inside_element() {
        let input = "<a k=\"v\">\nbody\n</a>";
        let got = strings(tokens(input, "a", 1).unwrap());
        assert_eq!(got, vec![input]);
    }

    #[test]
    fn test_garbled_input() {
        let err = tokens("</a><a>x</a>", "a", 1).unwrap_err();
        assert!(matches!(err, PipelineError::GarbledInput));
    }

    #[test]
    fn test_done_after_drain() {
        let mut s = TagSplitter::new("a").with_max_bytes(1);
        let step = s.split(b"<a>1</a>", true).unwrap();
        assert!(matches!(step, SplitStep::Record { .. }));
        // Terminal: nothing more comes out.
        assert_eq!(s.split(b"", true).unwrap(), SplitStep::NeedMore);
        assert_eq!(s.split(b"<a>2</a>", true).unwrap(), SplitStep::NeedMore);
    }

    #[test]
    fn test_boundary_invariance() {
        let input = "x<a>1</a>noise<a k=\"v\">\ntwo\n</a><aa>skip</aa><a>3</a>tail";
        let expected = strings(tokens(input, "a", 1).unwrap());
        for chunk in [1, 2, 3, 5, 7, 16, 64, input.len()] {
            let mut s = TagSplitter::new("a").with_max_bytes(1);
            let mut got = Vec::new();
            for piece in input.as_bytes().chunks(chunk) {
                let mut data = piece;
                loop {
                    match s.split(data, false).unwrap() {
                        SplitStep::Record { record, .. } => {
                            got.push(String::from_utf8(record.to_vec()).unwrap());
                            // Remaining scratch is drained on the next call.
                            data = b"";
                        }
                        _ => break,
                    }
                }
            }
            loop {
                match s.split(b"", true).unwrap() {
                    SplitStep::Record { record, .. } => {
                        got.push(String::from_utf8(record.to_vec()).unwrap())
                    }
                    _ => break,
                }
            }
            assert_eq!(got, expected, "chunk size {}", chunk);
        }
    }

    #[test]
    fn test_scratch_pruned_on_tagless_noise() {
        let mut s = TagSplitter::new("a");
        let chunk = vec![b'x'; 8 * 1024];
        let bound = (2 * chunk.len()).max(SCRATCH_PRUNE_MIN) + chunk.len();
        for _ in 0..64 {
            let step = s.split(&chunk, false).unwrap();
            assert!(matches!(step, SplitStep::Consumed { .. }));
            assert!(s.scratch_len() <= bound, "scratch {} bytes", s.scratch_len());
        }
    }

    #[test]
    fn test_element_straddling_prune_boundary() {
        // Noise large enough to trigger pruning, then an element split
        // across chunks; the element must still come out intact.
        let mut s = TagSplitter::new("a");
        for _ in 0..8 {
            s.split(&vec![b'n'; 8 * 1024], false).unwrap();
        }
        s.split(b"<a>en", false).unwrap();
        let step = s.split(b"d</a>", true).unwrap();
        match step {
            SplitStep::Record { record, .. } => assert_eq!(&record[..], b"<a>end</a>"),
            other => panic!("unexpected step: {:?}", other),
        }
    }
}
