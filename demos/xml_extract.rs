//! Extract complete XML elements from a stream, one batch per worker call.
//!
//! Run with:
//!     cat dump.xml | cargo run --example xml_extract -- PubmedArticle

use std::io::{stdin, stdout};

use bytes::Bytes;
use recpipe::{Pipeline, TagSplitter};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let tag = std::env::args().nth(1).unwrap_or_else(|| "a".to_string());

    Pipeline::new(stdin().lock(), stdout(), |batch| {
        // Each batch holds one or more complete elements; pass them on
        // with a trailing newline so the output is line-oriented.
        let mut out = Vec::with_capacity(batch.len() + 1);
        out.extend_from_slice(batch);
        out.push(b'\n');
        Ok(Bytes::from(out))
    })
    .with_splitter(TagSplitter::new(tag))
    .run()?;

    Ok(())
}
