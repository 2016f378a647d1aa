//! Filter newline-delimited JSON, keeping documents with even identifiers.
//!
//! Run with:
//!     printf '{"id": 1}\n{"id": 2}\n' | cargo run --example json_filter

use std::io::{stdin, stdout};

use bytes::Bytes;
use recpipe::Pipeline;
use serde::{Deserialize, Serialize};

#[derive(Deserialize, Serialize)]
struct Entry {
    id: i64,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    Pipeline::new(stdin().lock(), stdout(), |record| {
        let entry: Entry = serde_json::from_slice(record)?;
        if entry.id % 2 != 0 {
            // Dropped records produce no output.
            return Ok(Bytes::new());
        }
        let mut out = serde_json::to_vec(&entry)?;
        out.push(b'\n');
        Ok(Bytes::from(out))
    })
    .run()?;

    Ok(())
}
