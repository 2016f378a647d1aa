//! Uppercase every input line, in parallel.
//!
//! Run with:
//!     printf 'hello\nworld\n' | cargo run --example uppercase

use std::io::{stdin, stdout};

use bytes::Bytes;
use recpipe::Pipeline;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let workers = std::env::args()
        .nth(1)
        .map(|s| s.parse())
        .transpose()?
        .unwrap_or_else(num_cpus::get);

    Pipeline::new(stdin().lock(), stdout(), |record| {
        Ok(Bytes::from(record.to_ascii_uppercase()))
    })
    .with_num_workers(workers)
    .run()?;

    Ok(())
}
