//! Benchmarks for recpipe.
//!
//! Run with:
//!     cargo bench

use std::io::Cursor;

use bytes::Bytes;
use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};

use recpipe::{Pipeline, SplitStep, Splitter, TagSplitter, TransformError};

fn identity(record: &[u8]) -> Result<Bytes, TransformError> {
    Ok(Bytes::copy_from_slice(record))
}

fn bench_line_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("line_pipeline");

    for lines in [10_000, 100_000] {
        let input: String = (0..lines)
            .map(|i| format!("record number {} with some payload\n", i))
            .collect();
        let bytes = input.len() as u64;

        group.throughput(Throughput::Bytes(bytes));
        group.bench_with_input(format!("identity_{}k", lines / 1000), &input, |b, input| {
            b.iter(|| {
                let mut output = Vec::with_capacity(input.len());
                Pipeline::new(Cursor::new(input.as_bytes()), &mut output, identity)
                    .with_num_workers(4)
                    .with_batch_size(1000)
                    .run()
                    .unwrap();
                black_box(output.len())
            });
        });

        group.bench_with_input(
            format!("uppercase_{}k", lines / 1000),
            &input,
            |b, input| {
                b.iter(|| {
                    let mut output = Vec::with_capacity(input.len());
                    Pipeline::new(Cursor::new(input.as_bytes()), &mut output, |r: &[u8]| {
                        Ok(Bytes::from(r.to_ascii_uppercase()))
                    })
                    .with_num_workers(4)
                    .with_batch_size(1000)
                    .run()
                    .unwrap();
                    black_box(output.len())
                });
            },
        );
    }

    group.finish();
}

fn bench_tag_splitter(c: &mut Criterion) {
    let mut group = c.benchmark_group("tag_splitter");

    // Element-dense input
    let dense: String = (0..10_000)
        .map(|i| format!("<doc id=\"{}\">payload {}</doc>", i, i))
        .collect();
    group.throughput(Throughput::Bytes(dense.len() as u64));
    group.bench_with_input("dense_elements", &dense, |b, input| {
        b.iter(|| {
            let mut splitter = TagSplitter::new("doc").with_max_bytes(64 * 1024);
            let mut tokens = 0usize;
            for chunk in input.as_bytes().chunks(8 * 1024) {
                if let SplitStep::Record { .. } = splitter.split(chunk, false).unwrap() {
                    tokens += 1;
                }
            }
            while let SplitStep::Record { .. } = splitter.split(b"", true).unwrap() {
                tokens += 1;
            }
            black_box(tokens)
        });
    });

    // Mostly noise (worst case for the scratch buffer)
    let noise = "nothing to see here ".repeat(50_000);
    group.throughput(Throughput::Bytes(noise.len() as u64));
    group.bench_with_input("tagless_noise", &noise, |b, input| {
        b.iter(|| {
            let mut splitter = TagSplitter::new("doc");
            for chunk in input.as_bytes().chunks(8 * 1024) {
                splitter.split(chunk, false).unwrap();
            }
            black_box(splitter.scratch_len())
        });
    });

    group.finish();
}

criterion_group!(benches, bench_line_pipeline, bench_tag_splitter);
criterion_main!(benches);
