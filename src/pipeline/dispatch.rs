//! Pipeline internals - driver loop, worker pool, and sink.
//!
//! One run wires up: the driving thread reading records and batching them,
//! `num_workers` worker threads applying the transformation, and a single
//! sink thread writing results. Both channels are rendezvous channels, so
//! backpressure flows end to end: the driver blocks when workers are
//! saturated, workers block when the sink cannot keep up.
//!
//! Shutdown order: the driver drops the batch sender, workers drain and
//! exit, the result channel closes when the last worker drops its sender,
//! the sink flushes and exits, the scope joins everything. Errors never
//! short-circuit that order; they ride the latch while in-flight work
//! drains.

use std::io::{BufWriter, Read, Write};

use bytes::Bytes;
use crossbeam_channel::{bounded, Receiver, Sender};

use crate::buffer::BufferPool;
use crate::config::PipelineConfig;
use crate::error::{PipelineError, TransformError};
use crate::source::RecordSource;
use crate::split::{LineSplitter, Splitter};

use super::batch::Batch;
use super::cancel::CancelToken;
use super::latch::ErrorLatch;

/// Initial capacity for pooled batch buffers; they grow to token size on
/// first use and keep that capacity.
const POOL_BUFFER_CAPACITY: usize = 64 * 1024;

/// Pooled buffers retained per worker.
const POOL_SLOTS_PER_WORKER: usize = 2;

pub(crate) fn run<R, W, F>(
    reader: R,
    writer: W,
    transform: F,
    config: PipelineConfig,
    splitter: Option<Box<dyn Splitter>>,
    cancel: Option<CancelToken>,
) -> Result<(), PipelineError>
where
    R: Read,
    W: Write + Send,
    F: Fn(&[u8]) -> Result<Bytes, TransformError> + Sync,
{
    config.validate()?;

    let latch = ErrorLatch::new();
    let cancel = cancel.unwrap_or_default();
    let (batch_tx, batch_rx) = bounded::<Batch>(0);
    let (result_tx, result_rx) = bounded::<Bytes>(0);

    std::thread::scope(|scope| {
        let sink_latch = latch.clone();
        scope.spawn(move || sink(writer, result_rx, sink_latch));

        for _ in 0..config.num_workers() {
            let batch_rx = batch_rx.clone();
            let result_tx = result_tx.clone();
            let latch = latch.clone();
            let cancel = cancel.clone();
            let transform = &transform;
            scope.spawn(move || worker(batch_rx, result_tx, transform, latch, cancel));
        }
        // Only workers may hold these ends now: the batch channel closes
        // when the driver drops its sender, the result channel when the
        // last worker exits.
        drop(batch_rx);
        drop(result_tx);

        match splitter {
            Some(splitter) => {
                drive_splitter(reader, splitter, &batch_tx, &latch, &cancel, &config)
            }
            None => drive_lines(reader, &batch_tx, &latch, &cancel, &config),
        }
        drop(batch_tx);
    });

    match latch.into_error() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

/// Checks the stop conditions observed between dispatches.
fn observe_stop(latch: &ErrorLatch, cancel: &CancelToken) -> bool {
    if cancel.is_cancelled() {
        latch.set(PipelineError::Cancelled);
        return true;
    }
    latch.is_set()
}

/// True when the record, less its trailing separator, carries no content
/// besides ASCII whitespace.
fn is_blank(record: &[u8], separator: u8) -> bool {
    let body = match record.last() {
        Some(&last) if last == separator => &record[..record.len() - 1],
        _ => record,
    };
    body.iter().all(u8::is_ascii_whitespace)
}

/// Line-mode read loop: accumulate records into record-list batches.
fn drive_lines<R: Read>(
    reader: R,
    batch_tx: &Sender<Batch>,
    latch: &ErrorLatch,
    cancel: &CancelToken,
    config: &PipelineConfig,
) {
    let source = RecordSource::new(reader, LineSplitter::new(config.record_separator()));
    let mut batch: Vec<Bytes> = Vec::with_capacity(config.batch_size());
    let mut dispatched: u64 = 0;

    for item in source {
        // Cancellation is a plain atomic load, cheap enough to poll per
        // record; the error latch is only read at batch boundaries below.
        if cancel.is_cancelled() {
            latch.set(PipelineError::Cancelled);
            break;
        }
        let record = match item {
            Ok(record) => record,
            Err(err) => {
                latch.set(err);
                break;
            }
        };
        if config.skip_empty() && is_blank(&record, config.record_separator()) {
            continue;
        }
        batch.push(record);
        if batch.len() == config.batch_size() {
            if latch.is_set() {
                break;
            }
            dispatched += batch.len() as u64;
            tracing::trace!(records = batch.len(), total = dispatched, "dispatching batch");
            let full = std::mem::replace(&mut batch, Vec::with_capacity(config.batch_size()));
            if batch_tx.send(Batch::Records(full)).is_err() {
                break;
            }
        }
    }
    // Remaining partial batch; queued work still drains after an error.
    if !batch.is_empty() {
        dispatched += batch.len() as u64;
        let _ = batch_tx.send(Batch::Records(batch));
    }
    tracing::debug!(records = dispatched, "input drained");
}

/// Splitter-mode read loop: every splitter token becomes one byte-buffer
/// batch, copied into a pooled buffer the worker later releases.
fn drive_splitter<R: Read>(
    reader: R,
    splitter: Box<dyn Splitter>,
    batch_tx: &Sender<Batch>,
    latch: &ErrorLatch,
    cancel: &CancelToken,
    config: &PipelineConfig,
) {
    let pool = BufferPool::new(
        POOL_SLOTS_PER_WORKER * config.num_workers(),
        POOL_BUFFER_CAPACITY,
    );
    let source = RecordSource::new(reader, splitter);
    let mut dispatched: u64 = 0;

    for item in source {
        let token = match item {
            Ok(token) => token,
            Err(err) => {
                latch.set(err);
                break;
            }
        };
        if observe_stop(latch, cancel) {
            break;
        }
        let mut buf = BufferPool::get(&pool);
        buf.extend_from_slice(&token);
        dispatched += 1;
        tracing::trace!(bytes = buf.len(), total = dispatched, "dispatching buffer batch");
        if batch_tx.send(Batch::Buffer(buf)).is_err() {
            break;
        }
    }
    tracing::debug!(batches = dispatched, "input drained");
}

/// Worker loop: apply the transformation and forward every result.
///
/// Results are forwarded even when the transformation failed (as empty
/// bytes, which the sink suppresses); the error itself rides the latch.
fn worker<F>(
    batch_rx: Receiver<Batch>,
    result_tx: Sender<Bytes>,
    transform: &F,
    latch: ErrorLatch,
    cancel: CancelToken,
) where
    F: Fn(&[u8]) -> Result<Bytes, TransformError> + Sync,
{
    for batch in batch_rx.iter() {
        if cancel.is_cancelled() {
            // Keep receiving so blocked senders upstream can finish;
            // dropping a buffer batch returns it to the pool.
            continue;
        }
        match batch {
            Batch::Records(records) => {
                for record in records {
                    let out = apply(transform, &record, &latch);
                    if result_tx.send(out).is_err() {
                        return;
                    }
                }
            }
            Batch::Buffer(buf) => {
                let out = apply(transform, &buf, &latch);
                if result_tx.send(out).is_err() {
                    return;
                }
                // Dropping the batch returns its buffer to the pool.
                drop(buf);
            }
        }
    }
}

fn apply<F>(transform: &F, input: &[u8], latch: &ErrorLatch) -> Bytes
where
    F: Fn(&[u8]) -> Result<Bytes, TransformError>,
{
    match transform(input) {
        Ok(bytes) => bytes,
        Err(err) => {
            latch.set(PipelineError::Transform(err));
            Bytes::new()
        }
    }
}

/// Sink loop: buffered writes of every non-empty result, flush on close.
///
/// A write error is latched, after which the sink drains without writing;
/// exiting early would strand workers on their blocking sends.
fn sink<W: Write>(writer: W, result_rx: Receiver<Bytes>, latch: ErrorLatch) {
    let mut out = BufWriter::new(writer);
    let mut failed = false;
    let mut written: u64 = 0;

    for result in result_rx.iter() {
        if result.is_empty() || failed {
            continue;
        }
        match out.write_all(&result) {
            Ok(()) => written += result.len() as u64,
            Err(err) => {
                latch.set(err.into());
                failed = true;
            }
        }
    }
    if !failed {
        if let Err(err) = out.flush() {
            latch.set(err.into());
        }
    }
    tracing::debug!(bytes = written, "sink flushed");
}
