//! Batch shapes handed from the driver to workers.

use bytes::Bytes;

use crate::buffer::PooledBuf;

/// A unit of work for one worker.
///
/// A batch is owned by exactly one producer, transferred to exactly one
/// worker, and then consumed.
pub(crate) enum Batch {
    /// Complete records of bounded cardinality (line mode). The
    /// transformation runs once per record.
    Records(Vec<Bytes>),

    /// A contiguous concatenation of one or more complete records
    /// (splitter mode). The transformation runs once on the whole buffer,
    /// which returns to its pool afterwards.
    Buffer(PooledBuf),
}
