//! Lock-free buffer pool with ownership-transfer semantics.
//!
//! Byte-buffer batches are acquired by the pipeline driver, moved to a
//! worker, and returned to the pool when the worker drops them. A buffer
//! outside the pool has exactly one owner at any time, so double-return and
//! use-after-return cannot be expressed.

use std::ops::{Deref, DerefMut};
use std::sync::Arc;

use crossbeam_queue::ArrayQueue;

/// A bounded pool of reusable byte buffers.
///
/// `get` pops a cleared buffer or allocates a fresh one when the pool is
/// empty; buffers flow back when the returned [`PooledBuf`] is dropped.
/// Returns beyond the slot bound are simply deallocated.
pub(crate) struct BufferPool {
    queue: ArrayQueue<Vec<u8>>,
    initial_capacity: usize,
}

impl BufferPool {
    /// Creates a pool with `slots` retained buffers of the given initial
    /// capacity. Buffers grow as needed and keep their grown capacity when
    /// returned.
    pub(crate) fn new(slots: usize, initial_capacity: usize) -> Arc<Self> {
        Arc::new(Self {
            queue: ArrayQueue::new(slots.max(1)),
            initial_capacity,
        })
    }

    /// Takes a buffer out of the pool, allocating when none is available.
    pub(crate) fn get(pool: &Arc<Self>) -> PooledBuf {
        let data = pool
            .queue
            .pop()
            .unwrap_or_else(|| Vec::with_capacity(pool.initial_capacity));
        PooledBuf {
            data,
            pool: Arc::clone(pool),
        }
    }

    /// Returns a buffer to the pool; dropped on the floor when full.
    fn put(&self, mut data: Vec<u8>) {
        data.clear();
        let _ = self.queue.push(data);
    }

    /// Number of buffers currently retained.
    #[cfg(test)]
    fn retained(&self) -> usize {
        self.queue.len()
    }
}

/// A byte buffer owned outside the pool.
///
/// Dereferences to `Vec<u8>`; returns its storage to the pool on drop.
pub(crate) struct PooledBuf {
    data: Vec<u8>,
    pool: Arc<BufferPool>,
}

impl Deref for PooledBuf {
    type Target = Vec<u8>;

    fn deref(&self) -> &Vec<u8> {
        &self.data
    }
}

impl DerefMut for PooledBuf {
    fn deref_mut(&mut self) -> &mut Vec<u8> {
        &mut self.data
    }
}

impl Drop for PooledBuf {
    fn drop(&mut self) {
        self.pool.put(std::mem::take(&mut self.data));
    }
}
