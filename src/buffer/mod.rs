//! Internal buffer management for batch dispatch.
//!
//! This module provides a lock-free pool of reusable byte buffers used for
//! byte-buffer batches. It is an implementation detail and not part of the
//! public API.

mod pool;

pub(crate) use pool::{BufferPool, PooledBuf};
