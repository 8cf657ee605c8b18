//! Recyclable byte buffers
//!
//! Renderers take a buffer from the pool, the record keeps it in its
//! compiled-output cache for the rest of the dispatch pass, and the worker
//! hands it back once every destination has seen the record.

use parking_lot::Mutex;
use std::sync::OnceLock;

/// Buffers kept by the process-wide pool
pub const DEFAULT_POOL_CAPACITY: usize = 256;

/// Buffers that grew past this are dropped instead of recycled
pub const MAX_RETAINED_BUFFER: usize = 64 * 1024;

static GLOBAL_POOL: OnceLock<BufferPool> = OnceLock::new();

/// Thread-safe free list of `Vec<u8>`
#[derive(Debug)]
pub struct BufferPool {
    free: Mutex<Vec<Vec<u8>>>,
    capacity: usize,
}

impl BufferPool {
    pub fn new(capacity: usize) -> Self {
        Self {
            free: Mutex::new(Vec::new()),
            capacity,
        }
    }

    /// Pool shared by every record in the process
    pub fn global() -> &'static BufferPool {
        GLOBAL_POOL.get_or_init(|| BufferPool::new(DEFAULT_POOL_CAPACITY))
    }

    /// Take an empty buffer, reusing a returned one when available
    pub fn get(&self) -> Vec<u8> {
        self.free.lock().pop().unwrap_or_default()
    }

    /// Return a buffer. It is cleared here; oversized buffers and buffers
    /// beyond the pool capacity are freed.
    pub fn put(&self, mut buf: Vec<u8>) {
        if buf.capacity() == 0 || buf.capacity() > MAX_RETAINED_BUFFER {
            return;
        }
        buf.clear();
        let mut free = self.free.lock();
        if free.len() < self.capacity {
            free.push(buf);
        }
    }

    /// Number of idle buffers
    pub fn available(&self) -> usize {
        self.free.lock().len()
    }
}

impl Default for BufferPool {
    fn default() -> Self {
        Self::new(DEFAULT_POOL_CAPACITY)
    }
}
