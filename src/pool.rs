//! Scoped byte buffers
//!
//! [`BufferPool`] hands out [`PooledBuffer`] guards. A guard returns its
//! storage to the pool when dropped, so every exit path of the borrowing code
//! releases the buffer.

use lazy_static::lazy_static;
use parking_lot::Mutex;
use std::io;
use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Buffers kept for reuse by default.
pub const DEFAULT_MAX_RETAINED: usize = 16;

/// Buffers larger than this are dropped instead of being returned.
pub const DEFAULT_MAX_BUFFER_CAPACITY: usize = 64 * 1024;

lazy_static! {
    static ref GLOBAL_POOL: BufferPool = BufferPool::new();
}

/// A pool of reusable byte buffers.
#[derive(Debug)]
pub struct BufferPool {
    free: Mutex<Vec<Vec<u8>>>,
    outstanding: AtomicUsize,
    max_retained: usize,
    max_capacity: usize,
}

impl Default for BufferPool {
    fn default() -> Self {
        Self::new()
    }
}

impl BufferPool {
    /// Create a pool with the default retention limits.
    pub fn new() -> Self {
        Self::with_limits(DEFAULT_MAX_RETAINED, DEFAULT_MAX_BUFFER_CAPACITY)
    }

    /// Create a pool retaining at most `max_retained` buffers of at most
    /// `max_capacity` bytes each.
    pub fn with_limits(max_retained: usize, max_capacity: usize) -> Self {
        Self {
            free: Mutex::new(Vec::with_capacity(max_retained)),
            outstanding: AtomicUsize::new(0),
            max_retained,
            max_capacity,
        }
    }

    /// The process-wide pool.
    pub fn global() -> &'static BufferPool {
        &GLOBAL_POOL
    }

    /// Check out an empty buffer.
    pub fn acquire(&self) -> PooledBuffer<'_> {
        let buf = self.free.lock().pop().unwrap_or_default();
        let outstanding = self.outstanding.fetch_add(1, Ordering::AcqRel) + 1;
        log::trace!("buffer acquired ({outstanding} outstanding)");
        PooledBuffer {
            pool: self,
            buf,
        }
    }

    /// Number of buffers currently checked out.
    pub fn outstanding(&self) -> usize {
        self.outstanding.load(Ordering::Acquire)
    }

    /// Number of idle buffers ready for reuse.
    pub fn idle(&self) -> usize {
        self.free.lock().len()
    }

    fn release(&self, mut buf: Vec<u8>) {
        let outstanding = self.outstanding.fetch_sub(1, Ordering::AcqRel) - 1;
        log::trace!("buffer released ({outstanding} outstanding)");
        if buf.capacity() > self.max_capacity {
            return;
        }
        buf.clear();
        let mut free = self.free.lock();
        if free.len() < self.max_retained {
            free.push(buf);
        }
    }
}

/// A buffer checked out of a [`BufferPool`]. Dropping it releases the buffer.
#[derive(Debug)]
pub struct PooledBuffer<'a> {
    pool: &'a BufferPool,
    buf: Vec<u8>,
}

impl PooledBuffer<'_> {
    /// Copy the contents out. The buffer itself stays pooled.
    pub fn to_vec(&self) -> Vec<u8> {
        self.buf.clone()
    }
}

impl Deref for PooledBuffer<'_> {
    type Target = Vec<u8>;

    fn deref(&self) -> &Vec<u8> {
        &self.buf
    }
}

impl DerefMut for PooledBuffer<'_> {
    fn deref_mut(&mut self) -> &mut Vec<u8> {
        &mut self.buf
    }
}

impl io::Write for PooledBuffer<'_> {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for PooledBuffer<'_> {
    fn drop(&mut self) {
        let buf = std::mem::take(&mut self.buf);
        self.pool.release(buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn test_acquire_release_cycle() {
        let pool = BufferPool::new();
        {
            let mut buf = pool.acquire();
            buf.write_all(b"hello").expect("test write");
            assert_eq!(buf.as_slice(), b"hello");
            assert_eq!(pool.outstanding(), 1);
        }
        assert_eq!(pool.outstanding(), 0);
        assert_eq!(pool.idle(), 1);

        let buf = pool.acquire();
        assert!(buf.is_empty());
        assert_eq!(pool.idle(), 0);
    }

    #[test]
    fn test_release_on_early_return() {
        fn fails(pool: &BufferPool) -> Result<(), &'static str> {
            let mut buf = pool.acquire();
            buf.push(b'x');
            Err("bail")
        }

        let pool = BufferPool::new();
        assert!(fails(&pool).is_err());
        assert_eq!(pool.outstanding(), 0);
    }

    #[test]
    fn test_retention_limits() {
        let pool = BufferPool::with_limits(1, 4);
        {
            let _a = pool.acquire();
            let _b = pool.acquire();
        }
        assert_eq!(pool.idle(), 1);

        {
            let mut big = pool.acquire();
            big.extend_from_slice(&[0u8; 128]);
        }
        // oversized buffer dropped, the retained one was reused and discarded
        assert_eq!(pool.idle(), 0);
        assert_eq!(pool.outstanding(), 0);
    }
}
