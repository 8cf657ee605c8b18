//! Log entry structure

use super::buffer_pool::BufferPool;
use super::fields::Fields;
use super::flags::Flags;
use super::log_level::LogLevel;
use super::render::FormatKind;
use chrono::{DateTime, Utc};
use parking_lot::{MappedMutexGuard, Mutex, MutexGuard};
use std::sync::Arc;

/// One rendered form of a record
#[derive(Debug)]
struct Compiled {
    flags: Flags,
    kind: FormatKind,
    buf: Vec<u8>,
}

/// One logging call.
///
/// Everything except the compiled-output cache is fixed once the entry is
/// built. The cache lets destinations that share flags and format kind write
/// the bytes rendered by the first of them instead of rendering again.
#[derive(Debug)]
pub struct LogEntry {
    pub level: LogLevel,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub prefixes: Arc<[String]>,
    pub fields: Arc<Fields>,
    compiled: Mutex<Vec<Compiled>>,
}

impl LogEntry {
    pub fn new(level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            timestamp: Utc::now(),
            prefixes: Arc::from(Vec::<String>::new()),
            fields: Arc::new(Fields::new()),
            compiled: Mutex::new(Vec::new()),
        }
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn with_prefixes(mut self, prefixes: Arc<[String]>) -> Self {
        self.prefixes = prefixes;
        self
    }

    pub fn with_fields(mut self, fields: Arc<Fields>) -> Self {
        self.fields = fields;
        self
    }

    /// Take an empty buffer from the shared pool for rendering this entry.
    ///
    /// Hand it back through [`add_compiled`](Self::add_compiled) once written.
    pub fn get_buf(&self) -> Vec<u8> {
        BufferPool::global().get()
    }

    /// Keep `buf` as the rendering for `(flags, kind)`.
    ///
    /// With [`Flags::NOT_SAVE`] the buffer goes straight back to the pool.
    /// If a rendering for the same key already exists the first one stays
    /// and `buf` is recycled.
    pub fn add_compiled(&self, flags: Flags, kind: FormatKind, buf: Vec<u8>) {
        if flags.contains(Flags::NOT_SAVE) {
            BufferPool::global().put(buf);
            return;
        }
        let mut cache = self.compiled.lock();
        if cache.iter().any(|c| c.flags == flags && c.kind == kind) {
            drop(cache);
            BufferPool::global().put(buf);
            return;
        }
        cache.push(Compiled { flags, kind, buf });
    }

    /// Cached rendering for `(flags, kind)`, if any.
    ///
    /// The returned view holds the entry's cache lock; drop it before calling
    /// [`add_compiled`](Self::add_compiled) on the same entry.
    pub fn get_compiled(
        &self,
        flags: Flags,
        kind: FormatKind,
    ) -> Option<MappedMutexGuard<'_, [u8]>> {
        if flags.contains(Flags::NOT_SAVE) {
            return None;
        }
        MutexGuard::try_map(self.compiled.lock(), |cache| {
            cache
                .iter_mut()
                .find(|c| c.flags == flags && c.kind == kind)
                .map(|c| c.buf.as_mut_slice())
        })
        .ok()
    }

    /// Number of cached renderings
    pub fn compiled_len(&self) -> usize {
        self.compiled.lock().len()
    }

    /// Return every cached buffer to the pool
    pub fn release_compiled(&self) {
        let drained: Vec<Compiled> = std::mem::take(&mut *self.compiled.lock());
        let pool = BufferPool::global();
        for compiled in drained {
            pool.put(compiled.buf);
        }
    }
}

impl Drop for LogEntry {
    fn drop(&mut self) {
        let pool = BufferPool::global();
        for compiled in self.compiled.get_mut().drain(..) {
            pool.put(compiled.buf);
        }
    }
}
