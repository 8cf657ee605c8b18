//! Text and JSON renderers
//!
//! A renderer is a plain function turning `(flags, record)` into bytes.
//! [`render_cached`] sits in front of it for destinations: it reuses a
//! rendering already cached on the record, otherwise renders into a pooled
//! buffer, writes it and stores it in the record's cache.
//!
//! Text example with `TIME | LEVEL | NEWLINE`:
//! `02/01/2024 03:04:05 [INFO] hello\n`
//!
//! JSON example with `LEVEL`: `{"level":"INFO","msg":"hello"}`

use super::buffer_pool::BufferPool;
use super::error::{LoggerError, Result};
use super::fields::Fields;
use super::flags::{FieldStyle, Flags, PrefixMode};
use super::log_entry::LogEntry;
use chrono::SecondsFormat;
use serde::{Deserialize, Serialize};
use std::io::Write;

/// Output encoding of a destination, the second half of the cache key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum FormatKind {
    /// Human-readable single line
    #[default]
    Text,

    /// One JSON object per record
    Json,

    /// Encoding provided by a custom render function
    Custom(u16),
}

/// Renders `entry` into `buf` according to `flags`
pub type RenderFn = fn(&mut Vec<u8>, &LogEntry, Flags) -> Result<()>;

impl FormatKind {
    /// Built-in renderer for this kind
    pub fn renderer(self) -> Option<RenderFn> {
        match self {
            FormatKind::Text => Some(render_text),
            FormatKind::Json => Some(render_json),
            FormatKind::Custom(_) => None,
        }
    }
}

/// Render `entry` with the built-in renderer of `kind`, bypassing the cache
pub fn render(kind: FormatKind, entry: &LogEntry, flags: Flags) -> Result<Vec<u8>> {
    let render = kind
        .renderer()
        .ok_or_else(|| LoggerError::config("render", format!("no built-in renderer for {:?}", kind)))?;
    let mut buf = Vec::new();
    render(&mut buf, entry, flags)?;
    Ok(buf)
}

/// Write the `(flags, kind)` rendering of `entry` to `w`, rendering it only
/// if no destination did so earlier in this dispatch pass.
pub fn render_cached<W: Write + ?Sized>(
    entry: &LogEntry,
    flags: Flags,
    kind: FormatKind,
    render: RenderFn,
    w: &mut W,
) -> Result<()> {
    if let Some(cached) = entry.get_compiled(flags, kind) {
        w.write_all(&cached)?;
        return Ok(());
    }

    let mut buf = entry.get_buf();
    if let Err(e) = render(&mut buf, entry, flags) {
        BufferPool::global().put(buf);
        return Err(e);
    }
    let written = w.write_all(&buf);
    entry.add_compiled(flags, kind, buf);
    written?;
    Ok(())
}

pub fn render_text(buf: &mut Vec<u8>, entry: &LogEntry, flags: Flags) -> Result<()> {
    write_text_head(buf, entry, flags)?;
    if flags.contains(Flags::LEVEL) {
        buf.push(b'[');
        buf.extend_from_slice(entry.level.to_str().as_bytes());
        buf.extend_from_slice(b"] ");
    }
    write_text_body(buf, entry, flags);
    Ok(())
}

/// Timestamp and prefixes, everything before the level label
pub(crate) fn write_text_head(buf: &mut Vec<u8>, entry: &LogEntry, flags: Flags) -> Result<()> {
    if flags.shows_time() {
        write!(buf, "{}", entry.timestamp.format("%d/%m/%Y %H:%M:%S"))?;
        if flags.contains(Flags::MICRO) {
            write!(buf, ".{:06}", entry.timestamp.timestamp_subsec_micros())?;
        }
        buf.push(b' ');
    }

    if let (Some(mode), false) = (flags.prefix_mode(), entry.prefixes.is_empty()) {
        let shown = match mode {
            PrefixMode::Last => &entry.prefixes[entry.prefixes.len() - 1..],
            PrefixMode::All => &entry.prefixes[..],
        };
        for prefix in shown {
            buf.push(b'[');
            buf.extend_from_slice(prefix.as_bytes());
            buf.extend_from_slice(b"] ");
        }
    }
    Ok(())
}

/// Message and the trailing newline. Field bits are ignored in text.
pub(crate) fn write_text_body(buf: &mut Vec<u8>, entry: &LogEntry, flags: Flags) {
    buf.extend_from_slice(entry.message.as_bytes());

    if flags.contains(Flags::NEWLINE) && buf.last() != Some(&b'\n') {
        buf.push(b'\n');
    }
}

pub fn render_json(buf: &mut Vec<u8>, entry: &LogEntry, flags: Flags) -> Result<()> {
    let mut obj = JsonObject::open(buf);

    if flags.shows_time() {
        obj.key("time")?;
        let time = entry.timestamp.to_rfc3339_opts(SecondsFormat::AutoSi, true);
        serde_json::to_writer(&mut *obj.buf, &time)?;
    }

    if let (Some(mode), false) = (flags.prefix_mode(), entry.prefixes.is_empty()) {
        obj.key("prefix")?;
        match mode {
            PrefixMode::Last => {
                serde_json::to_writer(&mut *obj.buf, &entry.prefixes[entry.prefixes.len() - 1])?
            }
            PrefixMode::All => serde_json::to_writer(&mut *obj.buf, &entry.prefixes[..])?,
        }
    }

    if flags.contains(Flags::LEVEL) {
        obj.key("level")?;
        serde_json::to_writer(&mut *obj.buf, entry.level.to_str())?;
    }

    if let (Some(style), false) = (flags.field_style(), entry.fields.is_empty()) {
        match style {
            FieldStyle::TopLevel => {
                for field in entry.fields.iter() {
                    obj.key(&field.key)?;
                    serde_json::to_writer(&mut *obj.buf, &field.value)?;
                }
            }
            FieldStyle::NestedObject => {
                obj.key("fields")?;
                write_fields_object(obj.buf, &entry.fields)?;
            }
            FieldStyle::NestedArray => {
                obj.key("fields")?;
                write_fields_array(obj.buf, &entry.fields)?;
            }
        }
    }

    obj.key("msg")?;
    serde_json::to_writer(&mut *obj.buf, &entry.message)?;
    obj.close();

    if flags.contains(Flags::NEWLINE) {
        buf.push(b'\n');
    }
    Ok(())
}

/// Writes `{"k":v,...}`, keeping duplicate keys in order
fn write_fields_object(buf: &mut Vec<u8>, fields: &Fields) -> Result<()> {
    let mut obj = JsonObject::open(buf);
    for field in fields.iter() {
        obj.key(&field.key)?;
        serde_json::to_writer(&mut *obj.buf, &field.value)?;
    }
    obj.close();
    Ok(())
}

/// Writes `[{"k":v},...]`
fn write_fields_array(buf: &mut Vec<u8>, fields: &Fields) -> Result<()> {
    buf.push(b'[');
    for (i, field) in fields.iter().enumerate() {
        if i > 0 {
            buf.push(b',');
        }
        let mut obj = JsonObject::open(buf);
        obj.key(&field.key)?;
        serde_json::to_writer(&mut *obj.buf, &field.value)?;
        obj.close();
    }
    buf.push(b']');
    Ok(())
}

/// Hand-rolled object writer; `serde_json::Map` would drop duplicate keys
struct JsonObject<'a> {
    buf: &'a mut Vec<u8>,
    empty: bool,
}

impl<'a> JsonObject<'a> {
    fn open(buf: &'a mut Vec<u8>) -> Self {
        buf.push(b'{');
        Self { buf, empty: true }
    }

    fn key(&mut self, key: &str) -> Result<()> {
        if !self.empty {
            self.buf.push(b',');
        }
        self.empty = false;
        serde_json::to_writer(&mut *self.buf, key)?;
        self.buf.push(b':');
        Ok(())
    }

    fn close(self) {
        self.buf.push(b'}');
    }
}
