//! Function-pointer destination over any `io::Write`
//!
//! [`WriterDestination`] pairs a writer with two plain functions, one that
//! renders records and one that runs when the last registration closes. The
//! text and JSON constructors plug in the built-in renderers; custom
//! encodings pass their own render function and a [`FormatKind::Custom`]
//! kind so their output is cached separately.

use crate::core::{
    render::{render_cached, render_json, render_text, RenderFn},
    AddCount, Destination, Flags, FormatKind, LogEntry, LogLevel, LoggerError, Result,
};
use std::io::Write;

/// Runs when the last registration closes, with the writer and whether the
/// destination owns the underlying resource
pub type CloseFn<W> = fn(&mut W, bool) -> Result<()>;

/// Default close routine: flush the writer
pub fn default_close<W: Write>(writer: &mut W, _owned: bool) -> Result<()> {
    writer.flush()?;
    Ok(())
}

pub struct WriterDestination<W: Write + Send> {
    writer: Option<W>,
    owned: bool,
    add: AddCount,
    flags: Flags,
    level: LogLevel,
    kind: FormatKind,
    render: RenderFn,
    close_fn: Option<CloseFn<W>>,
    name: String,
}

impl<W: Write + Send> WriterDestination<W> {
    /// Adapter from explicit render and close functions.
    ///
    /// With `owned`, the last close drops the writer and later deliveries
    /// report the destination closed. Otherwise the writer stays usable.
    pub fn with_functions(
        writer: W,
        owned: bool,
        flags: Flags,
        kind: FormatKind,
        render: RenderFn,
        close_fn: Option<CloseFn<W>>,
    ) -> Self {
        Self {
            writer: Some(writer),
            owned,
            add: AddCount::default(),
            flags,
            level: LogLevel::Info,
            kind,
            render,
            close_fn,
            name: "writer".to_string(),
        }
    }

    /// Text lines rendered with [`render_text`]
    pub fn text(writer: W, flags: Flags, owned: bool) -> Self {
        Self::with_functions(
            writer,
            owned,
            flags,
            FormatKind::Text,
            render_text,
            Some(default_close::<W>),
        )
    }

    /// JSON objects rendered with [`render_json`]
    pub fn json(writer: W, flags: Flags, owned: bool) -> Self {
        Self::with_functions(
            writer,
            owned,
            flags,
            FormatKind::Json,
            render_json,
            Some(default_close::<W>),
        )
    }

    #[must_use]
    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.level = level;
        self
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// The writer, unless the destination has been released
    pub fn get_ref(&self) -> Option<&W> {
        self.writer.as_ref()
    }

    pub fn is_released(&self) -> bool {
        self.writer.is_none()
    }
}

impl<W: Write + Send> Destination for WriterDestination<W> {
    fn on_add(&mut self) {
        self.add.increment();
    }

    fn deliver(&mut self, entry: &LogEntry) -> Result<()> {
        let writer = self.writer.as_mut().ok_or(LoggerError::DestinationClosed)?;
        if !self.level.permits(entry.level) {
            return Ok(());
        }
        render_cached(entry, self.flags, self.kind, self.render, writer)
    }

    fn flags(&self) -> Flags {
        self.flags
    }

    fn set_flags(&mut self, flags: Flags) {
        self.flags = flags;
    }

    fn level(&self) -> LogLevel {
        self.level
    }

    fn set_level(&mut self, level: LogLevel) {
        self.level = level;
    }

    fn format_kind(&self) -> FormatKind {
        self.kind
    }

    fn flush(&mut self) -> Result<()> {
        if let Some(ref mut writer) = self.writer {
            writer.flush()?;
        }
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        if !self.add.release() {
            return Ok(());
        }
        let result = match (self.writer.as_mut(), self.close_fn) {
            (Some(writer), Some(close_fn)) => close_fn(writer, self.owned),
            _ => Ok(()),
        };
        if self.owned {
            self.writer = None;
        }
        result
    }

    fn name(&self) -> &str {
        &self.name
    }
}
