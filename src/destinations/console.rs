//! Console destination writing to stdout and/or stderr

use crate::core::{
    render::{render_cached, render_text, RenderFn},
    AddCount, Destination, Flags, FormatKind, LogEntry, LogLevel, LoggerError, Result,
};
use serde::{Deserialize, Serialize};
use std::io::{self, Write};

#[cfg(feature = "console")]
use colored::Colorize;

/// Format kind id of the coloured text rendering
#[cfg(feature = "console")]
pub const COLORED_TEXT_ID: u16 = 0xC010;

/// Stream(s) a console destination writes to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConsoleTarget {
    #[default]
    Stdout,
    Stderr,
    /// Error and Fatal to stderr, everything else to stdout
    Split,
}

pub struct ConsoleDestination {
    target: ConsoleTarget,
    #[cfg_attr(not(feature = "console"), allow(dead_code))]
    use_colors: bool,
    add: AddCount,
    released: bool,
    flags: Flags,
    level: LogLevel,
}

impl ConsoleDestination {
    pub fn new(target: ConsoleTarget, flags: Flags) -> Self {
        Self {
            target,
            use_colors: false,
            add: AddCount::default(),
            released: false,
            flags,
            level: LogLevel::Info,
        }
    }

    pub fn stdout(flags: Flags) -> Self {
        Self::new(ConsoleTarget::Stdout, flags)
    }

    pub fn stderr(flags: Flags) -> Self {
        Self::new(ConsoleTarget::Stderr, flags)
    }

    /// Colour the level label with ANSI escapes.
    ///
    /// Coloured output is its own format kind, so it never shares cached
    /// bytes with plain text destinations.
    ///
    /// # Example
    ///
    /// ```
    /// use rust_fanout_logger::destinations::ConsoleDestination;
    /// use rust_fanout_logger::{Destination, Flags, FormatKind};
    ///
    /// let console = ConsoleDestination::stdout(Flags::STD).with_colors(true);
    /// assert_ne!(console.format_kind(), FormatKind::Text);
    /// ```
    #[cfg(feature = "console")]
    #[must_use]
    pub fn with_colors(mut self, use_colors: bool) -> Self {
        self.use_colors = use_colors;
        self
    }

    #[must_use]
    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.level = level;
        self
    }

    pub fn target(&self) -> ConsoleTarget {
        self.target
    }

    fn renderer(&self) -> RenderFn {
        #[cfg(feature = "console")]
        {
            if self.use_colors {
                return render_colored_text;
            }
        }
        render_text
    }

    /// Consume one close; the last one marks the sink released before
    /// running `flush`, so a failed flush still stops delivery
    fn release_then<F>(&mut self, flush: F) -> Result<()>
    where
        F: FnOnce(&mut Self) -> Result<()>,
    {
        if !self.add.release() {
            return Ok(());
        }
        self.released = true;
        flush(self)
    }

    fn to_stderr(&self, level: LogLevel) -> bool {
        match self.target {
            ConsoleTarget::Stdout => false,
            ConsoleTarget::Stderr => true,
            ConsoleTarget::Split => matches!(level, LogLevel::Error | LogLevel::Fatal),
        }
    }
}

impl Default for ConsoleDestination {
    fn default() -> Self {
        Self::stdout(Flags::STD)
    }
}

impl Destination for ConsoleDestination {
    fn on_add(&mut self) {
        self.add.increment();
    }

    fn deliver(&mut self, entry: &LogEntry) -> Result<()> {
        if self.released {
            return Err(LoggerError::DestinationClosed);
        }
        if !self.level.permits(entry.level) {
            return Ok(());
        }
        let (flags, kind, render) = (self.flags, self.format_kind(), self.renderer());
        if self.to_stderr(entry.level) {
            render_cached(entry, flags, kind, render, &mut io::stderr().lock())
        } else {
            render_cached(entry, flags, kind, render, &mut io::stdout().lock())
        }
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
        #[cfg(feature = "console")]
        {
            if self.use_colors {
                return FormatKind::Custom(COLORED_TEXT_ID);
            }
        }
        FormatKind::Text
    }

    fn flush(&mut self) -> Result<()> {
        match self.target {
            ConsoleTarget::Stdout => io::stdout().flush()?,
            ConsoleTarget::Stderr => io::stderr().flush()?,
            ConsoleTarget::Split => {
                io::stdout().flush()?;
                io::stderr().flush()?;
            }
        }
        Ok(())
    }

    // The process streams stay open; only this sink stops accepting records.
    fn close(&mut self) -> Result<()> {
        self.release_then(Self::flush)
    }

    fn name(&self) -> &str {
        "console"
    }
}

/// Text rendering with the level label coloured by severity
#[cfg(feature = "console")]
pub fn render_colored_text(buf: &mut Vec<u8>, entry: &LogEntry, flags: Flags) -> Result<()> {
    use crate::core::render::{write_text_body, write_text_head};

    write_text_head(buf, entry, flags)?;
    if flags.contains(Flags::LEVEL) {
        let label = format!("[{}]", entry.level.to_str()).color(entry.level.color_code());
        write!(buf, "{} ", label)?;
    }
    write_text_body(buf, entry, flags);
    Ok(())
}
