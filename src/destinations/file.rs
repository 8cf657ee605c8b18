//! File destination

use crate::core::{
    render::{render_cached, FormatKind},
    AddCount, Destination, Flags, LogEntry, LogLevel, LoggerError, Result,
};
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// How a [`FileDestination`] opens its file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileOptions {
    /// Append to existing content instead of truncating it
    pub append: bool,

    /// Take an exclusive advisory lock for the destination's lifetime
    pub exclusive_lock: bool,

    pub flags: Flags,
    pub level: LogLevel,
    pub format: FormatKind,
}

impl Default for FileOptions {
    fn default() -> Self {
        Self {
            append: true,
            exclusive_lock: false,
            flags: Flags::STD,
            level: LogLevel::Info,
            format: FormatKind::Text,
        }
    }
}

pub struct FileDestination {
    path: PathBuf,
    writer: Option<BufWriter<File>>,
    add: AddCount,
    flags: Flags,
    level: LogLevel,
    kind: FormatKind,
    name: String,
}

impl FileDestination {
    /// Append text lines with [`Flags::STD`] to `path`
    pub fn new(path: impl Into<PathBuf>) -> Result<Self> {
        Self::with_options(path, FileOptions::default())
    }

    /// Open `path` as described by `options`.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use rust_fanout_logger::destinations::{FileDestination, FileOptions};
    /// use rust_fanout_logger::{Flags, FormatKind};
    ///
    /// let json = FileDestination::with_options(
    ///     "/var/log/app.jsonl",
    ///     FileOptions {
    ///         format: FormatKind::Json,
    ///         flags: Flags::TIME | Flags::LEVEL | Flags::FIELDS | Flags::NEWLINE,
    ///         ..FileOptions::default()
    ///     },
    /// )
    /// .unwrap();
    /// ```
    pub fn with_options(path: impl Into<PathBuf>, options: FileOptions) -> Result<Self> {
        let path = path.into();
        if options.format.renderer().is_none() {
            return Err(LoggerError::config(
                "file destination",
                format!("no renderer for format {:?}", options.format),
            ));
        }

        let mut open = OpenOptions::new();
        open.create(true);
        if options.append {
            open.append(true);
        } else {
            open.write(true).truncate(true);
        }
        let file = open
            .open(&path)
            .map_err(|e| LoggerError::file_destination(path.display().to_string(), e.to_string()))?;

        if options.exclusive_lock {
            lock_exclusive(&file, &path)?;
        }

        Ok(Self {
            name: format!("file:{}", path.display()),
            path,
            writer: Some(BufWriter::new(file)),
            add: AddCount::default(),
            flags: options.flags,
            level: options.level,
            kind: options.format,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_released(&self) -> bool {
        self.writer.is_none()
    }
}

#[cfg(feature = "file")]
fn lock_exclusive(file: &File, path: &Path) -> Result<()> {
    use fs2::FileExt;
    file.try_lock_exclusive()
        .map_err(|_| LoggerError::file_lock(path.display().to_string()))
}

#[cfg(not(feature = "file"))]
fn lock_exclusive(_file: &File, path: &Path) -> Result<()> {
    Err(LoggerError::config(
        "file destination",
        format!(
            "exclusive lock on {} requires the `file` feature",
            path.display()
        ),
    ))
}

impl Destination for FileDestination {
    fn on_add(&mut self) {
        self.add.increment();
    }

    fn deliver(&mut self, entry: &LogEntry) -> Result<()> {
        let writer = self.writer.as_mut().ok_or(LoggerError::DestinationClosed)?;
        if !self.level.permits(entry.level) {
            return Ok(());
        }
        let render = self
            .kind
            .renderer()
            .ok_or_else(|| LoggerError::writer("file destination has no renderer"))?;
        render_cached(entry, self.flags, self.kind, render, writer)
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
        match self.writer.take() {
            Some(mut writer) => writer.flush().map_err(|e| {
                LoggerError::io_operation("close", self.path.display().to_string(), e)
            }),
            None => Ok(()),
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl Drop for FileDestination {
    fn drop(&mut self) {
        // Unflushed lines must not be lost when the destination was never closed
        let _ = self.flush();
    }
}
