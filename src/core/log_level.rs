//! Log level definitions

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Severity of a record, also used as a destination threshold.
///
/// A threshold permits a level when `threshold <= level`, so a lower
/// threshold is more verbose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[derive(Default)]
pub enum LogLevel {
    Debug = 0,
    #[default]
    Info = 1,
    Warn = 2,
    Error = 3,
    Fatal = 4,
}

impl LogLevel {
    pub const ALL: [LogLevel; 5] = [
        LogLevel::Debug,
        LogLevel::Info,
        LogLevel::Warn,
        LogLevel::Error,
        LogLevel::Fatal,
    ];

    pub fn to_str(&self) -> &'static str {
        match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
            LogLevel::Fatal => "FATAL",
        }
    }

    /// Numeric ordinal, Debug = 0 through Fatal = 4
    #[inline]
    pub fn ordinal(self) -> u8 {
        self as u8
    }

    pub fn from_ordinal(ordinal: u8) -> Option<Self> {
        Self::ALL.get(ordinal as usize).copied()
    }

    /// Whether a destination with this threshold accepts `level`
    #[inline]
    pub fn permits(self, level: LogLevel) -> bool {
        self <= level
    }

    /// One step more verbose, saturating at Debug
    pub fn lower(self) -> Self {
        Self::from_ordinal(self.ordinal().saturating_sub(1)).unwrap_or(self)
    }

    /// One step less verbose, saturating at Error so a threshold can never
    /// silence Fatal records by accident
    pub fn restrict(self) -> Self {
        if self < LogLevel::Error {
            Self::from_ordinal(self.ordinal() + 1).unwrap_or(self)
        } else {
            self
        }
    }

    #[cfg(feature = "console")]
    pub fn color_code(&self) -> colored::Color {
        use colored::Color::*;
        match self {
            LogLevel::Debug => Blue,
            LogLevel::Info => Green,
            LogLevel::Warn => Yellow,
            LogLevel::Error => Red,
            LogLevel::Fatal => BrightRed,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_str())
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "DEBUG" => Ok(LogLevel::Debug),
            "INFO" => Ok(LogLevel::Info),
            "WARN" | "WARNING" => Ok(LogLevel::Warn),
            "ERROR" => Ok(LogLevel::Error),
            "FATAL" => Ok(LogLevel::Fatal),
            _ => Err(format!("Invalid log level: '{}'", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permits() {
        assert!(LogLevel::Warn.permits(LogLevel::Warn));
        assert!(LogLevel::Warn.permits(LogLevel::Fatal));
        assert!(!LogLevel::Warn.permits(LogLevel::Info));
        assert!(LogLevel::Debug.permits(LogLevel::Debug));
    }

    #[test]
    fn test_lower_and_restrict() {
        assert_eq!(LogLevel::Info.lower(), LogLevel::Debug);
        assert_eq!(LogLevel::Debug.lower(), LogLevel::Debug);
        assert_eq!(LogLevel::Info.restrict(), LogLevel::Warn);
        assert_eq!(LogLevel::Error.restrict(), LogLevel::Error);
        assert_eq!(LogLevel::Fatal.restrict(), LogLevel::Fatal);
    }

    #[test]
    fn test_ordinals() {
        for (i, level) in LogLevel::ALL.iter().enumerate() {
            assert_eq!(level.ordinal() as usize, i);
            assert_eq!(LogLevel::from_ordinal(i as u8), Some(*level));
        }
        assert_eq!(LogLevel::from_ordinal(5), None);
    }

    #[test]
    fn test_parse() {
        assert_eq!("warning".parse::<LogLevel>(), Ok(LogLevel::Warn));
        assert_eq!("Fatal".parse::<LogLevel>(), Ok(LogLevel::Fatal));
        assert!("trace".parse::<LogLevel>().is_err());
    }
}
