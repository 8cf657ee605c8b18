//! Render flags
//!
//! A [`Flags`] value selects which parts of a record a renderer emits and
//! how. Two destinations with equal flags and format kind share one rendered
//! buffer per record, so flags are also half of the compiled-output cache key.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{BitAnd, BitOr, BitOrAssign, Sub};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Flags(u16);

/// How the field list is embedded in a rendered record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldStyle {
    /// Every field becomes a key of the record itself
    TopLevel,
    /// `"fields":{"k":v,...}`
    NestedObject,
    /// `"fields":[{"k":v},...]`
    NestedArray,
}

/// Which prefixes are rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrefixMode {
    All,
    Last,
}

const NAMES: [(&str, Flags); 10] = [
    ("time", Flags::TIME),
    ("micro", Flags::MICRO),
    ("prefix", Flags::PREFIX),
    ("last_prefix", Flags::LAST_PREFIX),
    ("level", Flags::LEVEL),
    ("newline", Flags::NEWLINE),
    ("fields", Flags::FIELDS),
    ("fields_object", Flags::FIELDS_NESTED_OBJECT),
    ("fields_array", Flags::FIELDS_NESTED_ARRAY),
    ("not_save", Flags::NOT_SAVE),
];

impl Flags {
    /// Render the timestamp (`DD/MM/YYYY HH:MM:SS` in text)
    pub const TIME: Flags = Flags(1 << 0);
    /// Add microseconds to the text timestamp; implies TIME, ignored by JSON
    pub const MICRO: Flags = Flags(1 << 1);
    /// Render every prefix
    pub const PREFIX: Flags = Flags(1 << 2);
    /// Render only the last prefix; wins over PREFIX
    pub const LAST_PREFIX: Flags = Flags(1 << 3);
    /// Render the level label
    pub const LEVEL: Flags = Flags(1 << 4);
    /// Terminate with `\n` (text: only if the message lacks one)
    pub const NEWLINE: Flags = Flags(1 << 5);
    /// Fields as top-level keys
    pub const FIELDS: Flags = Flags(1 << 6);
    /// Fields as one nested object
    pub const FIELDS_NESTED_OBJECT: Flags = Flags(1 << 7);
    /// Fields as an array of single-key objects
    pub const FIELDS_NESTED_ARRAY: Flags = Flags(1 << 8);
    /// Do not keep the rendered buffer in the record cache
    pub const NOT_SAVE: Flags = Flags(1 << 9);

    /// Flags used by the default logger
    pub const STD: Flags = Flags(
        Self::TIME.0 | Self::PREFIX.0 | Self::LEVEL.0 | Self::NEWLINE.0 | Self::FIELDS.0,
    );

    #[inline]
    pub const fn empty() -> Self {
        Flags(0)
    }

    #[inline]
    pub const fn from_bits(bits: u16) -> Self {
        Flags(bits)
    }

    #[inline]
    pub const fn bits(self) -> u16 {
        self.0
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// All bits of `other` are set
    #[inline]
    pub const fn contains(self, other: Flags) -> bool {
        self.0 & other.0 == other.0
    }

    /// Any bit of `other` is set
    #[inline]
    pub const fn intersects(self, other: Flags) -> bool {
        self.0 & other.0 != 0
    }

    #[must_use]
    pub const fn with(self, other: Flags) -> Self {
        Flags(self.0 | other.0)
    }

    #[must_use]
    pub const fn without(self, other: Flags) -> Self {
        Flags(self.0 & !other.0)
    }

    pub fn shows_time(self) -> bool {
        self.intersects(Flags::TIME.with(Flags::MICRO))
    }

    pub fn prefix_mode(self) -> Option<PrefixMode> {
        if self.contains(Flags::LAST_PREFIX) {
            Some(PrefixMode::Last)
        } else if self.contains(Flags::PREFIX) {
            Some(PrefixMode::All)
        } else {
            None
        }
    }

    /// Selected field embedding; nested object beats top level beats array
    pub fn field_style(self) -> Option<FieldStyle> {
        if self.contains(Flags::FIELDS_NESTED_OBJECT) {
            Some(FieldStyle::NestedObject)
        } else if self.contains(Flags::FIELDS) {
            Some(FieldStyle::TopLevel)
        } else if self.contains(Flags::FIELDS_NESTED_ARRAY) {
            Some(FieldStyle::NestedArray)
        } else {
            None
        }
    }
}

impl BitOr for Flags {
    type Output = Flags;

    fn bitor(self, rhs: Flags) -> Flags {
        Flags(self.0 | rhs.0)
    }
}

impl BitOrAssign for Flags {
    fn bitor_assign(&mut self, rhs: Flags) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for Flags {
    type Output = Flags;

    fn bitand(self, rhs: Flags) -> Flags {
        Flags(self.0 & rhs.0)
    }
}

impl Sub for Flags {
    type Output = Flags;

    fn sub(self, rhs: Flags) -> Flags {
        self.without(rhs)
    }
}

impl From<u16> for Flags {
    fn from(bits: u16) -> Self {
        Flags(bits)
    }
}

impl fmt::Display for Flags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (name, flag) in NAMES {
            if self.contains(flag) {
                if !first {
                    f.write_str("|")?;
                }
                f.write_str(name)?;
                first = false;
            }
        }
        if first {
            f.write_str("none")?;
        }
        Ok(())
    }
}

/// Parses `|`- or `,`-separated names such as `"time|level|newline"`.
/// `"std"` expands to [`Flags::STD`], `"none"` or an empty string to no bits.
impl FromStr for Flags {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut flags = Flags::empty();
        for part in s.split(['|', ',']).map(str::trim).filter(|p| !p.is_empty()) {
            let lower = part.to_lowercase();
            match lower.as_str() {
                "std" => flags |= Flags::STD,
                "none" => {}
                name => {
                    let (_, flag) = NAMES
                        .iter()
                        .find(|(n, _)| *n == name)
                        .ok_or_else(|| format!("Invalid flag: '{}'", part))?;
                    flags |= *flag;
                }
            }
        }
        Ok(flags)
    }
}
