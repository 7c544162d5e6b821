//! The fixed set of field delimiters the checker understands.

use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};

use crate::error::CheckError;

/// A field delimiter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Delimiter {
    /// Comma (`,`).
    Comma,
    /// Pipe (`|`).
    Pipe,
    /// Tab (`\t`).
    Tab,
    /// Semicolon (`;`).
    Semicolon,
}

impl Delimiter {
    /// Detection priority: the first consistent candidate in this order wins.
    pub const PRIORITY: [Delimiter; 4] = [
        Delimiter::Comma,
        Delimiter::Pipe,
        Delimiter::Tab,
        Delimiter::Semicolon,
    ];

    /// Returns the delimiter as a character.
    pub const fn as_char(self) -> char {
        self.as_byte() as char
    }

    /// Returns the delimiter as an ASCII byte.
    pub const fn as_byte(self) -> u8 {
        match self {
            Delimiter::Comma => b',',
            Delimiter::Pipe => b'|',
            Delimiter::Tab => b'\t',
            Delimiter::Semicolon => b';',
        }
    }

    /// Returns a printable name, so tabs stay visible in reports.
    pub const fn name(self) -> &'static str {
        match self {
            Delimiter::Comma => "comma",
            Delimiter::Pipe => "pipe",
            Delimiter::Tab => "tab",
            Delimiter::Semicolon => "semicolon",
        }
    }
}

impl TryFrom<char> for Delimiter {
    type Error = CheckError;

    fn try_from(c: char) -> Result<Self, Self::Error> {
        match c {
            ',' => Ok(Delimiter::Comma),
            '|' => Ok(Delimiter::Pipe),
            '\t' => Ok(Delimiter::Tab),
            ';' => Ok(Delimiter::Semicolon),
            other => Err(CheckError::InvalidConfig(format!(
                "unsupported delimiter {other:?} (expected one of , | tab ;)"
            ))),
        }
    }
}

impl FromStr for Delimiter {
    type Err = CheckError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "comma" => return Ok(Delimiter::Comma),
            "pipe" => return Ok(Delimiter::Pipe),
            "tab" | "\\t" => return Ok(Delimiter::Tab),
            "semicolon" => return Ok(Delimiter::Semicolon),
            _ => {}
        }

        let mut chars = s.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Delimiter::try_from(c),
            _ => Err(CheckError::InvalidConfig(format!(
                "delimiter must be a single character, got {s:?}"
            ))),
        }
    }
}

impl fmt::Display for Delimiter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Delimiter::Tab => write!(f, "\\t"),
            other => write!(f, "{}", other.as_char()),
        }
    }
}

impl Serialize for Delimiter {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_char(self.as_char())
    }
}
