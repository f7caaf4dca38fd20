//! Log levels and the token parser used by `/log-level`.
//!
//! Every level is reachable by its canonical name, a single-letter short
//! form, or its ordinal:
//!
//! | Level | Ordinal | Short | Name  |
//! |-------|---------|-------|-------|
//! | DEBUG | `0`     | `d`   | debug |
//! | INFO  | `1`     | `i`   | info  |
//! | WARN  | `2`     | `w`   | warn  |
//! | ERROR | `3`     | `e`   | error |
//! | FATAL | `4`     | `f`   | fatal |
//!
//! Names and short forms match case-insensitively.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Log level, ordered from most to least verbose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum LogLevel {
    Debug = 0,
    Info = 1,
    Warn = 2,
    Error = 3,
    Fatal = 4,
}

/// Level token rejected by [`LogLevel::parse`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseLevelError {
    #[error("empty log level")]
    EmptyLevel,

    #[error("unrecognized log level: {0}")]
    UnrecognizedLevel(String),
}

impl LogLevel {
    /// All levels in ascending order.
    pub const ALL: [LogLevel; 5] = [
        LogLevel::Debug,
        LogLevel::Info,
        LogLevel::Warn,
        LogLevel::Error,
        LogLevel::Fatal,
    ];

    /// Canonical lowercase name.
    pub const fn name(self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
            LogLevel::Fatal => "fatal",
        }
    }

    /// Single-letter short form.
    pub const fn short(self) -> char {
        match self {
            LogLevel::Debug => 'd',
            LogLevel::Info => 'i',
            LogLevel::Warn => 'w',
            LogLevel::Error => 'e',
            LogLevel::Fatal => 'f',
        }
    }

    /// Zero-based position in the level order.
    pub const fn ordinal(self) -> u8 {
        self as u8
    }

    /// Level at `ordinal`, if any.
    pub const fn from_ordinal(ordinal: u8) -> Option<Self> {
        match ordinal {
            0 => Some(LogLevel::Debug),
            1 => Some(LogLevel::Info),
            2 => Some(LogLevel::Warn),
            3 => Some(LogLevel::Error),
            4 => Some(LogLevel::Fatal),
            _ => None,
        }
    }

    /// Parse a raw level token.
    ///
    /// Surrounding ASCII whitespace is ignored and the remainder is
    /// lowercased before being matched against the full table. There is no
    /// prefix matching: `"deb"` is rejected.
    pub fn parse(raw: &[u8]) -> Result<Self, ParseLevelError> {
        let token = raw.trim_ascii();
        if token.is_empty() {
            return Err(ParseLevelError::EmptyLevel);
        }

        let lowered = token.to_ascii_lowercase();
        match lowered.as_slice() {
            b"debug" | b"d" | b"0" => Ok(LogLevel::Debug),
            b"info" | b"i" | b"1" => Ok(LogLevel::Info),
            b"warn" | b"w" | b"2" => Ok(LogLevel::Warn),
            b"error" | b"e" | b"3" => Ok(LogLevel::Error),
            b"fatal" | b"f" | b"4" => Ok(LogLevel::Fatal),
            _ => Err(ParseLevelError::UnrecognizedLevel(
                String::from_utf8_lossy(token).into_owned(),
            )),
        }
    }
}

/// Normalize a raw level token to its canonical lowercase name.
pub fn normalize(raw: &[u8]) -> Result<&'static str, ParseLevelError> {
    LogLevel::parse(raw).map(LogLevel::name)
}

impl FromStr for LogLevel {
    type Err = ParseLevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LogLevel::parse(s.as_bytes())
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_form_normalizes() {
        for level in LogLevel::ALL {
            let name = level.name();
            let short = level.short().to_string();
            let ordinal = level.ordinal().to_string();

            let forms = [
                name.to_string(),
                name.to_uppercase(),
                short.clone(),
                short.to_uppercase(),
                ordinal,
            ];

            for form in forms {
                assert_eq!(normalize(form.as_bytes()), Ok(name), "form {form:?}");
            }
        }
    }

    #[test]
    fn test_mixed_case() {
        assert_eq!(normalize(b"DeBuG"), Ok("debug"));
        assert_eq!(normalize(b"3"), Ok("error"));
        assert_eq!(normalize(b"w"), Ok("warn"));
        assert_eq!(normalize(b"FaTaL"), Ok("fatal"));
    }

    #[test]
    fn test_trailing_newline_ignored() {
        assert_eq!(normalize(b"info\n"), Ok("info"));
        assert_eq!(normalize(b"  e \r\n"), Ok("error"));
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(normalize(b""), Err(ParseLevelError::EmptyLevel));
        assert_eq!(normalize(b" \n"), Err(ParseLevelError::EmptyLevel));
    }

    #[test]
    fn test_unrecognized_input() {
        let err = normalize(b"invalid").unwrap_err();
        assert_eq!(err, ParseLevelError::UnrecognizedLevel("invalid".to_string()));
        assert!(err.to_string().contains("invalid"));

        // no prefix or partial matches
        assert!(normalize(b"deb").is_err());
        assert!(normalize(b"debugx").is_err());
        assert!(normalize(b"5").is_err());
        assert!(normalize(b"-1").is_err());
        assert!(normalize(b"01").is_err());
    }

    #[test]
    fn test_invalid_utf8_is_unrecognized() {
        let err = normalize(&[0xff, 0xfe]).unwrap_err();
        assert!(matches!(err, ParseLevelError::UnrecognizedLevel(_)));
    }

    #[test]
    fn test_ordering_and_ordinals() {
        assert!(LogLevel::Debug < LogLevel::Info);
        assert!(LogLevel::Info < LogLevel::Warn);
        assert!(LogLevel::Warn < LogLevel::Error);
        assert!(LogLevel::Error < LogLevel::Fatal);

        for (i, level) in LogLevel::ALL.iter().enumerate() {
            assert_eq!(level.ordinal() as usize, i);
            assert_eq!(LogLevel::from_ordinal(i as u8), Some(*level));
        }
        assert_eq!(LogLevel::from_ordinal(5), None);
    }

    #[test]
    fn test_from_str_and_display() {
        let level: LogLevel = "WARN".parse().unwrap();
        assert_eq!(level, LogLevel::Warn);
        assert_eq!(level.to_string(), "warn");
    }
}
