//! Single-line trace records.

use retrace_core::FormatError;
use serde::{Deserialize, Serialize};

/// Key of a cycle marker line
pub const MARKER_KEY: &str = "Cycle";

/// Key of an instruction roster line
pub const INSTR_KEY: &str = "instr";

/// Attribute entry, `key=value`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Entry {
    /// Attribute name
    pub key: String,
    /// Attribute value, verbatim
    pub value: String,
}

impl Entry {
    /// Create an entry
    #[must_use]
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// One non-terminal trace line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Record<'a> {
    /// `Cycle=N`
    Marker(u64),
    /// `key=value`, split at the first `=`
    Entry {
        /// Attribute name
        key: &'a str,
        /// Attribute value
        value: &'a str,
    },
}

impl<'a> Record<'a> {
    /// Parse a body line. `line` is the 1-based line number used in errors.
    ///
    /// # Errors
    ///
    /// Returns [`FormatError::MalformedLine`] when the line has no `=` and
    /// [`FormatError::InvalidMarker`] when a `Cycle=` value is not an integer.
    pub fn parse(line: usize, text: &'a str) -> Result<Self, FormatError> {
        let (key, value) = text.split_once('=').ok_or_else(|| FormatError::MalformedLine {
            line,
            text: text.to_string(),
        })?;

        if key == MARKER_KEY {
            let cycle = value
                .trim()
                .parse::<u64>()
                .map_err(|_| FormatError::InvalidMarker {
                    line,
                    text: text.to_string(),
                })?;
            return Ok(Self::Marker(cycle));
        }

        Ok(Self::Entry { key, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_marker() {
        assert_eq!(Record::parse(1, "Cycle=12"), Ok(Record::Marker(12)));
    }

    #[test]
    fn test_parse_entry() {
        assert_eq!(
            Record::parse(1, "RB0-InstrStatus=executing"),
            Ok(Record::Entry {
                key: "RB0-InstrStatus",
                value: "executing"
            })
        );
    }

    #[test]
    fn test_parse_entry_splits_at_first_equals() {
        assert_eq!(
            Record::parse(1, "code=lw 1,0,a=b"),
            Ok(Record::Entry {
                key: "code",
                value: "lw 1,0,a=b"
            })
        );
    }

    #[test]
    fn test_parse_empty_value() {
        assert_eq!(
            Record::parse(1, "R1-Note="),
            Ok(Record::Entry {
                key: "R1-Note",
                value: ""
            })
        );
    }

    #[test]
    fn test_parse_malformed() {
        assert_eq!(
            Record::parse(4, "garbage"),
            Err(FormatError::MalformedLine {
                line: 4,
                text: "garbage".to_string()
            })
        );
    }

    #[test]
    fn test_parse_bad_marker() {
        assert!(matches!(
            Record::parse(2, "Cycle=two"),
            Err(FormatError::InvalidMarker { line: 2, .. })
        ));
        assert!(matches!(
            Record::parse(2, "Cycle=-1"),
            Err(FormatError::InvalidMarker { .. })
        ));
    }

    #[test]
    fn test_entry_serialization() {
        let entry = Entry::new("RS1", "busy");
        let json = serde_json::to_string(&entry).unwrap();
        assert_eq!(json, r#"{"key":"RS1","value":"busy"}"#);
    }
}
