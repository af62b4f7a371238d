//! Error types for RETRACE.
//!
//! Two families: the trace (or listing) could not be read, or it was read
//! and could not be understood. Callers can tell them apart with
//! [`TraceError::is_io`] and [`TraceError::is_format`].

use std::path::PathBuf;
use thiserror::Error;

/// Trace result type
pub type TraceResult<T> = Result<T, TraceError>;

/// Top-level error for loading and replaying a trace
#[derive(Debug, Error)]
pub enum TraceError {
    /// File missing or unreadable
    #[error("I/O error reading {}: {source}", .path.display())]
    Io {
        /// File that failed to read
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Malformed trace or unrecognized input
    #[error(transparent)]
    Format(#[from] FormatError),
}

impl TraceError {
    /// Wrap an I/O error with the path it came from
    #[must_use]
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// True for "cannot read"
    #[must_use]
    pub const fn is_io(&self) -> bool {
        matches!(self, Self::Io { .. })
    }

    /// True for "cannot parse"
    #[must_use]
    pub const fn is_format(&self) -> bool {
        matches!(self, Self::Format(_))
    }

    /// The format error, if this is one
    #[must_use]
    pub const fn as_format(&self) -> Option<&FormatError> {
        match self {
            Self::Format(err) => Some(err),
            Self::Io { .. } => None,
        }
    }
}

/// Trace format error. Line numbers are 1-based.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    /// File has no terminal total line
    #[error("Trace has no terminal cycle count")]
    MissingTotal,

    /// Terminal line is not an integer
    #[error("Invalid terminal cycle count at line {line}: {text:?}")]
    InvalidTotal {
        /// Line number
        line: usize,
        /// Offending text
        text: String,
    },

    /// `Cycle=` marker with a non-integer value
    #[error("Invalid cycle marker at line {line}: {text:?}")]
    InvalidMarker {
        /// Line number
        line: usize,
        /// Offending text
        text: String,
    },

    /// Line that is neither a marker, an entry, nor the total
    #[error("Malformed line {line}: {text:?}")]
    MalformedLine {
        /// Line number
        line: usize,
        /// Offending text
        text: String,
    },

    /// Marker lower than the one before it
    #[error("Cycle marker out of order at line {line}: Cycle={found} after Cycle={previous}")]
    MarkerOutOfOrder {
        /// Line number
        line: usize,
        /// Previous marker
        previous: u64,
        /// Marker found
        found: u64,
    },

    /// Marker needed for a lookup is absent
    #[error("Missing marker Cycle={cycle}")]
    MissingMarker {
        /// Cycle whose marker is absent
        cycle: u64,
    },

    /// Lookup past the recorded total
    #[error("Cycle {cycle} out of range (total {total})")]
    CycleOutOfRange {
        /// Requested cycle
        cycle: u64,
        /// Recorded total
        total: u64,
    },

    /// Step code outside {-1, 0, 1} under the strict directive policy
    #[error("Unknown step directive: {code}")]
    UnknownDirective {
        /// Raw code
        code: i64,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = FormatError::MissingMarker { cycle: 3 };
        assert_eq!(format!("{}", err), "Missing marker Cycle=3");

        let err = TraceError::from(FormatError::MissingTotal);
        assert_eq!(format!("{}", err), "Trace has no terminal cycle count");
    }

    #[test]
    fn test_io_error_display() {
        let err = TraceError::io(
            "state.txt",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        let s = format!("{}", err);
        assert!(s.contains("state.txt"));
        assert!(s.contains("gone"));
    }

    #[test]
    fn test_error_families() {
        let io = TraceError::io("x", std::io::Error::other("boom"));
        assert!(io.is_io());
        assert!(!io.is_format());
        assert!(io.as_format().is_none());

        let fmt = TraceError::from(FormatError::CycleOutOfRange { cycle: 5, total: 4 });
        assert!(fmt.is_format());
        assert!(!fmt.is_io());
        assert_eq!(
            fmt.as_format(),
            Some(&FormatError::CycleOutOfRange { cycle: 5, total: 4 })
        );
    }

    #[test]
    fn test_out_of_order_display() {
        let err = FormatError::MarkerOutOfOrder {
            line: 7,
            previous: 4,
            found: 2,
        };
        let s = err.to_string();
        assert!(s.contains("line 7"));
        assert!(s.contains("Cycle=2 after Cycle=4"));
    }
}
