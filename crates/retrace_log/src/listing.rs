//! Program listing shown alongside every snapshot.

use retrace_core::{TraceError, TraceResult};
use std::path::Path;

/// Source lines of the simulated program, in file order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProgramListing {
    lines: Vec<String>,
}

impl ProgramListing {
    /// Load a listing file. Line terminators are dropped, nothing else is.
    ///
    /// # Errors
    ///
    /// Returns [`TraceError::Io`] if the file cannot be read.
    pub fn load(path: impl AsRef<Path>) -> TraceResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| TraceError::io(path, e))?;
        let listing = Self::from_text(&text);
        tracing::debug!(path = %path.display(), lines = listing.len(), "listing loaded");
        Ok(listing)
    }

    /// Build from in-memory text
    #[must_use]
    pub fn from_text(text: &str) -> Self {
        Self {
            lines: text
                .lines()
                .map(|l| l.trim_end_matches('\r').to_string())
                .collect(),
        }
    }

    /// Build from lines
    #[must_use]
    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
        }
    }

    /// Listing lines
    #[must_use]
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Number of lines
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Whether the listing is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}
