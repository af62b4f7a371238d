//! Parsed view of a cycle trace.
//!
//! Layout of a trace file:
//!
//! ```text
//! instr=...        roster lines (preamble, before the first marker)
//! Cycle=1          marker
//! key=value        entries of cycle 1
//! Cycle=2
//! key=value
//! 2                terminal total cycle count
//! ```

use crate::record::{Entry, INSTR_KEY, Record};
use indexmap::IndexMap;
use retrace_core::FormatError;

/// Parsed trace: roster, per-cycle entries, and total cycle count
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceLog {
    /// Instruction roster from the preamble
    roster: Vec<String>,
    /// Entries keyed by cycle, in marker order
    cycles: IndexMap<u64, Vec<Entry>>,
    /// Terminal total
    total: u64,
}

impl TraceLog {
    /// Parse the full text of a trace file.
    ///
    /// Blank lines are skipped. A marker equal to the previous one continues
    /// that cycle. Gaps are accepted here and reported on lookup.
    ///
    /// # Errors
    ///
    /// Returns a [`FormatError`] for a missing or non-integer total, a
    /// malformed line, or a marker lower than its predecessor.
    pub fn parse(text: &str) -> Result<Self, FormatError> {
        let lines: Vec<(usize, &str)> = text
            .lines()
            .enumerate()
            .map(|(i, l)| (i + 1, l.trim_end_matches('\r')))
            .filter(|(_, l)| !l.trim().is_empty())
            .collect();

        let ((total_line, total_text), body) =
            lines.split_last().ok_or(FormatError::MissingTotal)?;
        let total = total_text
            .trim()
            .parse::<u64>()
            .map_err(|_| FormatError::InvalidTotal {
                line: *total_line,
                text: (*total_text).to_string(),
            })?;

        let mut roster = Vec::new();
        let mut cycles: IndexMap<u64, Vec<Entry>> = IndexMap::new();
        let mut current: Option<u64> = None;

        for &(line, text) in body {
            match Record::parse(line, text)? {
                Record::Marker(cycle) => {
                    if let Some(previous) = current {
                        if cycle < previous {
                            return Err(FormatError::MarkerOutOfOrder {
                                line,
                                previous,
                                found: cycle,
                            });
                        }
                    }
                    cycles.entry(cycle).or_default();
                    current = Some(cycle);
                }
                Record::Entry { key, value } => match current {
                    // Preamble: only the roster matters, `code=` echoes the listing
                    None => {
                        if key == INSTR_KEY {
                            roster.push(value.to_string());
                        }
                    }
                    Some(cycle) => {
                        cycles.entry(cycle).or_default().push(Entry::new(key, value));
                    }
                },
            }
        }

        Ok(Self {
            roster,
            cycles,
            total,
        })
    }

    /// Total cycle count from the terminal line
    #[must_use]
    pub const fn total(&self) -> u64 {
        self.total
    }

    /// Instruction roster
    #[must_use]
    pub fn roster(&self) -> &[String] {
        &self.roster
    }

    /// Whether a `Cycle=N` marker was recorded
    #[must_use]
    pub fn has_marker(&self, cycle: u64) -> bool {
        self.cycles.contains_key(&cycle)
    }

    /// Number of distinct markers recorded
    #[must_use]
    pub fn marker_count(&self) -> usize {
        self.cycles.len()
    }

    /// Entries strictly between the marker for `cycle` and the marker for
    /// `cycle + 1`, or the terminal line when `cycle == total`.
    ///
    /// Cycle 0 without a `Cycle=0` marker resolves to no entries.
    ///
    /// # Errors
    ///
    /// [`FormatError::CycleOutOfRange`] when `cycle > total`;
    /// [`FormatError::MissingMarker`] when either bounding marker is absent.
    pub fn entries_for(&self, cycle: u64, total: u64) -> Result<&[Entry], FormatError> {
        if cycle > total {
            return Err(FormatError::CycleOutOfRange { cycle, total });
        }

        let Some(entries) = self.cycles.get(&cycle) else {
            if cycle == 0 {
                return Ok(&[]);
            }
            return Err(FormatError::MissingMarker { cycle });
        };

        if cycle < total && !self.has_marker(cycle + 1) {
            return Err(FormatError::MissingMarker { cycle: cycle + 1 });
        }

        Ok(entries)
    }

    /// [`Self::entries_for`] against this log's own total
    ///
    /// # Errors
    ///
    /// See [`Self::entries_for`].
    pub fn entries(&self, cycle: u64) -> Result<&[Entry], FormatError> {
        self.entries_for(cycle, self.total)
    }
}
