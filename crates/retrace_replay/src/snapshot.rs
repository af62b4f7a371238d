//! Reconstructed per-cycle state.

use indexmap::IndexMap;
use retrace_log::Entry;
use serde::{Deserialize, Serialize};

/// Keys owned by the snapshot itself; trace attributes cannot shadow them
pub const RESERVED_KEYS: [&str; 4] = ["code", "instr", "cycle", "done"];

/// Full state for one cycle.
///
/// Serializes as a flat JSON object: the four base fields plus one string
/// field per attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Program listing
    pub code: Vec<String>,
    /// Instruction roster
    pub instr: Vec<String>,
    /// Cycle this snapshot describes
    pub cycle: u64,
    /// Whether `cycle` is the last recorded cycle
    pub done: bool,
    /// Attributes merged from the cycle's entries
    #[serde(flatten)]
    pub attributes: IndexMap<String, String>,
}

impl Snapshot {
    /// Base snapshot with no attributes
    #[must_use]
    pub fn base(code: &[String], instr: &[String], cycle: u64, total: u64) -> Self {
        Self {
            code: code.to_vec(),
            instr: instr.to_vec(),
            cycle,
            done: cycle == total,
            attributes: IndexMap::new(),
        }
    }

    /// Merge entries in order; the last value for a key wins
    pub fn merge<'a, I>(&mut self, entries: I)
    where
        I: IntoIterator<Item = &'a Entry>,
    {
        for entry in entries {
            if RESERVED_KEYS.contains(&entry.key.as_str()) {
                tracing::warn!(key = %entry.key, cycle = self.cycle, "reserved key in trace entry dropped");
                continue;
            }
            self.attributes.insert(entry.key.clone(), entry.value.clone());
        }
    }

    /// Attribute value by name
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    /// Number of attributes
    #[must_use]
    pub fn attribute_count(&self) -> usize {
        self.attributes.len()
    }
}
