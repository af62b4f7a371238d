//! Replay cursor over a cycle trace.
//!
//! The cursor is a plain value: whoever drives it owns it. Sharing one
//! between clients is the caller's job.

use crate::snapshot::Snapshot;
use retrace_core::{BoundaryPolicy, DirectivePolicy, Step, TraceResult};
use retrace_log::{ProgramListing, StoreConfig, TraceLog, TraceStore};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Replay configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplayConfig {
    /// FORWARD behaviour on the last cycle
    pub boundary: BoundaryPolicy,
    /// Decoding of integer step codes
    pub directives: DirectivePolicy,
    /// Trace store settings
    pub store: StoreConfig,
}

/// Cursor over a trace, starting at cycle 0
pub struct ReplayCursor {
    config: ReplayConfig,
    listing: ProgramListing,
    roster: Vec<String>,
    store: TraceStore,
    cycle: u64,
}

impl ReplayCursor {
    /// Open a listing file and a trace file with the default configuration.
    ///
    /// # Errors
    ///
    /// Returns error if either file cannot be read or the trace is malformed
    pub fn open(listing: impl AsRef<Path>, trace: impl AsRef<Path>) -> TraceResult<Self> {
        Self::open_with_config(listing, trace, ReplayConfig::default())
    }

    /// Open with a custom configuration.
    ///
    /// # Errors
    ///
    /// Returns error if either file cannot be read or the trace is malformed
    pub fn open_with_config(
        listing: impl AsRef<Path>,
        trace: impl AsRef<Path>,
        config: ReplayConfig,
    ) -> TraceResult<Self> {
        let listing = ProgramListing::load(listing)?;
        let store = TraceStore::load_with_config(trace, config.store.clone())?;
        Self::new(listing, store).map(|cursor| cursor.with_config(config))
    }

    /// Build from a loaded listing and store. The roster is read once here.
    ///
    /// # Errors
    ///
    /// Returns error if the trace cannot be read or is malformed
    pub fn new(listing: ProgramListing, store: TraceStore) -> TraceResult<Self> {
        let roster = store.roster()?;
        Ok(Self {
            config: ReplayConfig::default(),
            listing,
            roster,
            store,
            cycle: 0,
        })
    }

    /// Replace the configuration. Store settings only apply through
    /// [`Self::open_with_config`].
    #[must_use]
    pub fn with_config(mut self, config: ReplayConfig) -> Self {
        self.config = config;
        self
    }

    /// Current configuration
    #[must_use]
    pub const fn config(&self) -> &ReplayConfig {
        &self.config
    }

    /// Current cycle
    #[must_use]
    pub const fn position(&self) -> u64 {
        self.cycle
    }

    /// Program listing
    #[must_use]
    pub const fn listing(&self) -> &ProgramListing {
        &self.listing
    }

    /// Instruction roster
    #[must_use]
    pub fn roster(&self) -> &[String] {
        &self.roster
    }

    /// Move according to `step` and return the snapshot for the new cycle.
    ///
    /// The position only changes when the snapshot was built; a failed
    /// query leaves the cursor where it was. If the trace on disk now ends
    /// before the current position, the cursor first drops back to its
    /// last cycle.
    ///
    /// # Errors
    ///
    /// Returns error if the trace cannot be read, is malformed, or lacks the
    /// markers for the target cycle
    pub fn query(&mut self, step: Step) -> TraceResult<Snapshot> {
        let log = self.store.read()?;
        let total = log.total();
        // A regenerated trace may be shorter than the position we hold
        if self.cycle > total {
            tracing::warn!(from = self.cycle, total, "trace shrank, cursor pulled back to last cycle");
            self.cycle = total;
        }
        let target = self.target(step, total);

        let snapshot = self.reconstruct(&log, target)?;
        if step.moves() {
            tracing::debug!(%step, from = self.cycle, to = target, total, "cursor moved");
        }
        self.cycle = target;
        Ok(snapshot)
    }

    /// Decode an integer step code with the configured policy, then query.
    ///
    /// # Errors
    ///
    /// As for [`Self::query`], plus
    /// [`retrace_core::FormatError::UnknownDirective`] under the strict
    /// directive policy
    pub fn query_code(&mut self, code: i64) -> TraceResult<Snapshot> {
        let step = Step::from_code(code, self.config.directives)?;
        self.query(step)
    }

    /// Return to cycle 0 and hold.
    ///
    /// # Errors
    ///
    /// As for [`Self::query`]
    pub fn reset(&mut self) -> TraceResult<Snapshot> {
        tracing::debug!(from = self.cycle, "cursor reset");
        self.cycle = 0;
        self.query(Step::Hold)
    }

    fn target(&self, step: Step, total: u64) -> u64 {
        let current = self.cycle;
        match step {
            Step::Hold => current,
            Step::Forward => match self.config.boundary {
                BoundaryPolicy::Clamp => current.saturating_add(1).min(total),
                BoundaryPolicy::Strict => current.saturating_add(1),
            },
            // At 0 this is a no-op, never an error
            Step::Backward => current.saturating_sub(1),
            Step::JumpEnd => total,
        }
    }

    fn reconstruct(&self, log: &TraceLog, cycle: u64) -> TraceResult<Snapshot> {
        let total = log.total();
        let entries = log.entries_for(cycle, total)?;

        let mut snapshot = Snapshot::base(self.listing.lines(), &self.roster, cycle, total);
        snapshot.merge(entries);
        tracing::trace!(cycle, total, attributes = snapshot.attribute_count(), "snapshot built");
        Ok(snapshot)
    }
}

impl std::fmt::Debug for ReplayCursor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReplayCursor")
            .field("cycle", &self.cycle)
            .field("config", &self.config)
            .field("store", &self.store)
            .finish_non_exhaustive()
    }
}
