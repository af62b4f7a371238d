//! File-backed trace store.
//!
//! The generator may still be appending while a replay is running, so every
//! query goes back to disk. [`StoreConfig::cache_by_mtime`] turns on a
//! cache keyed by the file's modification time and length.

use crate::record::Entry;
use crate::trace::TraceLog;
use retrace_core::{TraceError, TraceResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::SystemTime;

/// Store configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Reuse the last parse while the file's mtime and length are unchanged
    pub cache_by_mtime: bool,
}

/// Fingerprint of the file a cached parse came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FileStamp {
    modified: SystemTime,
    len: u64,
}

struct CachedLog {
    stamp: FileStamp,
    log: Arc<TraceLog>,
}

/// Trace store reading a trace file on demand
pub struct TraceStore {
    /// Trace file
    path: PathBuf,
    /// Store configuration
    config: StoreConfig,
    /// Last parse, only used with `cache_by_mtime`
    cache: Mutex<Option<CachedLog>>,
}

impl TraceStore {
    /// Open a trace file with the default configuration.
    ///
    /// The file is read and parsed once so a bad trace fails here.
    ///
    /// # Errors
    ///
    /// [`TraceError::Io`] if the file cannot be read, [`TraceError::Format`]
    /// if it does not parse.
    pub fn load(path: impl AsRef<Path>) -> TraceResult<Self> {
        Self::load_with_config(path, StoreConfig::default())
    }

    /// Open a trace file with a custom configuration.
    ///
    /// # Errors
    ///
    /// See [`Self::load`].
    pub fn load_with_config(path: impl AsRef<Path>, config: StoreConfig) -> TraceResult<Self> {
        let store = Self {
            path: path.as_ref().to_path_buf(),
            config,
            cache: Mutex::new(None),
        };
        let log = store.read()?;
        tracing::debug!(
            path = %store.path.display(),
            total = log.total(),
            markers = log.marker_count(),
            roster = log.roster().len(),
            "trace loaded"
        );
        Ok(store)
    }

    /// Trace file path
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Store configuration
    #[must_use]
    pub const fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// One coherent parse of the file as it is now.
    ///
    /// # Errors
    ///
    /// See [`Self::load`].
    pub fn read(&self) -> TraceResult<Arc<TraceLog>> {
        if !self.config.cache_by_mtime {
            return self.parse_file().map(Arc::new);
        }

        let stamp = self.stamp()?;
        let mut cache = self.cache.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(cached) = cache.as_ref() {
            if cached.stamp == stamp {
                tracing::trace!(path = %self.path.display(), "trace cache hit");
                return Ok(Arc::clone(&cached.log));
            }
        }

        let log = Arc::new(self.parse_file()?);
        *cache = Some(CachedLog {
            stamp,
            log: Arc::clone(&log),
        });
        Ok(log)
    }

    /// Total cycle count, read fresh
    ///
    /// # Errors
    ///
    /// See [`Self::load`].
    pub fn total_cycles(&self) -> TraceResult<u64> {
        Ok(self.read()?.total())
    }

    /// Entries recorded for `cycle`, bounded by the next marker or by the
    /// terminal line when `cycle == total`.
    ///
    /// # Errors
    ///
    /// I/O and parse errors as for [`Self::load`], plus
    /// [`retrace_core::FormatError::MissingMarker`] and
    /// [`retrace_core::FormatError::CycleOutOfRange`].
    pub fn entries_for(&self, cycle: u64, total: u64) -> TraceResult<Vec<Entry>> {
        let log = self.read()?;
        Ok(log.entries_for(cycle, total)?.to_vec())
    }

    /// Instruction roster from the preamble
    ///
    /// # Errors
    ///
    /// See [`Self::load`].
    pub fn roster(&self) -> TraceResult<Vec<String>> {
        Ok(self.read()?.roster().to_vec())
    }

    fn parse_file(&self) -> TraceResult<TraceLog> {
        let text =
            std::fs::read_to_string(&self.path).map_err(|e| TraceError::io(&self.path, e))?;
        let log = TraceLog::parse(&text).inspect_err(|e| {
            tracing::warn!(path = %self.path.display(), error = %e, "malformed trace");
        })?;
        tracing::debug!(path = %self.path.display(), total = log.total(), "trace read");
        Ok(log)
    }

    fn stamp(&self) -> TraceResult<FileStamp> {
        let meta = std::fs::metadata(&self.path).map_err(|e| TraceError::io(&self.path, e))?;
        let modified = meta.modified().map_err(|e| TraceError::io(&self.path, e))?;
        Ok(FileStamp {
            modified,
            len: meta.len(),
        })
    }
}

impl std::fmt::Debug for TraceStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TraceStore")
            .field("path", &self.path)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use retrace_core::FormatError;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn trace_file(text: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(text.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_store_load() {
        let file = trace_file("instr=1\nCycle=1\nRS1=busy\nCycle=2\nRS1=free\n2");
        let store = TraceStore::load(file.path()).unwrap();
        assert_eq!(store.total_cycles().unwrap(), 2);
        assert_eq!(store.roster().unwrap(), vec!["1".to_string()]);
        assert_eq!(store.entries_for(2, 2).unwrap(), vec![Entry::new("RS1", "free")]);
    }

    #[test]
    fn test_store_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = TraceStore::load(dir.path().join("state.txt")).unwrap_err();
        assert!(err.is_io());
    }

    #[test]
    fn test_store_bad_total() {
        let file = trace_file("Cycle=1\nRS1=busy\nnot-a-number");
        let err = TraceStore::load(file.path()).unwrap_err();
        assert!(err.is_format());
    }

    #[test]
    fn test_store_missing_marker() {
        let file = trace_file("Cycle=2\nRS1=free\n2");
        let store = TraceStore::load(file.path()).unwrap();
        let err = store.entries_for(1, 2).unwrap_err();
        assert_eq!(err.as_format(), Some(&FormatError::MissingMarker { cycle: 1 }));
    }

    #[test]
    fn test_store_reads_live() {
        let file = trace_file("Cycle=1\nRS1=busy\n1");
        let store = TraceStore::load(file.path()).unwrap();
        assert_eq!(store.total_cycles().unwrap(), 1);

        std::fs::write(file.path(), "Cycle=1\nRS1=busy\nCycle=2\nRS1=free\n2").unwrap();
        assert_eq!(store.total_cycles().unwrap(), 2);
        assert_eq!(store.entries_for(2, 2).unwrap(), vec![Entry::new("RS1", "free")]);
    }

    #[test]
    fn test_store_cache_sees_length_change() {
        let file = trace_file("Cycle=1\nRS1=busy\n1");
        let config = StoreConfig {
            cache_by_mtime: true,
        };
        let store = TraceStore::load_with_config(file.path(), config).unwrap();
        let first = store.read().unwrap();
        let second = store.read().unwrap();
        assert!(Arc::ptr_eq(&first, &second));

        std::fs::write(file.path(), "Cycle=1\nRS1=busy\nCycle=2\nRS1=free\n2").unwrap();
        assert_eq!(store.total_cycles().unwrap(), 2);
    }

    #[test]
    fn test_store_file_removed_after_load() {
        let file = trace_file("Cycle=1\nRS1=busy\n1");
        let path = file.path().to_path_buf();
        let store = TraceStore::load(&path).unwrap();
        drop(file);
        assert!(store.total_cycles().unwrap_err().is_io());
    }
}
