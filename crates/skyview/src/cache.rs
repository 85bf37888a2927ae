use std::sync::{Mutex, MutexGuard, PoisonError};

use indexmap::IndexMap;
use tracing::debug;

use crate::{
    dataset::{Error, Table},
    export::{ExportArtifact, export_csv},
};

pub const DEFAULT_MAX_ENTRIES: usize = 8;

/// Memoizes [`export_csv`] by table content.
///
/// Holds at most `max_entries` artifacts and evicts the oldest first. With
/// `max_entries == 0` every call re-encodes.
#[derive(Debug)]
pub struct ExportCache {
    max_entries: usize,
    entries: Mutex<IndexMap<u64, ExportArtifact>>,
}

impl ExportCache {
    #[must_use]
    pub fn new(max_entries: usize) -> Self {
        Self {
            max_entries,
            entries: Mutex::new(IndexMap::new()),
        }
    }

    pub fn get_or_export(&self, table: &Table) -> Result<ExportArtifact, Error> {
        if self.max_entries == 0 {
            return export_csv(table);
        }
        let key = table.fingerprint();
        if let Some(artifact) = self.lock().get(&key) {
            debug!(key, "Export cache hit");
            return Ok(artifact.clone());
        }
        debug!(key, "Export cache miss");
        let artifact = export_csv(table)?;
        let mut entries = self.lock();
        while entries.len() >= self.max_entries {
            entries.shift_remove_index(0);
        }
        entries.insert(key, artifact.clone());
        Ok(artifact)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> MutexGuard<'_, IndexMap<u64, ExportArtifact>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for ExportCache {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ENTRIES)
    }
}
