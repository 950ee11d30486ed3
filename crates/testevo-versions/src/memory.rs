use std::collections::VecDeque;

use testevo_model::Snapshot;

use crate::{VersionError, VersionProvider};

/// In-memory version sequence for tests and embedding.
pub struct MemoryProvider {
    pending: VecDeque<Snapshot>,
    cleaned: bool,
}

impl MemoryProvider {
    /// Snapshots are handed out in the given order; they are finalized
    /// here so callers can pass plain trees.
    pub fn new(snapshots: Vec<Snapshot>) -> Self {
        let mut pending: VecDeque<Snapshot> = snapshots.into();
        for snapshot in &mut pending {
            snapshot.finalize();
        }
        Self {
            pending,
            cleaned: false,
        }
    }

    pub fn is_cleaned(&self) -> bool {
        self.cleaned
    }
}

impl VersionProvider for MemoryProvider {
    fn next_snapshot(&mut self) -> Result<Option<Snapshot>, VersionError> {
        Ok(self.pending.pop_front())
    }

    fn ignore_project_identity(&self) -> bool {
        true
    }

    fn clean(&mut self) -> Result<(), VersionError> {
        self.pending.clear();
        self.cleaned = true;
        Ok(())
    }
}
