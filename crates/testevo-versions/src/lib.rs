//! Version sources feeding the evolution analysis.
//!
//! A provider turns some history representation into a sequence of
//! [`Snapshot`]s, oldest first. The snapshot interchange format is the
//! serialized node model: one JSON file per project, grouped per
//! version.

use std::path::PathBuf;

use testevo_model::Snapshot;
use thiserror::Error;

mod folder;
mod git;
mod memory;

pub use folder::FolderProvider;
pub use git::GitProvider;
pub use memory::MemoryProvider;

#[derive(Debug, Error)]
pub enum VersionError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse snapshot file {path}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("git error: {0}")]
    Git(String),
}

/// Sequential access to the versions under analysis.
///
/// `next_snapshot` hands out finalized snapshots oldest first and
/// `None` once the history is exhausted. `clean` releases whatever the
/// provider holds on disk; the driver calls it on every exit path.
pub trait VersionProvider {
    fn next_snapshot(&mut self) -> Result<Option<Snapshot>, VersionError>;

    /// Whether the matcher should disregard project identity for this
    /// source. Folder sources need it since renaming a snapshot
    /// directory must not unmatch every entity it holds.
    fn ignore_project_identity(&self) -> bool;

    fn clean(&mut self) -> Result<(), VersionError>;
}
