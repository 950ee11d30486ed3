use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};

use testevo_model::{Project, Snapshot};
use tracing::info;
use walkdir::WalkDir;

use crate::{VersionError, VersionProvider};

/// Versions laid out as subdirectories of a root, ordered by directory
/// name. Each subdirectory holds one JSON file per project.
pub struct FolderProvider {
    pending: VecDeque<PathBuf>,
}

impl FolderProvider {
    pub fn new(root: impl AsRef<Path>) -> Result<Self, VersionError> {
        let mut versions = Vec::new();
        for entry in fs::read_dir(root.as_ref())? {
            let entry = entry?;
            if entry.file_type()?.is_dir() {
                versions.push(entry.path());
            }
        }
        versions.sort();

        info!(versions = versions.len(), "folder source opened");
        Ok(Self {
            pending: versions.into(),
        })
    }
}

impl VersionProvider for FolderProvider {
    fn next_snapshot(&mut self) -> Result<Option<Snapshot>, VersionError> {
        let Some(version_dir) = self.pending.pop_front() else {
            return Ok(None);
        };

        let version_id = version_dir
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let mut snapshot = Snapshot::new(version_id, None);

        let mut files = Vec::new();
        for entry in WalkDir::new(&version_dir) {
            let entry = entry.map_err(|err| VersionError::Io(err.into()))?;
            if entry.file_type().is_file()
                && entry.path().extension().is_some_and(|ext| ext == "json")
            {
                files.push(entry.into_path());
            }
        }
        files.sort();

        for path in files {
            snapshot.projects.push(read_project(&path)?);
        }

        snapshot.finalize();
        Ok(Some(snapshot))
    }

    fn ignore_project_identity(&self) -> bool {
        true
    }

    fn clean(&mut self) -> Result<(), VersionError> {
        self.pending.clear();
        Ok(())
    }
}

fn read_project(path: &Path) -> Result<Project, VersionError> {
    let raw = fs::read_to_string(path)?;
    serde_json::from_str(&raw).map_err(|source| VersionError::Json {
        path: path.to_owned(),
        source,
    })
}
