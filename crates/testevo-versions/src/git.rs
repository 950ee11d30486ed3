use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::process::Command;

use testevo_config::GitConfig;
use testevo_model::{Project, Snapshot};
use tracing::info;

use crate::{VersionError, VersionProvider};

struct CommitEntry {
    hash: String,
    timestamp: i64,
}

/// Versions taken from the commit history of a git repository, oldest
/// first. Commit enumeration goes through gix; per-commit file content
/// is read with a `git` subprocess so no working tree checkout is ever
/// needed.
pub struct GitProvider {
    repository: PathBuf,
    suite_dir: Option<String>,
    pending: VecDeque<CommitEntry>,
}

impl GitProvider {
    pub fn new(config: &GitConfig) -> Result<Self, VersionError> {
        let repo = gix::discover(&config.repository)
            .map_err(|err| VersionError::Git(format!("failed to open repository: {err}")))?;
        let head_id = repo
            .head_id()
            .map_err(|err| VersionError::Git(format!("failed to resolve HEAD: {err}")))?
            .detach();

        let walk = repo
            .rev_walk([head_id])
            .sorting(gix::revision::walk::Sorting::ByCommitTime(
                gix::traverse::commit::simple::CommitTimeOrder::NewestFirst,
            ))
            .all()
            .map_err(|err| VersionError::Git(format!("failed to start revision walk: {err}")))?;

        let mut commits = Vec::new();
        for entry in walk {
            let entry = entry
                .map_err(|err| VersionError::Git(format!("revision walk entry failed: {err}")))?;
            let hash = entry.id.to_string().to_ascii_lowercase();

            let commit = repo
                .find_commit(entry.id)
                .map_err(|err| VersionError::Git(format!("failed to read commit {hash}: {err}")))?;
            let timestamp = commit.time().map(|time| time.seconds).unwrap_or(0);

            if config.start_date.is_some_and(|start| timestamp < start) {
                // NewestFirst order, everything below is older still
                break;
            }
            if config.end_date.is_some_and(|end| timestamp > end) {
                continue;
            }
            if config
                .ignore_commits
                .iter()
                .any(|ignored| hash.starts_with(&ignored.to_ascii_lowercase()))
            {
                continue;
            }

            commits.push(CommitEntry { hash, timestamp });
            if config
                .max_commits
                .is_some_and(|limit| commits.len() >= limit)
            {
                break;
            }
        }
        commits.reverse();

        info!(commits = commits.len(), "git source opened");
        Ok(Self {
            repository: config.repository.clone(),
            suite_dir: config.suite_dir.clone(),
            pending: commits.into(),
        })
    }

    fn list_snapshot_files(&self, hash: &str) -> Result<Vec<String>, VersionError> {
        let mut command = Command::new("git");
        command
            .arg("-C")
            .arg(&self.repository)
            .args(["ls-tree", "-r", "--name-only", hash]);
        if let Some(suite_dir) = &self.suite_dir {
            command.arg("--").arg(suite_dir);
        }
        let output = command.output()?;
        if !output.status.success() {
            return Err(VersionError::Git(format!(
                "git ls-tree failed for commit {hash}: status {}",
                output.status
            )));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let mut files: Vec<String> = stdout
            .lines()
            .map(str::trim)
            .filter(|line| Path::new(line).extension().is_some_and(|ext| ext == "json"))
            .map(str::to_owned)
            .collect();
        files.sort();
        Ok(files)
    }

    fn read_project(&self, hash: &str, path: &str) -> Result<Project, VersionError> {
        let output = Command::new("git")
            .arg("-C")
            .arg(&self.repository)
            .args(["show", &format!("{hash}:{path}")])
            .output()?;
        if !output.status.success() {
            return Err(VersionError::Git(format!(
                "git show failed for {hash}:{path}: status {}",
                output.status
            )));
        }

        serde_json::from_slice(&output.stdout).map_err(|source| VersionError::Json {
            path: PathBuf::from(path),
            source,
        })
    }
}

impl VersionProvider for GitProvider {
    fn next_snapshot(&mut self) -> Result<Option<Snapshot>, VersionError> {
        let Some(commit) = self.pending.pop_front() else {
            return Ok(None);
        };

        let mut snapshot = Snapshot::new(commit.hash.clone(), Some(commit.timestamp));
        for path in self.list_snapshot_files(&commit.hash)? {
            snapshot.projects.push(self.read_project(&commit.hash, &path)?);
        }

        snapshot.finalize();
        Ok(Some(snapshot))
    }

    fn ignore_project_identity(&self) -> bool {
        false
    }

    fn clean(&mut self) -> Result<(), VersionError> {
        self.pending.clear();
        Ok(())
    }
}
