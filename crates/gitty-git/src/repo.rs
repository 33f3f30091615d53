// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Repository access through `git2`
//!
//! Used for repository discovery and for the on-demand detail of a single
//! selected commit. Bulk history never goes through here.

use std::path::Path;

use chrono::DateTime;
use git2::{DiffFormat, DiffOptions, Repository};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::commit::{CommitId, Signature};
use crate::error::GitError;
use crate::source::DetailSource;

/// Full detail of one commit, fetched on demand
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitDetail {
    /// The commit identifier
    pub id: CommitId,
    /// Tree the commit records
    pub tree: String,
    /// Parent commits, first parent first
    pub parents: Vec<CommitId>,
    /// Author identity and date
    pub author: Signature,
    /// Committer identity and date
    pub committer: Signature,
    /// Complete commit message
    pub message: String,
    /// Unified diff against the selected parent
    pub diff: String,
}

impl CommitDetail {
    /// First line of the message
    #[must_use]
    pub fn subject(&self) -> &str {
        self.message.lines().next().unwrap_or("")
    }
}

/// A git repository opened through libgit2
pub struct GitRepo {
    repo: Repository,
}

impl GitRepo {
    /// Open a git repository at the given path
    ///
    /// # Errors
    ///
    /// Returns `GitError::RepositoryNotFound` if the path is not a git repository.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, GitError> {
        let path = path.as_ref();
        let repo = Repository::open(path).map_err(|_| GitError::RepositoryNotFound {
            path: path.display().to_string(),
        })?;
        Ok(Self { repo })
    }

    /// Discover and open a git repository containing the given path
    ///
    /// This walks up the directory tree to find a `.git` directory.
    ///
    /// # Errors
    ///
    /// Returns `GitError::RepositoryNotFound` if no repository is found.
    pub fn discover(path: impl AsRef<Path>) -> Result<Self, GitError> {
        let path = path.as_ref();
        let repo = Repository::discover(path).map_err(|_| GitError::RepositoryNotFound {
            path: path.display().to_string(),
        })?;
        Ok(Self { repo })
    }

    /// Get the repository (`.git`) path
    #[must_use]
    pub fn path(&self) -> &Path {
        self.repo.path()
    }

    /// Get the working directory path (None for bare repos)
    #[must_use]
    pub fn workdir(&self) -> Option<&Path> {
        self.repo.workdir()
    }

    /// Directory git commands should run in: the work tree, or the git dir
    /// for bare repositories
    #[must_use]
    pub fn command_dir(&self) -> &Path {
        self.workdir().unwrap_or_else(|| self.path())
    }

    /// Resolve a revision (SHA, branch, tag, `HEAD~2`, ...) to a commit id
    ///
    /// # Errors
    ///
    /// Returns `GitError::InvalidReference` if the revision cannot be resolved.
    pub fn resolve(&self, reference: &str) -> Result<CommitId, GitError> {
        Ok(CommitId::from(self.find_commit(reference)?.id().to_string()))
    }

    fn find_commit(&self, reference: &str) -> Result<git2::Commit<'_>, GitError> {
        let invalid = || GitError::InvalidReference {
            reference: reference.to_string(),
        };
        self.repo
            .revparse_single(reference)
            .map_err(|_| invalid())?
            .peel_to_commit()
            .map_err(|_| invalid())
    }

    fn patch_text(
        &self,
        git_commit: &git2::Commit<'_>,
        parent: Option<&str>,
    ) -> Result<String, GitError> {
        let tree = git_commit.tree()?;

        // Explicit parent, else first parent, else the empty tree for roots
        let parent_tree = match parent {
            Some(reference) => Some(self.find_commit(reference)?.tree()?),
            None if git_commit.parent_count() > 0 => Some(git_commit.parent(0)?.tree()?),
            None => None,
        };

        let mut opts = DiffOptions::new();
        opts.ignore_whitespace(false);

        let diff =
            self.repo
                .diff_tree_to_tree(parent_tree.as_ref(), Some(&tree), Some(&mut opts))?;

        let mut patch = String::new();
        diff.print(DiffFormat::Patch, |_delta, _hunk, line| {
            if matches!(line.origin(), '+' | '-' | ' ') {
                patch.push(line.origin());
            }
            patch.push_str(&String::from_utf8_lossy(line.content()));
            true
        })?;
        Ok(patch)
    }
}

impl DetailSource for GitRepo {
    fn commit_detail(&self, commit: &str, parent: Option<&str>) -> Result<CommitDetail, GitError> {
        let git_commit = self.find_commit(commit)?;
        debug!(commit = %git_commit.id(), base = ?parent, "Fetching commit detail");

        Ok(CommitDetail {
            id: CommitId::from(git_commit.id().to_string()),
            tree: git_commit.tree_id().to_string(),
            parents: git_commit
                .parent_ids()
                .map(|id| CommitId::from(id.to_string()))
                .collect(),
            author: signature_from_git2(&git_commit.author()),
            committer: signature_from_git2(&git_commit.committer()),
            message: String::from_utf8_lossy(git_commit.message_bytes()).into_owned(),
            diff: self.patch_text(&git_commit, parent)?,
        })
    }
}

fn signature_from_git2(sig: &git2::Signature<'_>) -> Signature {
    let time = sig.when();
    let when = chrono::FixedOffset::east_opt(time.offset_minutes() * 60)
        .zip(DateTime::from_timestamp(time.seconds(), 0))
        .map(|(offset, utc)| utc.with_timezone(&offset));

    Signature {
        name: String::from_utf8_lossy(sig.name_bytes()).into_owned(),
        email: Some(String::from_utf8_lossy(sig.email_bytes()).into_owned())
            .filter(|email| !email.is_empty()),
        when,
    }
}
