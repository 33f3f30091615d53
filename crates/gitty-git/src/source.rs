// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! History and reference providers
//!
//! The layout engine never talks to git directly. Commit blocks and ref
//! listings come through the traits in this module; [`GitCli`] implements
//! them by running the `git` command-line tool.

use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdout, Command, Stdio};

use tracing::{debug, warn};

use crate::commit::CommitId;
use crate::error::GitError;
use crate::refs::parse_listing_line;
use crate::repo::CommitDetail;

/// Arguments producing NUL-framed, children-first commit blocks for every ref
pub const REV_LIST_ARGS: &[&str] = &["rev-list", "--parents", "--all", "--header", "--topo-order"];

/// Arguments listing every ref, including peeled tag entries
pub const SHOW_REF_ARGS: &[&str] = &["show-ref", "--dereference"];

/// Produces raw commit blocks in children-first order
pub trait HistorySource {
    /// Iterator over raw blocks; ends when the history is exhausted
    type Blocks: Iterator<Item = Result<String, GitError>>;

    /// Start a fresh pass over the history
    ///
    /// # Errors
    ///
    /// Returns `GitError` if the underlying provider cannot be started.
    fn history(&self) -> Result<Self::Blocks, GitError>;
}

/// Produces `(commit, ref path)` pairs
pub trait ReferenceSource {
    /// List every reference with the commit it points at
    ///
    /// # Errors
    ///
    /// Returns `GitError` if the listing cannot be produced.
    fn reference_pairs(&self) -> Result<Vec<(CommitId, String)>, GitError>;
}

/// Produces the full detail of a single commit on demand
pub trait DetailSource {
    /// Fetch message, headers and the diff against `parent`
    /// (the first parent when `None`)
    ///
    /// # Errors
    ///
    /// Returns `GitError` if the commit or parent cannot be found.
    fn commit_detail(
        &self,
        commit: &str,
        parent: Option<&str>,
    ) -> Result<CommitDetail, GitError>;
}

/// Splits a reader into NUL-terminated commit blocks
///
/// Empty frames are skipped. After a read error the error is yielded once
/// and the iterator ends.
pub struct BlockReader<R> {
    frames: io::Split<R>,
    failed: bool,
}

impl<R: BufRead> BlockReader<R> {
    /// Wrap a buffered reader
    #[must_use]
    pub fn new(reader: R) -> Self {
        Self {
            frames: reader.split(b'\0'),
            failed: false,
        }
    }
}

impl<R: BufRead> Iterator for BlockReader<R> {
    type Item = Result<String, GitError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        loop {
            match self.frames.next()? {
                Ok(bytes) => {
                    let text = String::from_utf8_lossy(&bytes);
                    if text.trim().is_empty() {
                        continue;
                    }
                    return Some(Ok(text.into_owned()));
                }
                Err(err) => {
                    self.failed = true;
                    return Some(Err(err.into()));
                }
            }
        }
    }
}

/// Providers backed by the `git` executable
#[derive(Debug, Clone)]
pub struct GitCli {
    repo_dir: PathBuf,
    program: PathBuf,
}

impl GitCli {
    /// Run `git` inside `repo_dir`
    #[must_use]
    pub fn new(repo_dir: impl Into<PathBuf>) -> Self {
        Self {
            repo_dir: repo_dir.into(),
            program: PathBuf::from("git"),
        }
    }

    /// Use a different git executable
    #[must_use]
    pub fn with_program(mut self, program: impl Into<PathBuf>) -> Self {
        self.program = program.into();
        self
    }

    /// Directory the commands run in
    #[must_use]
    pub fn repo_dir(&self) -> &Path {
        &self.repo_dir
    }

    fn command(&self, args: &[&str]) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.current_dir(&self.repo_dir)
            .args(args)
            .stdin(Stdio::null());
        cmd
    }
}

impl HistorySource for GitCli {
    type Blocks = HistoryBlocks;

    fn history(&self) -> Result<HistoryBlocks, GitError> {
        let mut child = self
            .command(REV_LIST_ARGS)
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| GitError::Io(io::Error::other("git stdout was not captured")))?;

        debug!(repo = %self.repo_dir.display(), pid = child.id(), "Started history stream");
        Ok(HistoryBlocks {
            blocks: BlockReader::new(BufReader::new(stdout)),
            child,
            finished: false,
        })
    }
}

impl ReferenceSource for GitCli {
    fn reference_pairs(&self) -> Result<Vec<(CommitId, String)>, GitError> {
        let output = self.command(SHOW_REF_ARGS).output()?;

        if !output.status.success() {
            // show-ref exits 1 without output when the repository has no refs
            if output.status.code() == Some(1) && output.stdout.is_empty() {
                return Ok(Vec::new());
            }
            return Err(GitError::CommandFailed {
                command: format!("git {}", SHOW_REF_ARGS.join(" ")),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let listing = String::from_utf8_lossy(&output.stdout);
        Ok(listing
            .lines()
            .filter_map(parse_listing_line)
            .map(|(commit, path)| (commit, path.to_string()))
            .collect())
    }
}

/// Commit blocks streamed from a running `git rev-list`
///
/// Dropping the stream before it is exhausted kills and reaps the process.
pub struct HistoryBlocks {
    blocks: BlockReader<BufReader<ChildStdout>>,
    child: Child,
    finished: bool,
}

impl HistoryBlocks {
    fn finish(&mut self) {
        if self.finished {
            return;
        }
        self.finished = true;
        match self.child.wait() {
            Ok(status) if status.success() => debug!("History stream completed"),
            Ok(status) => warn!(%status, "git rev-list exited unsuccessfully"),
            Err(err) => warn!(error = %err, "Failed to reap git rev-list"),
        }
    }
}

impl Iterator for HistoryBlocks {
    type Item = Result<String, GitError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        let block = self.blocks.next();
        if block.is_none() {
            self.finish();
        }
        block
    }
}

impl Drop for HistoryBlocks {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        self.finished = true;
        // Already-exited children make kill() fail; reaping still matters.
        let _ = self.child.kill();
        let _ = self.child.wait();
        debug!(pid = self.child.id(), "History stream abandoned");
    }
}
