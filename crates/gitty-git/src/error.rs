// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Error types for gitty-git

use thiserror::Error;

/// Errors that can occur while reading history from git
#[derive(Debug, Error)]
pub enum GitError {
    /// Error from git2 library
    #[error("Git error: {0}")]
    Git2(#[from] git2::Error),

    /// Repository not found at the specified path
    #[error("Repository not found: {path}")]
    RepositoryNotFound {
        /// The path that was searched for a repository
        path: String,
    },

    /// Invalid commit reference (branch, tag, or SHA)
    #[error("Invalid commit reference: {reference}")]
    InvalidReference {
        /// The reference string that could not be resolved
        reference: String,
    },

    /// Error spawning git or reading its output
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A git subprocess exited unsuccessfully
    #[error("`{command}` failed ({status}): {stderr}")]
    CommandFailed {
        /// The command line that was run
        command: String,
        /// Exit status as reported by the OS
        status: String,
        /// Captured standard error
        stderr: String,
    },

    /// A raw commit block could not be turned into a commit record
    #[error("Malformed commit block: {reason}")]
    MalformedBlock {
        /// Why the block was rejected
        reason: String,
    },
}
