// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Error types for gitty-graph

use gitty_git::GitError;
use thiserror::Error;

/// Errors that can occur while producing graph rows
#[derive(Debug, Error)]
pub enum GraphError {
    /// The history or reference provider failed
    #[error("Git error: {0}")]
    Git(#[from] GitError),

    /// A row could not be serialized
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}
