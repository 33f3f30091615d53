// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! gitty-git: commit records and references for gitty
//!
//! This library crate turns the raw output of `git rev-list --header` into
//! [`CommitRecord`]s, groups symbolic references per commit, and hosts the
//! providers that talk to git.
//!
//! # Example
//!
//! ```no_run
//! use gitty_git::{BlockReader, GitCli, HistorySource, ReferenceSet, parse_commit_block};
//!
//! let git = GitCli::new(".");
//! let refs = ReferenceSet::resolve(&git);
//!
//! for block in git.history().expect("start git") {
//!     let record = parse_commit_block(&block.expect("read block")).expect("parse");
//!     println!("{} {:?} {}", record.short_id(), refs.get(record.id.as_str()), record.subject);
//! }
//! ```

#![warn(missing_docs)]

pub mod commit;
pub mod error;
pub mod parser;
pub mod refs;
pub mod repo;
pub mod source;

pub use commit::{CommitId, CommitRecord, Parents, Signature};
pub use error::GitError;
pub use parser::{ChildrenIndex, ParentKey, parse_commit_block};
pub use refs::{RefKind, Reference, ReferenceSet};
pub use repo::{CommitDetail, GitRepo};
pub use source::{BlockReader, DetailSource, GitCli, HistoryBlocks, HistorySource, ReferenceSource};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::commit::{CommitId, CommitRecord, Parents, Signature};
    pub use crate::error::GitError;
    pub use crate::parser::parse_commit_block;
    pub use crate::refs::{Reference, ReferenceSet};
    pub use crate::source::{DetailSource, HistorySource, ReferenceSource};
}
