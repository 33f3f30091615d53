// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Symbolic reference resolution
//!
//! Groups `(commit, ref path)` pairs into a per-commit list of decorations.
//! Ref paths are relative to `refs/` (`heads/main`, `remotes/origin/main`,
//! `tags/v1.0`, `stash`).

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::commit::CommitId;
use crate::source::ReferenceSource;

/// Suffix git appends to the peeled entry of an annotated tag
const PEELED_SUFFIX: &str = "^{}";

/// Category of a reference, taken from the first path segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefKind {
    /// `heads/...`
    LocalBranch,
    /// `remotes/<remote>/...`
    RemoteBranch,
    /// `tags/...`
    Tag,
    /// `stash`
    Stash,
    /// Anything else, passed through verbatim
    Other,
}

impl RefKind {
    /// Classify a ref path (without the leading `refs/`)
    #[must_use]
    pub fn classify(path: &str) -> Self {
        match path.split('/').next() {
            Some("heads") => Self::LocalBranch,
            Some("remotes") => Self::RemoteBranch,
            Some("tags") => Self::Tag,
            Some("stash") => Self::Stash,
            _ => Self::Other,
        }
    }
}

/// A symbolic name pointing at a commit
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Reference {
    /// Path below `refs/`, e.g. `heads/main`
    pub path: String,
    /// Category derived from the path
    pub kind: RefKind,
}

impl Reference {
    /// Build a reference from its path, stripping a leading `refs/` if present
    #[must_use]
    pub fn new(path: &str) -> Self {
        let path = path.strip_prefix("refs/").unwrap_or(path);
        Self {
            path: path.to_string(),
            kind: RefKind::classify(path),
        }
    }

    /// The name without its category prefix (`heads/main` → `main`)
    #[must_use]
    pub fn short_name(&self) -> &str {
        let prefix = match self.kind {
            RefKind::LocalBranch => "heads/",
            RefKind::RemoteBranch => "remotes/",
            RefKind::Tag => "tags/",
            RefKind::Stash | RefKind::Other => "",
        };
        self.path.strip_prefix(prefix).unwrap_or(&self.path)
    }
}

/// Mapping from commit id to the references pointing at it
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReferenceSet {
    by_commit: HashMap<CommitId, Vec<Reference>>,
}

impl ReferenceSet {
    /// Create an empty set
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Group pairs by commit, preserving the order in which they were received
    ///
    /// Peeled annotated-tag entries (`tags/v1^{}`) decorate the commit the tag
    /// points at, under the bare tag name.
    #[must_use]
    pub fn from_pairs<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (CommitId, S)>,
        S: AsRef<str>,
    {
        let mut set = Self::new();
        for (commit, path) in pairs {
            set.insert(commit, path.as_ref());
        }
        set
    }

    /// Query a reference provider and group its answer
    ///
    /// A failing provider degrades to an empty set: decorations are optional
    /// and must never stop a traversal.
    #[must_use]
    pub fn resolve<S: ReferenceSource + ?Sized>(source: &S) -> Self {
        match source.reference_pairs() {
            Ok(pairs) => {
                let set = Self::from_pairs(pairs);
                debug!(decorated = set.len(), "Resolved references");
                set
            }
            Err(err) => {
                warn!(error = %err, "Reference listing failed, continuing without decorations");
                Self::new()
            }
        }
    }

    /// Parse a ref listing with one `<sha1><whitespace>refs/<path>` entry per line
    ///
    /// Accepts both `git ls-remote` (tab separated) and `git show-ref` (space
    /// separated) output. Lines that do not match are skipped.
    #[must_use]
    pub fn parse_listing(listing: &str) -> Self {
        Self::from_pairs(listing.lines().filter_map(parse_listing_line))
    }

    /// Add one reference for a commit
    ///
    /// A trailing `^{}` is stripped, so a peeled tag entry files the tag name
    /// under the tagged commit. Returns `false` if the commit already carried
    /// that name.
    pub fn insert(&mut self, commit: CommitId, path: &str) -> bool {
        let reference = Reference::new(path.strip_suffix(PEELED_SUFFIX).unwrap_or(path));
        let references = self.by_commit.entry(commit).or_default();
        if references.contains(&reference) {
            return false;
        }
        references.push(reference);
        true
    }

    /// References pointing at a commit, in listing order
    #[must_use]
    pub fn get(&self, commit: &str) -> &[Reference] {
        self.by_commit.get(commit).map_or(&[], Vec::as_slice)
    }

    /// Number of decorated commits
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_commit.len()
    }

    /// Whether no commit is decorated
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_commit.is_empty()
    }
}

pub(crate) fn parse_listing_line(line: &str) -> Option<(CommitId, &str)> {
    let (sha, path) = line.trim_end().split_once(|c: char| c == '\t' || c == ' ')?;
    if !CommitId::is_valid_sha(sha) {
        return None;
    }
    let path = path.trim_start().strip_prefix("refs/")?;
    Some((CommitId::from(sha), path))
}
