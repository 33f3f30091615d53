// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Raw commit block parsing
//!
//! A block is the text `git rev-list --parents --header` emits for one commit:
//!
//! ```text
//! <sha1> [<parent-sha1> ...]
//! tree <sha1>
//! parent <sha1>
//! author <name> <email> <epoch> <+HHMM>
//! committer <name> <email> <epoch> <+HHMM>
//!
//!     subject line
//!
//!     body...
//! ```
//!
//! Header lines this layer does not need (`encoding`, `gpgsig` and its
//! continuation lines, `mergetag`, ...) are skipped rather than rejected.

use std::collections::HashMap;

use tracing::trace;

use crate::commit::{CommitId, CommitRecord, Signature, local_time};
use crate::error::GitError;

/// One classified header line
#[derive(Debug, Clone, PartialEq, Eq)]
enum HeaderLine<'a> {
    Tree,
    Parent,
    Author(Signature),
    Committer(Signature),
    Other(&'a str),
}

/// Classify a header line by its leading keyword
fn classify_header(line: &str) -> HeaderLine<'_> {
    let (keyword, rest) = line.split_once(' ').unwrap_or((line, ""));
    match keyword {
        "tree" => HeaderLine::Tree,
        "parent" => HeaderLine::Parent,
        "author" => parse_ident(rest).map_or(HeaderLine::Other(line), HeaderLine::Author),
        "committer" => parse_ident(rest).map_or(HeaderLine::Other(line), HeaderLine::Committer),
        _ => HeaderLine::Other(line),
    }
}

/// Parse `<ident> <epoch> <±HHMM>` into a signature
///
/// The last `<digits> <±HHMM>` pair ends the identity and text after the
/// offset is ignored. An instant that cannot be represented, such as a
/// `+9999` offset, leaves `when` empty but keeps the name.
fn parse_ident(rest: &str) -> Option<Signature> {
    let tokens: Vec<&str> = rest.split(' ').collect();
    let at = (1..tokens.len().saturating_sub(1))
        .rev()
        .find(|&i| is_epoch(tokens[i]) && is_offset(tokens[i + 1]))?;
    let when = tokens[at]
        .parse()
        .ok()
        .and_then(|epoch| local_time(epoch, &tokens[at + 1][..5]));
    let (name, email) = split_ident(&tokens[..at].join(" "));
    Some(Signature { name, email, when })
}

fn is_epoch(token: &str) -> bool {
    !token.is_empty() && token.bytes().all(|b| b.is_ascii_digit())
}

/// `+HHMM` or `-HHMM`, possibly followed by more text
fn is_offset(token: &str) -> bool {
    let bytes = token.as_bytes();
    bytes.len() >= 5
        && matches!(bytes[0], b'+' | b'-')
        && bytes[1..5].iter().all(u8::is_ascii_digit)
}

/// Split `Name <email>` into its parts; identities without an email keep
/// the whole text as the name
fn split_ident(ident: &str) -> (String, Option<String>) {
    if let Some(stripped) = ident.strip_suffix('>') {
        if let Some((name, email)) = stripped.rsplit_once('<') {
            return (name.trim_end().to_string(), Some(email.to_string()));
        }
    }
    (ident.to_string(), None)
}

/// Parse one raw commit block into a [`CommitRecord`]
///
/// Leading blank lines are tolerated. The first line supplies the commit id
/// and the parent ids; malformed or unknown header lines are ignored.
///
/// # Errors
///
/// Returns `GitError::MalformedBlock` if the block holds no commit id.
pub fn parse_commit_block(block: &str) -> Result<CommitRecord, GitError> {
    let mut lines = block.lines().skip_while(|line| line.trim().is_empty());

    let first = lines.next().ok_or_else(|| GitError::MalformedBlock {
        reason: "block contains no commit line".to_string(),
    })?;
    let mut ids = first.split_whitespace().map(CommitId::from);
    let id = ids.next().ok_or_else(|| GitError::MalformedBlock {
        reason: "commit line is empty".to_string(),
    })?;
    let mut record = CommitRecord::new(id, ids.collect());

    let mut in_headers = true;
    for line in lines {
        if in_headers {
            if line.is_empty() {
                in_headers = false;
                continue;
            }
            match classify_header(line) {
                HeaderLine::Tree | HeaderLine::Parent => {}
                HeaderLine::Author(sig) => record.author = Some(sig),
                HeaderLine::Committer(sig) => record.committer = Some(sig),
                HeaderLine::Other(skipped) => {
                    trace!(commit = %record.id, line = skipped, "Skipping header line");
                }
            }
        } else if record.subject.is_empty() && line.starts_with(' ') {
            record.subject = line.trim().to_string();
        }
    }

    Ok(record)
}

/// Key of the children index
///
/// Parentless commits are filed under the explicit [`ParentKey::Root`] marker.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ParentKey {
    /// Stands in for the missing parent of root commits
    Root,
    /// A real parent commit
    Commit(CommitId),
}

/// Reverse parent → children index accumulated while parsing
///
/// Auxiliary only: layout never consults it.
#[derive(Debug, Clone, Default)]
pub struct ChildrenIndex {
    children: HashMap<ParentKey, Vec<CommitId>>,
}

impl ChildrenIndex {
    /// Create an empty index
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// File a commit under each of its parents (or under the root marker)
    pub fn record(&mut self, commit: &CommitRecord) {
        if commit.is_root() {
            self.children
                .entry(ParentKey::Root)
                .or_default()
                .push(commit.id.clone());
            return;
        }
        for parent in &commit.parents {
            self.children
                .entry(ParentKey::Commit(parent.clone()))
                .or_default()
                .push(commit.id.clone());
        }
    }

    /// Children recorded so far for a key, in stream order
    #[must_use]
    pub fn get(&self, key: &ParentKey) -> &[CommitId] {
        self.children.get(key).map_or(&[], Vec::as_slice)
    }

    /// Children recorded so far for a parent commit
    #[must_use]
    pub fn children_of(&self, parent: &CommitId) -> &[CommitId] {
        self.get(&ParentKey::Commit(parent.clone()))
    }

    /// Root commits seen so far
    #[must_use]
    pub fn roots(&self) -> &[CommitId] {
        self.get(&ParentKey::Root)
    }

    /// Number of distinct keys
    #[must_use]
    pub fn len(&self) -> usize {
        self.children.len()
    }

    /// Whether nothing has been recorded
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}
