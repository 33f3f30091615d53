//! Commit record types

use std::borrow::Borrow;
use std::fmt;

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// Wall-clock rendering used for author and committer dates
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Opaque commit identifier (normally 40 hex characters)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommitId(String);

impl CommitId {
    /// Wrap an identifier string without validating it
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Validate that a SHA is a valid 40-character hex string
    #[must_use]
    pub fn is_valid_sha(sha: &str) -> bool {
        sha.len() == 40 && sha.chars().all(|c| c.is_ascii_hexdigit())
    }

    /// Get the short form (first 7 characters)
    #[must_use]
    pub fn short(&self) -> &str {
        let end = self
            .0
            .char_indices()
            .nth(7)
            .map_or(self.0.len(), |(idx, _)| idx);
        &self.0[..end]
    }

    /// Borrow the identifier as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CommitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for CommitId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for CommitId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for CommitId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for CommitId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Parent linkage of a commit
///
/// Parentless commits carry the explicit [`Parents::Root`] marker instead of
/// an empty list, so consumers can match on the distinction directly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<CommitId>", into = "Vec<CommitId>")]
pub enum Parents {
    /// The commit has no parents
    Root,
    /// Parent ids in recorded order; the first entry is the first parent
    Linked(Vec<CommitId>),
}

impl Parents {
    /// The first parent, if any
    #[must_use]
    pub fn first(&self) -> Option<&CommitId> {
        self.as_slice().first()
    }

    /// All parents as a slice (empty for roots)
    #[must_use]
    pub fn as_slice(&self) -> &[CommitId] {
        match self {
            Self::Root => &[],
            Self::Linked(ids) => ids,
        }
    }

    /// Iterate over the parents in order
    pub fn iter(&self) -> std::slice::Iter<'_, CommitId> {
        self.as_slice().iter()
    }

    /// Number of parents
    #[must_use]
    pub fn count(&self) -> usize {
        self.as_slice().len()
    }

    /// Check if this is the root marker
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.as_slice().is_empty()
    }
}

impl From<Vec<CommitId>> for Parents {
    fn from(ids: Vec<CommitId>) -> Self {
        if ids.is_empty() {
            Self::Root
        } else {
            Self::Linked(ids)
        }
    }
}

impl From<Parents> for Vec<CommitId> {
    fn from(parents: Parents) -> Self {
        match parents {
            Parents::Root => Vec::new(),
            Parents::Linked(ids) => ids,
        }
    }
}

impl<'a> IntoIterator for &'a Parents {
    type Item = &'a CommitId;
    type IntoIter = std::slice::Iter<'a, CommitId>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Compute the local wall-clock instant for an epoch and a `±HHMM` offset
///
/// Returns `None` when the offset is not of the form `+HHMM`/`-HHMM` or the
/// result is out of range.
#[must_use]
pub fn local_time(epoch: i64, offset: &str) -> Option<DateTime<FixedOffset>> {
    let offset = parse_offset(offset)?;
    let utc = DateTime::from_timestamp(epoch, 0)?;
    Some(utc.with_timezone(&offset))
}

fn parse_offset(offset: &str) -> Option<FixedOffset> {
    let bytes = offset.as_bytes();
    if bytes.len() != 5 || !bytes[1..].iter().all(u8::is_ascii_digit) {
        return None;
    }
    let hours: i32 = offset[1..3].parse().ok()?;
    let minutes: i32 = offset[3..5].parse().ok()?;
    let seconds = hours * 3600 + minutes * 60;
    match bytes[0] {
        b'+' => FixedOffset::east_opt(seconds),
        b'-' => FixedOffset::west_opt(seconds),
        _ => None,
    }
}

/// An author or committer identity with its timezone-adjusted instant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature {
    /// Display name
    pub name: String,
    /// Email address, when the identity carried one
    pub email: Option<String>,
    /// Instant in the signer's own timezone, unless it was unrepresentable
    pub when: Option<DateTime<FixedOffset>>,
}

impl Signature {
    /// Render the instant as `YYYY-MM-DD HH:MM:SS` in the signer's timezone,
    /// or an empty string when the instant is unknown
    #[must_use]
    pub fn timestamp(&self) -> String {
        self.when
            .map(|when| when.format(TIMESTAMP_FORMAT).to_string())
            .unwrap_or_default()
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.email {
            Some(email) => write!(f, "{} <{}>", self.name, email),
            None => f.write_str(&self.name),
        }
    }
}

/// A commit parsed from one raw history block
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitRecord {
    /// The commit identifier
    pub id: CommitId,
    /// Parent commits, first parent first
    pub parents: Parents,
    /// Author identity and date
    pub author: Option<Signature>,
    /// Committer identity and date
    pub committer: Option<Signature>,
    /// First non-empty line of the message
    pub subject: String,
}

impl CommitRecord {
    /// Create a record with no signatures and an empty subject
    #[must_use]
    pub fn new(id: impl Into<CommitId>, parents: Vec<CommitId>) -> Self {
        Self {
            id: id.into(),
            parents: parents.into(),
            author: None,
            committer: None,
            subject: String::new(),
        }
    }

    /// Get the short SHA (first 7 characters)
    #[must_use]
    pub fn short_id(&self) -> &str {
        self.id.short()
    }

    /// Check if this is a merge commit (has multiple parents)
    #[must_use]
    pub fn is_merge(&self) -> bool {
        self.parents.count() > 1
    }

    /// Check if this is a root commit (has no parents)
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.parents.is_root()
    }

    /// Author name, or an empty string when no author line was parsed
    #[must_use]
    pub fn author_name(&self) -> &str {
        self.author.as_ref().map_or("", |sig| sig.name.as_str())
    }

    /// Rendered author date, or an empty string when unknown
    #[must_use]
    pub fn author_date(&self) -> String {
        self.author
            .as_ref()
            .map(Signature::timestamp)
            .unwrap_or_default()
    }
}


#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    /// Strategy to generate valid 40-character hex SHA strings
    fn sha_strategy() -> impl Strategy<Value = String> {
        proptest::string::string_regex("[0-9a-f]{40}").expect("valid regex")
    }

    proptest! {
        /// Property: is_root is true iff there are no parents
        #[test]
        fn prop_is_root_iff_no_parents(parents in proptest::collection::vec(sha_strategy(), 0..4)) {
            let parents: Parents = parents.into_iter().map(CommitId::from).collect::<Vec<_>>().into();
            prop_assert_eq!(parents.is_root(), parents.count() == 0);
        }

        /// Property: short ids are prefixes of the full id
        #[test]
        fn prop_short_is_prefix(sha in sha_strategy()) {
            let id = CommitId::from(sha.clone());
            prop_assert!(sha.starts_with(id.short()));
            prop_assert_eq!(id.short().len(), 7);
        }

        /// Property: the offset shifts the wall clock by exactly its value
        #[test]
        fn prop_offset_shifts_wall_clock(
            epoch in 0i64..4_000_000_000i64,
            sign in prop_oneof![Just('+'), Just('-')],
            hours in 0i32..14,
            minutes in 0i32..60,
        ) {
            let offset = format!("{sign}{hours:02}{minutes:02}");
            let local = local_time(epoch, &offset).expect("valid offset");
            let utc = local_time(epoch, "+0000").expect("valid offset");
            let expected = i64::from(hours * 3600 + minutes * 60) * if sign == '+' { 1 } else { -1 };
            prop_assert_eq!((local.naive_local() - utc.naive_local()).num_seconds(), expected);
        }
    }
}
