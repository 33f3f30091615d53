// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Traversal orchestration
//!
//! [`CommitGraph`] ties a history provider, a reference provider and a fresh
//! [`LayoutEngine`] together. Each call to [`CommitGraph::traverse`] starts a
//! new pass; the returned [`Traversal`] yields rows lazily, so dropping it
//! early stops the history provider without reading the rest.

use gitty_git::{
    ChildrenIndex, CommitId, CommitRecord, GitError, HistorySource, ReferenceSet,
    ReferenceSource, parse_commit_block,
};
use tracing::{debug, warn};

use crate::error::GraphError;
use crate::layout::{LayoutEngine, LayoutOptions};
use crate::row::GraphRow;

/// Lazy sequence of graph rows over one pass of the history
pub struct Traversal<B> {
    blocks: Option<B>,
    engine: LayoutEngine,
    references: ReferenceSet,
    children: Option<ChildrenIndex>,
    rows_emitted: usize,
    skipped_blocks: usize,
    unreached: Vec<CommitId>,
}

impl<B> Traversal<B>
where
    B: Iterator<Item = Result<String, GitError>>,
{
    /// Lay out raw blocks with the given decorations
    #[must_use]
    pub fn new(blocks: B, references: ReferenceSet, options: LayoutOptions) -> Self {
        Self {
            blocks: Some(blocks),
            engine: LayoutEngine::new(options),
            references,
            children: None,
            rows_emitted: 0,
            skipped_blocks: 0,
            unreached: Vec::new(),
        }
    }

    /// Also record a reverse parent → children index while laying out
    ///
    /// The index grows with every row, so it is off unless asked for.
    #[must_use]
    pub fn with_children_index(mut self) -> Self {
        self.children = Some(ChildrenIndex::new());
        self
    }

    /// Children index over the rows emitted so far, when enabled
    #[must_use]
    pub fn children(&self) -> Option<&ChildrenIndex> {
        self.children.as_ref()
    }

    /// Decorations used for this pass
    #[must_use]
    pub fn references(&self) -> &ReferenceSet {
        &self.references
    }

    /// Number of rows produced so far
    #[must_use]
    pub fn rows_emitted(&self) -> usize {
        self.rows_emitted
    }

    /// Blocks dropped because they held no commit
    #[must_use]
    pub fn skipped_blocks(&self) -> usize {
        self.skipped_blocks
    }

    /// Whether the underlying history has been released
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.blocks.is_none()
    }

    /// Parents that lines were drawn toward but that never appeared
    ///
    /// While the pass is running this reflects the lines currently waiting;
    /// once it has finished it is the final set, e.g. the boundary of a
    /// shallow clone.
    #[must_use]
    pub fn unreached(&self) -> Vec<CommitId> {
        if self.is_finished() {
            self.unreached.clone()
        } else {
            self.engine.unreached().cloned().collect()
        }
    }

    fn lay_out(&mut self, commit: CommitRecord) -> GraphRow {
        if let Some(children) = &mut self.children {
            children.record(&commit);
        }
        let placement = self.engine.place(&commit);
        let references = self.references.get(commit.id.as_str()).to_vec();
        let row = GraphRow::new(self.rows_emitted, commit, placement, references);
        self.rows_emitted += 1;
        row
    }

    fn finish(&mut self) {
        self.blocks = None;
        self.unreached = self.engine.unreached().cloned().collect();
        self.engine.reset();
        debug!(
            rows = self.rows_emitted,
            skipped = self.skipped_blocks,
            unreached = self.unreached.len(),
            "Traversal finished"
        );
    }
}

impl<B> Iterator for Traversal<B>
where
    B: Iterator<Item = Result<String, GitError>>,
{
    type Item = GraphRow;

    fn next(&mut self) -> Option<GraphRow> {
        loop {
            let block = match self.blocks.as_mut()?.next() {
                Some(Ok(block)) => block,
                Some(Err(err)) => {
                    warn!(error = %err, rows = self.rows_emitted, "History stream failed, ending traversal");
                    self.finish();
                    return None;
                }
                None => {
                    self.finish();
                    return None;
                }
            };

            match parse_commit_block(&block) {
                Ok(commit) => return Some(self.lay_out(commit)),
                Err(err) => {
                    warn!(error = %err, "Skipping commit block");
                    self.skipped_blocks += 1;
                }
            }
        }
    }
}

/// A repository history that can be laid out any number of times
#[derive(Debug, Clone)]
pub struct CommitGraph<S> {
    source: S,
    options: LayoutOptions,
    decorate: bool,
    index_children: bool,
}

impl<S> CommitGraph<S>
where
    S: HistorySource + ReferenceSource,
{
    /// Wrap a source that provides both history and references
    #[must_use]
    pub fn new(source: S) -> Self {
        Self {
            source,
            options: LayoutOptions::default(),
            decorate: true,
            index_children: false,
        }
    }

    /// Use the given layout options for every traversal
    #[must_use]
    pub fn with_options(mut self, options: LayoutOptions) -> Self {
        self.options = options;
        self
    }

    /// Skip reference resolution
    #[must_use]
    pub fn without_references(mut self) -> Self {
        self.decorate = false;
        self
    }

    /// Record a children index in every traversal
    #[must_use]
    pub fn with_children_index(mut self) -> Self {
        self.index_children = true;
        self
    }

    /// The wrapped source
    #[must_use]
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Start a new pass over the history
    ///
    /// References are resolved once, before the first block is read.
    ///
    /// # Errors
    ///
    /// Returns `GraphError::Git` if the history provider cannot be started.
    pub fn traverse(&self) -> Result<Traversal<S::Blocks>, GraphError> {
        let references = if self.decorate {
            ReferenceSet::resolve(&self.source)
        } else {
            ReferenceSet::new()
        };
        let blocks = self.source.history()?;
        debug!(lanes = ?self.options.lanes, decorated = references.len(), "Starting traversal");
        let traversal = Traversal::new(blocks, references, self.options);
        Ok(if self.index_children {
            traversal.with_children_index()
        } else {
            traversal
        })
    }
}
