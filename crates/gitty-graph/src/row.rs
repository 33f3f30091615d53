// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Graph rows handed to renderers

use gitty_git::{CommitRecord, Reference};
use serde::Serialize;

use crate::error::GraphError;
use crate::layout::{ColorId, EdgeSet, Lane, Placement};

/// One commit with everything needed to draw its row
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GraphRow {
    /// Zero-based position in the stream
    pub index: usize,
    /// The parsed commit
    pub commit: CommitRecord,
    /// Lane of the commit's node
    pub lane: Lane,
    /// Color of the commit's node
    pub color: ColorId,
    /// Segments arriving from the row above
    pub incoming: EdgeSet,
    /// Segments leaving toward the rows below
    pub outgoing: EdgeSet,
    /// Branches, tags and other refs pointing at this commit
    pub references: Vec<Reference>,
}

impl GraphRow {
    /// Combine a commit with its placement and decorations
    #[must_use]
    pub fn new(
        index: usize,
        commit: CommitRecord,
        placement: Placement,
        references: Vec<Reference>,
    ) -> Self {
        Self {
            index,
            commit,
            lane: placement.node.lane,
            color: placement.node.color,
            incoming: placement.incoming,
            outgoing: placement.outgoing,
            references,
        }
    }

    /// Widest lane column touched by this row, node included
    #[must_use]
    pub fn max_column(&self) -> u32 {
        self.incoming
            .iter()
            .chain(&self.outgoing)
            .flat_map(|seg| [seg.from, seg.to])
            .chain(std::iter::once(self.lane))
            .map(Lane::column)
            .max()
            .unwrap_or(0)
    }

    /// Serialize as a single line of JSON
    ///
    /// # Errors
    ///
    /// Returns `GraphError::Json` if serialization fails.
    pub fn to_json_line(&self) -> Result<String, GraphError> {
        Ok(serde_json::to_string(self)?)
    }
}
