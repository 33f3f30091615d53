// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! gitty-graph: streaming commit-graph layout
//!
//! Turns a children-first stream of commits into drawable rows. Every row
//! carries the commit, the lane and color of its node, and the line
//! segments entering and leaving the row. Rows are produced one at a time,
//! so a viewer can draw the top of a huge history immediately.
//!
//! # Example
//!
//! ```no_run
//! use gitty_git::GitCli;
//! use gitty_graph::{CommitGraph, LaneAllocation, LayoutOptions};
//!
//! let graph = CommitGraph::new(GitCli::new("."))
//!     .with_options(LayoutOptions::default().with_lanes(LaneAllocation::FollowParent));
//!
//! for row in graph.traverse().expect("start git").take(20) {
//!     println!("{:>4} {} {}", row.lane, row.commit.short_id(), row.commit.subject);
//! }
//! ```

#![warn(missing_docs)]

pub mod error;
pub mod layout;
pub mod row;
pub mod stream;

pub use error::GraphError;
pub use layout::{
    Assignment, ColorId, EdgeSegment, EdgeSet, Lane, LaneAllocation, LayoutEngine, LayoutOptions,
    Placement,
};
pub use row::GraphRow;
pub use stream::{CommitGraph, Traversal};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::error::GraphError;
    pub use crate::layout::{ColorId, EdgeSegment, Lane, LaneAllocation, LayoutOptions};
    pub use crate::row::GraphRow;
    pub use crate::stream::{CommitGraph, Traversal};
}
