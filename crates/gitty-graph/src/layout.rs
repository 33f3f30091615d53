// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Streaming lane layout
//!
//! Commits arrive one at a time, every child before its parents. Each commit
//! gets a lane and a color the first time anything mentions it, either as a
//! row or as somebody's parent, and keeps them for the rest of the pass.
//! First parents inherit their child's lane and color, so first-parent
//! chains draw as one straight line.
//!
//! Lines waiting for a parent further down are tracked per parent as
//! "pending" lanes. They pass straight through every row until the parent's
//! own row is reached. When a row's node sits on a lane a waiting line is
//! using, the line steps half a lane to the right for the rest of its run.
//!
//! ```text
//!   *     row N      outgoing: (0,0) (0,1)
//!   |\
//!   * |   row N+1    incoming: row N's outgoing
//! ```

use std::collections::HashMap;
use std::fmt;

use gitty_git::{CommitId, CommitRecord};
use serde::{Deserialize, Serialize, Serializer};
use tracing::trace;

/// Horizontal track position, kept in half-lane steps
///
/// Lanes handed to commits are always whole; half positions only appear on
/// waiting lines that had to step aside.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Lane(u32);

impl Lane {
    /// The whole lane at `column`
    #[must_use]
    pub const fn new(column: u32) -> Self {
        Self(column.saturating_mul(2))
    }

    /// Build a lane from a raw half-step count
    #[must_use]
    pub const fn from_half_steps(steps: u32) -> Self {
        Self(steps)
    }

    /// Raw half-step count (`2 × position`)
    #[must_use]
    pub const fn half_steps(self) -> u32 {
        self.0
    }

    /// Column this lane sits in, rounding half positions down
    #[must_use]
    pub const fn column(self) -> u32 {
        self.0 / 2
    }

    /// Whether this is a half position
    #[must_use]
    pub const fn is_dodged(self) -> bool {
        self.0 % 2 == 1
    }

    /// The position half a lane to the right
    #[must_use]
    pub const fn dodged(self) -> Self {
        Self(self.0 + 1)
    }

    /// Numeric position (`1.5` for a line dodging right of lane 1)
    #[must_use]
    pub fn position(self) -> f64 {
        f64::from(self.0) / 2.0
    }
}

impl fmt::Display for Lane {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_dodged() {
            write!(f, "{}.5", self.column())
        } else {
            write!(f, "{}", self.column())
        }
    }
}

impl Serialize for Lane {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.position())
    }
}

/// Logical color of a lane chain
///
/// Only equality matters to the layout; renderers map ids onto a palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize)]
#[serde(transparent)]
pub struct ColorId(pub u32);

impl ColorId {
    /// Index into a palette of `palette_size` entries
    #[must_use]
    pub fn palette_index(self, palette_size: u32) -> u32 {
        self.0 % palette_size.max(1)
    }
}

impl fmt::Display for ColorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A line segment drawn within one row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct EdgeSegment {
    /// Lane at the top of the segment
    pub from: Lane,
    /// Lane at the bottom of the segment
    pub to: Lane,
    /// Color of the chain the segment leads to
    pub color: ColorId,
}

impl EdgeSegment {
    /// Create a segment
    #[must_use]
    pub const fn new(from: Lane, to: Lane, color: ColorId) -> Self {
        Self { from, to, color }
    }

    /// Whether the segment is vertical
    #[must_use]
    pub fn is_straight(&self) -> bool {
        self.from == self.to
    }
}

/// Ordered set of segments; inserting a duplicate is a no-op
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct EdgeSet(Vec<EdgeSegment>);

impl EdgeSet {
    /// Create an empty set
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a segment; returns `false` if it was already present
    pub fn insert(&mut self, segment: EdgeSegment) -> bool {
        if self.0.contains(&segment) {
            return false;
        }
        self.0.push(segment);
        true
    }

    /// Remove a segment; returns `false` if it was absent
    pub fn remove(&mut self, segment: &EdgeSegment) -> bool {
        match self.0.iter().position(|s| s == segment) {
            Some(idx) => {
                self.0.remove(idx);
                true
            }
            None => false,
        }
    }

    /// Check membership
    #[must_use]
    pub fn contains(&self, segment: &EdgeSegment) -> bool {
        self.0.contains(segment)
    }

    /// Iterate in insertion order
    pub fn iter(&self) -> std::slice::Iter<'_, EdgeSegment> {
        self.0.iter()
    }

    /// Segments as a slice
    #[must_use]
    pub fn as_slice(&self) -> &[EdgeSegment] {
        &self.0
    }

    /// Number of segments
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the set is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'a> IntoIterator for &'a EdgeSet {
    type Item = &'a EdgeSegment;
    type IntoIter = std::slice::Iter<'a, EdgeSegment>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl FromIterator<EdgeSegment> for EdgeSet {
    fn from_iter<I: IntoIterator<Item = EdgeSegment>>(iter: I) -> Self {
        let mut set = Self::new();
        for segment in iter {
            set.insert(segment);
        }
        set
    }
}

/// How fresh lanes are picked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LaneAllocation {
    /// Every fresh lane is one past the last fresh lane
    #[default]
    Monotonic,
    /// A fresh lane is one past the lane most recently touched while placing
    /// parents, so lanes of finished branches get reused
    FollowParent,
}

/// Layout tunables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LayoutOptions {
    /// Lane allocation policy
    pub lanes: LaneAllocation,
}

impl LayoutOptions {
    /// Set the lane allocation policy
    #[must_use]
    pub fn with_lanes(mut self, lanes: LaneAllocation) -> Self {
        self.lanes = lanes;
        self
    }
}

/// Lane and color given to one commit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Assignment {
    /// Node lane
    pub lane: Lane,
    /// Chain color
    pub color: ColorId,
}

/// Lines waiting to reach a commit, in the order they were first registered
#[derive(Debug, Clone, Default)]
struct PendingEdges {
    entries: Vec<(CommitId, Vec<Lane>)>,
}

impl PendingEdges {
    fn register(&mut self, commit: &CommitId, lane: Lane) {
        match self.entries.iter_mut().find(|(id, _)| id == commit) {
            Some((_, lanes)) => {
                if !lanes.contains(&lane) {
                    lanes.push(lane);
                }
            }
            None => self.entries.push((commit.clone(), vec![lane])),
        }
    }

    fn remove(&mut self, commit: &str) -> Option<Vec<Lane>> {
        let idx = self
            .entries
            .iter()
            .position(|(id, _)| id.as_str() == commit)?;
        Some(self.entries.remove(idx).1)
    }

    fn get(&self, commit: &str) -> Option<&[Lane]> {
        self.entries
            .iter()
            .find(|(id, _)| id.as_str() == commit)
            .map(|(_, lanes)| lanes.as_slice())
    }
}

/// Per-traversal bookkeeping
#[derive(Debug, Clone, Default)]
pub(crate) struct LayoutState {
    assigned: HashMap<CommitId, Assignment>,
    pending: PendingEdges,
    next_color: u32,
    next_lane: u32,
}

impl LayoutState {
    fn allocate(&mut self) -> Assignment {
        let assignment = Assignment {
            lane: Lane::new(self.next_lane),
            color: ColorId(self.next_color),
        };
        self.next_lane += 1;
        self.next_color += 1;
        assignment
    }

    /// Assign `commit` if it has no assignment yet; returns the assignment in
    /// effect and whether it was freshly allocated
    fn assign(&mut self, commit: &CommitId) -> (Assignment, bool) {
        if let Some(&existing) = self.assigned.get(commit) {
            return (existing, false);
        }
        let fresh = self.allocate();
        self.assigned.insert(commit.clone(), fresh);
        (fresh, true)
    }
}

/// Everything the layout decided for one commit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement {
    /// Node lane and color
    pub node: Assignment,
    /// Segments arriving from the row above
    pub incoming: EdgeSet,
    /// Segments leaving toward the rows below
    pub outgoing: EdgeSet,
}

/// The streaming layout engine
///
/// One engine serves one traversal. Feed it commits in children-first order
/// with [`LayoutEngine::place`].
#[derive(Debug, Clone, Default)]
pub struct LayoutEngine {
    options: LayoutOptions,
    state: LayoutState,
    carried: EdgeSet,
    rows_placed: usize,
}

impl LayoutEngine {
    /// Create an engine with empty state
    #[must_use]
    pub fn new(options: LayoutOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    /// Options in effect
    #[must_use]
    pub fn options(&self) -> LayoutOptions {
        self.options
    }

    /// Lay out the next commit of the stream
    pub fn place(&mut self, commit: &CommitRecord) -> Placement {
        let (node, _) = self.state.assign(&commit.id);

        // First parents continue the child's line
        if let Some(first) = commit.parents.first() {
            self.state.assigned.entry(first.clone()).or_insert(node);
        }

        let mut incoming = std::mem::take(&mut self.carried);
        let mut outgoing = EdgeSet::new();

        self.state.pending.remove(commit.id.as_str());
        let LayoutState {
            assigned, pending, ..
        } = &mut self.state;
        for (waiting_for, lanes) in &mut pending.entries {
            let Some(color) = assigned.get(waiting_for).map(|a| a.color) else {
                continue;
            };
            for lane in lanes.iter_mut() {
                if *lane == node.lane {
                    let straight = EdgeSegment::new(*lane, *lane, color);
                    incoming.remove(&straight);
                    incoming.insert(EdgeSegment::new(*lane, lane.dodged(), color));
                    trace!(row = self.rows_placed, waiting_for = %waiting_for, lane = %lane, "Dodging node");
                    *lane = lane.dodged();
                }
                outgoing.insert(EdgeSegment::new(*lane, *lane, color));
            }
        }

        for parent in &commit.parents {
            let (target, fresh) = self.state.assign(parent);
            if !fresh && self.options.lanes == LaneAllocation::FollowParent {
                self.state.next_lane = target.lane.column() + 1;
            }
            outgoing.insert(EdgeSegment::new(node.lane, target.lane, target.color));
            self.state.pending.register(parent, target.lane);
        }

        self.carried = outgoing.clone();
        self.rows_placed += 1;

        Placement {
            node,
            incoming,
            outgoing,
        }
    }

    /// Assignment of a commit, if it has been mentioned yet
    #[must_use]
    pub fn assignment(&self, commit: &str) -> Option<Assignment> {
        self.state.assigned.get(commit).copied()
    }

    /// Lanes currently waiting to reach `commit`
    #[must_use]
    pub fn pending_lanes(&self, commit: &str) -> Option<&[Lane]> {
        self.state.pending.get(commit)
    }

    /// Commits with lines still waiting for them, in registration order
    pub fn unreached(&self) -> impl Iterator<Item = &CommitId> {
        self.state.pending.entries.iter().map(|(id, _)| id)
    }

    /// Number of commits placed so far
    #[must_use]
    pub fn rows_placed(&self) -> usize {
        self.rows_placed
    }

    /// Discard all state, ready for a new traversal
    pub fn reset(&mut self) {
        *self = Self::new(self.options);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use similar_asserts::assert_eq;

    fn id(name: &str) -> CommitId {
        CommitId::from(name)
    }

    fn commit(name: &str, parents: &[&str]) -> CommitRecord {
        CommitRecord::new(name, parents.iter().map(|p| id(p)).collect())
    }

    fn seg(from: u32, to: u32, color: u32) -> EdgeSegment {
        EdgeSegment::new(Lane::from_half_steps(from * 2), Lane::from_half_steps(to * 2), ColorId(color))
    }

    fn half(from_half_steps: u32, to_half_steps: u32, color: u32) -> EdgeSegment {
        EdgeSegment::new(
            Lane::from_half_steps(from_half_steps),
            Lane::from_half_steps(to_half_steps),
            ColorId(color),
        )
    }

    fn edges(segments: &[EdgeSegment]) -> EdgeSet {
        segments.iter().copied().collect()
    }

    #[test]
    fn test_lane_positions() {
        assert_eq!(Lane::new(3).position(), 3.0);
        assert_eq!(Lane::new(1).dodged().position(), 1.5);
        assert!(Lane::new(1).dodged().is_dodged());
        assert_eq!(Lane::new(1).dodged().column(), 1);
        assert_eq!(Lane::new(2).to_string(), "2");
        assert_eq!(Lane::new(2).dodged().to_string(), "2.5");
        assert_eq!(
            serde_json::to_string(&Lane::new(1).dodged()).expect("serialize"),
            "1.5"
        );
    }

    #[test]
    fn test_palette_index_wraps() {
        assert_eq!(ColorId(10).palette_index(8), 2);
        assert_eq!(ColorId(3).palette_index(0), 0);
    }

    #[test]
    fn test_edge_set_deduplicates() {
        let mut set = EdgeSet::new();
        assert!(set.insert(seg(0, 0, 0)));
        assert!(!set.insert(seg(0, 0, 0)));
        assert!(set.insert(seg(0, 1, 1)));
        assert_eq!(set.len(), 2);
        assert!(set.remove(&seg(0, 0, 0)));
        assert!(!set.remove(&seg(0, 0, 0)));
        assert_eq!(set.as_slice().to_vec(), vec![seg(0, 1, 1)]);
    }

    #[test]
    fn test_linear_history_stays_in_one_lane() {
        let mut engine = LayoutEngine::default();
        let rows: Vec<Placement> = [
            commit("c1", &["c2"]),
            commit("c2", &["c3"]),
            commit("c3", &["c4"]),
            commit("c4", &[]),
        ]
        .iter()
        .map(|c| engine.place(c))
        .collect();

        for row in &rows {
            assert_eq!(row.node, Assignment { lane: Lane::new(0), color: ColorId(0) });
        }
        assert!(rows[0].incoming.is_empty());
        for row in &rows[1..3] {
            assert_eq!(row.incoming, edges(&[seg(0, 0, 0)]));
            assert_eq!(row.outgoing, edges(&[seg(0, 0, 0)]));
        }
        assert_eq!(rows[0].outgoing, edges(&[seg(0, 0, 0)]));
        assert_eq!(rows[3].incoming, edges(&[seg(0, 0, 0)]));
        assert!(rows[3].outgoing.is_empty());
        assert_eq!(engine.unreached().count(), 0);
    }

    #[test]
    fn test_single_merge_keeps_second_parent_identity() {
        let mut engine = LayoutEngine::default();

        let m = engine.place(&commit("M", &["P1", "P2"]));
        assert_eq!(m.node.lane, Lane::new(0));
        assert_eq!(m.outgoing, edges(&[seg(0, 0, 0), seg(0, 1, 1)]));

        let p2_first_seen = engine.assignment("P2").expect("assigned as parent");
        assert_eq!(p2_first_seen, Assignment { lane: Lane::new(1), color: ColorId(1) });
        assert_eq!(engine.assignment("P1"), Some(m.node));

        let p1 = engine.place(&commit("P1", &["R"]));
        assert_eq!(p1.node, m.node);
        assert_eq!(p1.incoming, m.outgoing);
        assert_eq!(p1.outgoing, edges(&[seg(1, 1, 1), seg(0, 0, 0)]));

        let p2 = engine.place(&commit("P2", &["R"]));
        assert_eq!(p2.node, p2_first_seen);
        assert_eq!(p2.outgoing, edges(&[seg(0, 0, 0), seg(1, 0, 0)]));
        assert_eq!(engine.pending_lanes("P2"), None);

        let r = engine.place(&commit("R", &[]));
        assert_eq!(r.node, m.node);
        assert!(r.outgoing.is_empty());
        assert_eq!(engine.unreached().count(), 0);
    }

    #[test]
    fn test_root_only_drains_its_own_entry() {
        let mut engine = LayoutEngine::default();
        engine.place(&commit("M", &["A", "B"]));
        let a = engine.place(&commit("A", &[]));

        // The line to B keeps passing through; nothing leaves A itself
        assert_eq!(a.outgoing, edges(&[seg(1, 1, 1)]));
        assert_eq!(engine.pending_lanes("A"), None);
        assert_eq!(engine.pending_lanes("B"), Some(&[Lane::new(1)][..]));
    }

    #[test]
    fn test_octopus_merge_gets_one_edge_per_parent() {
        let mut engine = LayoutEngine::default();
        let o = engine.place(&commit("O", &["A", "B", "C", "D"]));
        assert_eq!(
            o.outgoing,
            edges(&[seg(0, 0, 0), seg(0, 1, 1), seg(0, 2, 2), seg(0, 3, 3)])
        );
        for (name, lane) in [("A", 0), ("B", 1), ("C", 2), ("D", 3)] {
            assert_eq!(engine.pending_lanes(name), Some(&[Lane::new(lane)][..]));
        }
    }

    #[test]
    fn test_shared_parent_keeps_first_assignment() {
        let mut engine = LayoutEngine::default();
        engine.place(&commit("X", &["S"]));
        let y = engine.place(&commit("Y", &["S"]));

        // Y is a new tip; S already belongs to X's lane
        assert_eq!(y.node, Assignment { lane: Lane::new(1), color: ColorId(1) });
        assert_eq!(engine.assignment("S"), Some(Assignment { lane: Lane::new(0), color: ColorId(0) }));
        assert_eq!(y.outgoing, edges(&[seg(0, 0, 0), seg(1, 0, 0)]));
        assert_eq!(engine.pending_lanes("S"), Some(&[Lane::new(0)][..]));

        let s = engine.place(&commit("S", &[]));
        assert_eq!(s.node.lane, Lane::new(0));
        assert_eq!(s.incoming, y.outgoing);
    }

    #[test]
    fn test_monotonic_never_reuses_lanes() {
        let mut engine = LayoutEngine::default();
        engine.place(&commit("M", &["P1", "P2"]));
        engine.place(&commit("P1", &["R"]));
        let h = engine.place(&commit("H", &["R"]));
        assert_eq!(h.node.lane, Lane::new(2));
    }

    #[test]
    fn test_follow_parent_reuses_lane_and_dodges() {
        let mut engine = LayoutEngine::new(LayoutOptions::default().with_lanes(LaneAllocation::FollowParent));

        engine.place(&commit("M", &["P1", "P2"]));
        let p1 = engine.place(&commit("P1", &["R"]));
        assert_eq!(p1.outgoing, edges(&[seg(1, 1, 1), seg(0, 0, 0)]));

        // H lands on lane 1, where the line to P2 is waiting
        let h = engine.place(&commit("H", &["R"]));
        assert_eq!(h.node, Assignment { lane: Lane::new(1), color: ColorId(2) });
        assert_eq!(h.incoming, edges(&[seg(0, 0, 0), half(2, 3, 1)]));
        assert_eq!(h.outgoing, edges(&[half(3, 3, 1), seg(0, 0, 0), seg(1, 0, 0)]));
        assert_eq!(engine.pending_lanes("P2"), Some(&[Lane::new(1).dodged()][..]));

        let p2 = engine.place(&commit("P2", &["R"]));
        assert_eq!(p2.node, Assignment { lane: Lane::new(1), color: ColorId(1) });
        assert_eq!(p2.incoming, h.outgoing);
        assert_eq!(p2.outgoing, edges(&[seg(0, 0, 0), seg(1, 0, 0)]));
        assert_eq!(engine.pending_lanes("R"), Some(&[Lane::new(0)][..]));

        let r = engine.place(&commit("R", &[]));
        assert!(r.outgoing.is_empty());
        assert_eq!(engine.unreached().count(), 0);
    }

    #[test]
    fn test_unreached_parents_remain_pending() {
        let mut engine = LayoutEngine::default();
        engine.place(&commit("A", &["B"]));
        engine.place(&commit("B", &["shallow-1", "shallow-2"]));
        let unreached: Vec<&str> = engine.unreached().map(CommitId::as_str).collect();
        assert_eq!(unreached, vec!["shallow-1", "shallow-2"]);
    }

    #[test]
    fn test_reset_discards_state() {
        let mut engine = LayoutEngine::new(LayoutOptions::default().with_lanes(LaneAllocation::FollowParent));
        engine.place(&commit("A", &["B", "C"]));
        engine.reset();

        assert_eq!(engine.rows_placed(), 0);
        assert_eq!(engine.assignment("A"), None);
        assert_eq!(engine.unreached().count(), 0);
        assert_eq!(engine.options().lanes, LaneAllocation::FollowParent);

        let fresh = engine.place(&commit("Z", &[]));
        assert!(fresh.incoming.is_empty());
        assert_eq!(fresh.node.color, ColorId(0));
    }
}
