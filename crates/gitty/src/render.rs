// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Plain-text rendering of graph rows and commit detail
//!
//! Each row becomes a single line: a glyph column followed by the commit
//! summary. The glyph column has two cells per lane so that dodged lines
//! (`1.5`) get a cell of their own:
//!
//! ```text
//! *\    a1b2c3d (main) Merge branch 'feature'
//! *\|   e4f5a6b Teach parser about mergetag
//! ```

use std::fmt::Write as _;

use console::Style;
use gitty_git::{CommitDetail, RefKind, Reference};
use gitty_graph::{ColorId, EdgeSegment, GraphRow};

/// ANSI 256-color codes used for lane colors
pub const PALETTE: [u8; 12] = [33, 203, 41, 220, 135, 39, 208, 77, 170, 75, 214, 161];

type Cell = Option<(char, ColorId)>;

/// Renders rows as text lines
#[derive(Debug, Clone, Copy)]
pub struct TextRenderer {
    palette_size: u32,
    color: bool,
}

impl TextRenderer {
    /// Create a renderer cycling through `palette_size` colors
    #[must_use]
    pub fn new(palette_size: u32, color: bool) -> Self {
        Self {
            palette_size,
            color,
        }
    }

    /// ANSI code for a logical color
    #[must_use]
    pub fn ansi_code(&self, color: ColorId) -> u8 {
        let index = color.palette_index(self.palette_size) as usize;
        PALETTE[index % PALETTE.len()]
    }

    /// The glyph column for a row
    #[must_use]
    pub fn graph(&self, row: &GraphRow) -> String {
        let mut out = String::new();
        for cell in graph_cells(row) {
            match cell {
                None => out.push(' '),
                Some((glyph, color)) if self.color => {
                    let style = Style::new().color256(self.ansi_code(color)).force_styling(true);
                    let _ = write!(out, "{}", style.apply_to(glyph));
                }
                Some((glyph, _)) => out.push(glyph),
            }
        }
        out
    }

    /// The full text line for a row
    #[must_use]
    pub fn render(&self, row: &GraphRow) -> String {
        let mut line = self.graph(row);
        line.push_str("  ");
        line.push_str(row.commit.short_id());

        let decorations = decorations(&row.references);
        if !decorations.is_empty() {
            line.push(' ');
            line.push_str(&decorations);
        }

        line.push(' ');
        line.push_str(&row.commit.subject);

        if let Some(author) = &row.commit.author {
            let _ = write!(line, "  {}  {}", author.name, author.timestamp());
        }
        line
    }
}

/// Glyph cells for a row, trailing blanks trimmed
///
/// Straight segments draw `|` on their lane. Diagonals draw `\` or `/` in
/// the cell next to the lane they touch in this row. The node draws `*`
/// over anything else.
fn graph_cells(row: &GraphRow) -> Vec<Cell> {
    let width = (row.max_column() as usize + 1) * 2;
    let mut cells: Vec<Cell> = vec![None; width];

    for seg in row.incoming.iter().chain(&row.outgoing) {
        if seg.is_straight() {
            cells[seg.from.half_steps() as usize] = Some(('|', seg.color));
        }
    }

    let diagonals = row
        .incoming
        .iter()
        .filter(|seg| !seg.is_straight())
        .map(|seg| (entering(seg), seg.color))
        .chain(
            row.outgoing
                .iter()
                .filter(|seg| !seg.is_straight())
                .map(|seg| (leaving(seg), seg.color)),
        );
    for ((idx, glyph), color) in diagonals {
        let cell = &mut cells[idx];
        if cell.is_none() {
            *cell = Some((glyph, color));
        }
    }

    cells[row.lane.half_steps() as usize] = Some(('*', row.color));

    while cells.last() == Some(&None) {
        cells.pop();
    }
    cells
}

/// Where a segment from the row above arrives
fn entering(seg: &EdgeSegment) -> (usize, char) {
    let (from, to) = (seg.from.half_steps(), seg.to.half_steps());
    if to > from {
        // Dodges move half a lane and get the arrival cell itself
        let idx = if to - from == 1 { to } else { to - 1 };
        (idx as usize, '\\')
    } else {
        ((to + 1) as usize, '/')
    }
}

/// Where a segment leaves toward the row below
fn leaving(seg: &EdgeSegment) -> (usize, char) {
    let from = seg.from.half_steps();
    if seg.to.half_steps() > from {
        ((from + 1) as usize, '\\')
    } else {
        ((from - 1) as usize, '/')
    }
}

/// `(main, origin/main, tag: v1.0)` style decoration list; empty when there
/// are no references
#[must_use]
pub fn decorations(references: &[Reference]) -> String {
    if references.is_empty() {
        return String::new();
    }
    let names: Vec<String> = references
        .iter()
        .map(|reference| match reference.kind {
            RefKind::Tag => format!("tag: {}", reference.short_name()),
            _ => reference.short_name().to_string(),
        })
        .collect();
    format!("({})", names.join(", "))
}

/// `git show` style text for one commit
#[must_use]
pub fn detail_text(detail: &CommitDetail) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "commit {}", detail.id);
    if detail.parents.len() > 1 {
        let parents: Vec<&str> = detail.parents.iter().map(|p| p.short()).collect();
        let _ = writeln!(out, "Merge: {}", parents.join(" "));
    }
    let _ = writeln!(out, "Author:     {}", detail.author);
    let _ = writeln!(out, "AuthorDate: {}", detail.author.timestamp());
    let _ = writeln!(out, "Commit:     {}", detail.committer);
    let _ = writeln!(out, "CommitDate: {}", detail.committer.timestamp());
    out.push('\n');
    for line in detail.message.trim_end().lines() {
        if line.is_empty() {
            out.push('\n');
        } else {
            let _ = writeln!(out, "    {line}");
        }
    }
    if !detail.diff.is_empty() {
        out.push('\n');
        out.push_str(&detail.diff);
    }
    out
}
