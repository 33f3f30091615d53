// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

use criterion::{Criterion, criterion_group, criterion_main};
use gitty::render::TextRenderer;
use gitty_git::{CommitId, CommitRecord, Reference};
use gitty_graph::{GraphRow, LayoutEngine, LayoutOptions};

/// Rows of a history where every commit merges a fresh side branch, so the
/// glyph column keeps widening
fn wide_rows(count: usize) -> Vec<GraphRow> {
    let mut engine = LayoutEngine::new(LayoutOptions::default());
    (0..count)
        .map(|i| {
            let mut parents = Vec::new();
            if i + 1 < count {
                parents.push(CommitId::new(format!("{:040x}", i + 1)));
                parents.push(CommitId::new(format!("side-{i}")));
            }
            let mut record = CommitRecord::new(format!("{i:040x}"), parents);
            record.subject = format!("Merge side branch {i}");
            let placement = engine.place(&record);
            GraphRow::new(i, record, placement, vec![Reference::new("heads/main")])
        })
        .collect()
}

fn render_benchmarks(c: &mut Criterion) {
    let rows = wide_rows(200);

    c.bench_function("render_text_plain", |b| {
        let renderer = TextRenderer::new(8, false);
        b.iter(|| rows.iter().map(|row| renderer.render(row).len()).sum::<usize>())
    });
    c.bench_function("render_text_colored", |b| {
        let renderer = TextRenderer::new(8, true);
        b.iter(|| rows.iter().map(|row| renderer.render(row).len()).sum::<usize>())
    });
    c.bench_function("render_json", |b| {
        b.iter(|| {
            rows.iter()
                .map(|row| row.to_json_line().map_or(0, |line| line.len()))
                .sum::<usize>()
        })
    });
}

criterion_group!(benches, render_benchmarks);
criterion_main!(benches);
