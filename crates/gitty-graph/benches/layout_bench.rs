// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use gitty_git::{CommitId, CommitRecord, GitError, ReferenceSet};
use gitty_graph::{LaneAllocation, LayoutEngine, LayoutOptions, Traversal};

/// A mainline of `count` commits where every fifth commit merges a short
/// side branch of two commits
fn branchy_history(count: usize) -> Vec<CommitRecord> {
    let id = |name: String| CommitId::new(name);
    let mut records = Vec::with_capacity(count * 2);
    for i in 0..count {
        let main = format!("m{i}");
        let next_main = (i + 1 < count).then(|| id(format!("m{}", i + 1)));
        if i % 5 == 0 && i + 1 < count {
            let mut parents: Vec<CommitId> = next_main.into_iter().collect();
            parents.push(id(format!("s{i}a")));
            records.push(CommitRecord::new(main, parents));
            records.push(CommitRecord::new(format!("s{i}a"), vec![id(format!("s{i}b"))]));
            records.push(CommitRecord::new(
                format!("s{i}b"),
                vec![id(format!("m{}", i + 1))],
            ));
        } else {
            records.push(CommitRecord::new(main, next_main.into_iter().collect()));
        }
    }
    records
}

fn as_blocks(records: &[CommitRecord]) -> Vec<String> {
    records
        .iter()
        .map(|record| {
            let parents: Vec<&str> = record.parents.iter().map(CommitId::as_str).collect();
            format!("{} {}\n\n    {}\n", record.id, parents.join(" "), record.id)
        })
        .collect()
}

fn layout_benchmarks(c: &mut Criterion) {
    let records = branchy_history(2_000);

    let mut group = c.benchmark_group("layout");
    group.throughput(Throughput::Elements(records.len() as u64));
    for lanes in [LaneAllocation::Monotonic, LaneAllocation::FollowParent] {
        group.bench_with_input(
            BenchmarkId::new("place", format!("{lanes:?}")),
            &records,
            |b, records| {
                b.iter(|| {
                    let mut engine = LayoutEngine::new(LayoutOptions::default().with_lanes(lanes));
                    records.iter().map(|r| engine.place(r).outgoing.len()).sum::<usize>()
                })
            },
        );
    }
    group.finish();

    let blocks = as_blocks(&records);
    c.bench_function("traverse_blocks", |b| {
        b.iter(|| {
            let source = blocks.iter().cloned().map(Ok::<_, GitError>);
            Traversal::new(source, ReferenceSet::new(), LayoutOptions::default()).count()
        })
    });
}

criterion_group!(benches, layout_benchmarks);
criterion_main!(benches);
