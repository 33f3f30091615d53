// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

use std::io::Cursor;

use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use gitty_git::{BlockReader, ReferenceSet, parse_commit_block};

/// Build `count` NUL-framed blocks forming a single first-parent chain
fn synthetic_history(count: usize) -> String {
    let mut out = String::new();
    for i in (0..count).rev() {
        let parent = if i == 0 {
            String::new()
        } else {
            format!(" {:040x}", i - 1)
        };
        out.push_str(&format!(
            "{i:040x}{parent}\n\
             tree {i:040x}\n\
             author Bench Author <bench@example.com> {} +0100\n\
             committer Bench Author <bench@example.com> {} +0100\n\
             \n\
             \x20   Commit number {i}\n\
             \x20   \n\
             \x20   Longer body text that the parser only skims.\n\0",
            1_600_000_000 + i,
            1_600_000_000 + i,
        ));
    }
    out
}

fn parser_benchmarks(c: &mut Criterion) {
    let history = synthetic_history(1_000);

    let mut group = c.benchmark_group("parser");
    group.throughput(Throughput::Bytes(history.len() as u64));
    group.bench_function("parse_1000_blocks", |b| {
        b.iter(|| {
            BlockReader::new(Cursor::new(history.as_bytes()))
                .map(|block| parse_commit_block(&block.expect("in-memory read")).expect("parse"))
                .count()
        })
    });
    group.finish();

    let listing: String = (0..500)
        .map(|i| format!("{i:040x}\trefs/heads/branch-{i}\n{i:040x}\trefs/tags/v{i}\n"))
        .collect();
    c.bench_function("parse_ref_listing_1000", |b| {
        b.iter(|| ReferenceSet::parse_listing(std::hint::black_box(&listing)).len())
    });
}

criterion_group!(benches, parser_benchmarks);
criterion_main!(benches);
