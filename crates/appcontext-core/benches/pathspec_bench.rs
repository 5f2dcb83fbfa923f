//! Criterion benchmarks for path entry validation and rendering.
//!
//! Both run once per entry on every `generate` and `assess`, so they bound
//! the CPU cost of large layouts.
//!
//! Run with:
//! ```bash
//! cargo bench --package appcontext-core --bench pathspec_bench
//! ```

use appcontext_core::pathspec::templates;
use appcontext_core::{Layout, PathEntry, PathResolver, XdgDirs};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

// ── Fixtures ──────────────────────────────────────────────────────────────────

/// `n` entries cycling through every template.
fn entries(n: usize) -> Vec<PathEntry> {
    let all = templates::all();
    (0..n)
        .map(|i| {
            let (id, template) = &all[i % all.len()];
            template.clone().with_name(format!("{id}-{i}"))
        })
        .collect()
}

fn resolver() -> PathResolver {
    PathResolver::new(XdgDirs::rooted_at("/bench"))
}

// ── Benchmarks ────────────────────────────────────────────────────────────────

fn bench_validate(c: &mut Criterion) {
    let entries: Vec<PathEntry> = entries(9)
        .into_iter()
        .map(|e| e.with_app_name("bench"))
        .collect();

    c.bench_function("entry_validate_all_templates", |b| {
        b.iter(|| {
            for entry in &entries {
                let _ = black_box(entry.validate());
            }
        })
    });
}

fn bench_render(c: &mut Criterion) {
    let resolver = resolver();
    let entry = templates::log_file()
        .with_name("server.log")
        .with_app_name("bench")
        .with_group("acme");

    c.bench_function("entry_render_grouped_file", |b| {
        b.iter(|| black_box(entry.render(black_box(&resolver))))
    });
}

fn bench_layout_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("layout_new");
    for n in [10usize, 100, 1000] {
        let input = entries(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &input, |b, input| {
            b.iter(|| black_box(Layout::new("bench", input.clone())))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_validate, bench_render, bench_layout_build);
criterion_main!(benches);
