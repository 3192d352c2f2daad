//! Benchmarks for the render and export pipeline.
//!
//! Run with: cargo bench

use criterion::{Criterion, criterion_group, criterion_main};

use wenyan::css::{StyleSheet, resolve_variables};
use wenyan::render::{RenderOptions, render_preview};
use wenyan::style::apply_styles;
use wenyan::{FootnoteLayout, Platform, Session};

const THEME: &str = include_str!("../tests/fixtures/theme.css");
const HIGHLIGHT: &str = include_str!("../tests/fixtures/highlight.css");
const POST: &str = include_str!("../tests/fixtures/post.md");

/// The fixture post repeated to a more realistic article length.
fn long_post() -> String {
    let (_, body) = wenyan::render::split_front_matter(POST);
    let mut md = String::from(POST);
    for _ in 0..20 {
        md.push_str(body);
    }
    md
}

fn session() -> Session {
    let mut session = Session::default();
    session.set_theme(THEME);
    session.set_highlight(HIGHLIGHT);
    session.set_content(&long_post());
    session.enable_footnotes(FootnoteLayout::Paragraph);
    session
}

// ============================================================================
// Theme
// ============================================================================

fn bench_resolve_variables(c: &mut Criterion) {
    c.bench_function("resolve_variables", |b| {
        b.iter(|| resolve_variables(THEME));
    });
}

fn bench_apply_styles(c: &mut Criterion) {
    let sheet = StyleSheet::parse(&resolve_variables(THEME));
    let preview = render_preview(&long_post(), &RenderOptions::default());
    c.bench_function("apply_styles", |b| {
        b.iter(|| {
            let mut tree = preview.clone();
            apply_styles(&sheet, &mut tree);
            tree
        });
    });
}

// ============================================================================
// Render and export
// ============================================================================

fn bench_render(c: &mut Criterion) {
    let md = long_post();
    c.bench_function("render_preview", |b| {
        b.iter(|| render_preview(&md, &RenderOptions::default()));
    });
}

fn bench_export(c: &mut Criterion) {
    let session = session();
    let mut group = c.benchmark_group("export");
    for platform in Platform::ALL {
        group.bench_function(platform.name(), |b| {
            b.iter(|| session.export(platform).unwrap());
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    // Theme
    bench_resolve_variables,
    bench_apply_styles,
    // Render and export
    bench_render,
    bench_export,
);
criterion_main!(benches);
