//! Performance benchmarks for Writer Pro.
//!
//! This module contains benchmarks for:
//! - Local outline generation for every preset
//! - Platform adaptation of outlines of increasing size
//! - Character budget classification
//!
//! Run with: `cargo bench`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use writer_pro::core::{char_count, ContentType, FallbackGenerator, Platform, PlatformConstraints};

// ============================================================================
// Mock Data Fixtures
// ============================================================================

mod fixtures {
    /// Build a markdown outline with `sections` sections of four bullets each.
    pub fn generate_outline(sections: usize) -> String {
        let mut outline = String::from("# Quarterly product update\n");
        for i in 0..sections {
            outline.push_str(&format!("\n## Section {i}\n"));
            for j in 0..4 {
                outline.push_str(&format!("- Point {j} about the change shipped in section {i}\n"));
            }
        }
        outline
    }
}

// ============================================================================
// Fallback Benchmarks
// ============================================================================

fn bench_outline_for(c: &mut Criterion) {
    let generator = FallbackGenerator::default();
    let mut group = c.benchmark_group("outline_for");

    for content_type in ContentType::ALL {
        group.bench_with_input(
            BenchmarkId::from_parameter(content_type),
            &content_type,
            |b, ct| b.iter(|| generator.outline_for(black_box(Some(*ct)), black_box("A topic"))),
        );
    }

    group.bench_function("generic", |b| {
        b.iter(|| generator.outline_for(None, black_box("How we cut our build times in half")))
    });

    group.finish();
}

fn bench_optimize_for(c: &mut Criterion) {
    let generator = FallbackGenerator::default();
    let mut group = c.benchmark_group("optimize_for");

    for sections in [3, 30, 300] {
        let outline = fixtures::generate_outline(sections);
        group.throughput(Throughput::Bytes(outline.len() as u64));

        for platform in Platform::ALL {
            group.bench_with_input(
                BenchmarkId::new(platform.id(), sections),
                &outline,
                |b, text| {
                    b.iter(|| {
                        generator.optimize_for(black_box(text), platform, Some(ContentType::Info))
                    })
                },
            );
        }
    }

    group.finish();
}

// ============================================================================
// Constraint Benchmarks
// ============================================================================

fn bench_warning_level(c: &mut Criterion) {
    let constraints = PlatformConstraints::builtin();
    let draft = fixtures::generate_outline(10);

    c.bench_function("warning_level", |b| {
        b.iter(|| {
            let count = char_count(black_box(&draft));
            for platform in Platform::ALL {
                black_box(constraints.warning_level(count, platform.id()));
            }
        })
    });

    c.bench_function("warning_level_unknown_platform", |b| {
        b.iter(|| constraints.warning_level(black_box(4000), black_box("mastodon")))
    });
}

criterion_group!(fallback_benches, bench_outline_for, bench_optimize_for,);

criterion_group!(constraint_benches, bench_warning_level,);

criterion_main!(fallback_benches, constraint_benches,);
