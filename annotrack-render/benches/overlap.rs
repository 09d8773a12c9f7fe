use annotrack_core::TileId;
use annotrack_render::{ActiveLabel, ActiveLabelSet, Aabb2};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

/// Labels on two strand rows, spaced so that neighbours partly overlap.
fn generate_labels(count: usize) -> ActiveLabelSet {
    (0..count)
        .map(|i| {
            let x = i as f64 * 17.0;
            let y = if i % 2 == 0 { 5.0 } else { 38.0 };
            ActiveLabel {
                tile: TileId::new(8, (i / 64) as u64),
                name: format!("GENE{}", i),
                importance: ((i * 7919) % 1000) as f64,
                bounds: Aabb2::from_rect(x, y, 36.0, 10.0),
            }
        })
        .collect()
}

fn bench_resolve(c: &mut Criterion) {
    let mut group = c.benchmark_group("hide_overlaps");
    for count in [100usize, 1_000, 10_000] {
        let labels = generate_labels(count);
        group.bench_with_input(BenchmarkId::from_parameter(count), &labels, |b, labels| {
            b.iter(|| black_box(labels.clone().resolve()))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_resolve);
criterion_main!(benches);
