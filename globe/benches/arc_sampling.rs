use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use geo_types::Coord;
use globe::centroid::CentroidResolver;
use globe::geometry::{arc_height, ring_centroid, slerp, to_cartesian};
use globe::BoundarySet;
use shared::GeoPoint;

const BOUNDARY_FIXTURE: &str = include_str!("../data/boundary_fixture.json");

fn benchmark_arc_sampling(c: &mut Criterion) {
    let from = GeoPoint::new(35.0, 100.0);
    let to = GeoPoint::new(51.0, 10.5);

    let mut group = c.benchmark_group("arc_sampling");
    for samples in [80usize, 120, 200] {
        group.bench_with_input(BenchmarkId::from_parameter(samples), &samples, |b, &n| {
            b.iter(|| {
                (0..=n)
                    .map(|i| {
                        let t = i as f64 / n as f64;
                        let point = slerp(black_box(from), black_box(to), t);
                        to_cartesian(point, arc_height(t, 0.32))
                    })
                    .collect::<Vec<_>>()
            });
        });
    }
    group.finish();
}

fn benchmark_ring_centroid(c: &mut Criterion) {
    // Synthetic circular ring, roughly the vertex count of a detailed
    // country outline.
    let ring: Vec<Coord> = (0..512)
        .map(|i| {
            let angle = i as f64 / 512.0 * std::f64::consts::TAU;
            Coord {
                x: 10.0 + 5.0 * angle.cos(),
                y: 45.0 + 5.0 * angle.sin(),
            }
        })
        .collect();

    c.bench_function("ring_centroid_512", |b| {
        b.iter(|| ring_centroid(black_box(&ring)));
    });
}

fn benchmark_centroid_resolution(c: &mut Criterion) {
    let boundaries = BoundarySet::from_json(BOUNDARY_FIXTURE).expect("fixture");

    c.bench_function("resolve_cold", |b| {
        b.iter(|| {
            let mut resolver = CentroidResolver::new();
            resolver.resolve(black_box("France"), &boundaries)
        });
    });

    c.bench_function("resolve_cached", |b| {
        let mut resolver = CentroidResolver::new();
        resolver.resolve("France", &boundaries);
        b.iter(|| resolver.resolve(black_box("France"), &boundaries));
    });
}

criterion_group!(
    benches,
    benchmark_arc_sampling,
    benchmark_ring_centroid,
    benchmark_centroid_resolution
);
criterion_main!(benches);
