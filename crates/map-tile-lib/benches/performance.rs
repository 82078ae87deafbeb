//! Performance benchmarks for map-tile-lib
//!
//! Run with: cargo bench --package map-tile-lib

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use map_tile_lib::{
    Config, Coordinate, DouglasPeuckerFilter, ElementInfo, FeatureCollection, FilterConfig,
    MapBuilder, MapLine, MapPoint, MapSplitter, SplitLimits,
};
use std::sync::Arc;

/// A wiggly track of `num_points` coordinates starting at the given position
fn generate_track(num_points: usize, base_lat: f64, base_lon: f64) -> MapLine {
    let points = (0..num_points)
        .map(|i| {
            let t = i as f64 / num_points as f64;
            let lat = base_lat + t * 0.1 + (t * 50.0).sin() * 0.001;
            let lon = base_lon + t * 0.1 + (t * 30.0).cos() * 0.001;
            Arc::new(Coordinate::from_degrees(lat, lon))
        })
        .collect();
    MapLine::new(ElementInfo::new(0x06), points)
}

/// Tracks and points spread over a grid of 0.1° cells
fn generate_collection(num_tracks: usize, points_per_track: usize) -> FeatureCollection {
    let mut collection = FeatureCollection::new();
    for i in 0..num_tracks {
        let lat = 51.5 + (i % 10) as f64 * 0.1;
        let lon = -0.1 + (i / 10) as f64 * 0.1;
        collection
            .add_line(generate_track(points_per_track, lat, lon))
            .unwrap();
        collection.add_point(MapPoint::new(
            ElementInfo::new(0x2f00),
            Arc::new(Coordinate::from_degrees(lat, lon)),
        ));
    }
    collection
}

// ============================================================================
// Core Benchmarks - Key performance indicators
// ============================================================================

fn bench_simplify(c: &mut Criterion) {
    let mut group = c.benchmark_group("simplify");

    let line = Arc::new(generate_track(50_000, 51.5, -0.1));
    group.throughput(Throughput::Elements(50_000));
    for resolution in [22u8, 18, 14] {
        let filter = DouglasPeuckerFilter::new(2.6, FilterConfig::new(resolution).unwrap());
        group.bench_with_input(
            BenchmarkId::new("track_50k", resolution),
            &filter,
            |b, filter| b.iter(|| filter.filter(&line)),
        );
    }

    group.finish();
}

fn bench_split(c: &mut Criterion) {
    let mut group = c.benchmark_group("split");
    group.sample_size(20);

    let collection = generate_collection(100, 1_000);
    let bounds = collection.bounds().unwrap();
    let splitter = MapSplitter::new(SplitLimits {
        max_feature_count: 20,
        ..SplitLimits::default()
    })
    .unwrap();

    group.throughput(Throughput::Elements(100 * 1_000));
    group.bench_function("100_tracks_1k_each", |b| {
        b.iter(|| splitter.split(collection.area_for_resolution(bounds, 24)));
    });

    group.finish();
}

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("build");
    group.sample_size(10);

    let collection = generate_collection(50, 1_000);
    let builder = MapBuilder::new(Config::default()).unwrap();

    group.throughput(Throughput::Elements(50 * 1_000));
    group.bench_function("default_levels_50x1k", |b| {
        b.iter(|| builder.build(&collection).unwrap());
    });

    group.finish();
}

// ============================================================================
// Criterion Configuration
// ============================================================================

criterion_group!(benches, bench_simplify, bench_split, bench_build);

criterion_main!(benches);
