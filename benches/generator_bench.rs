//! Benchmarks comparing feature-set levels across node types

use coherent_noise::prelude::*;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

const GRID: usize = 256;

/// Build `name` at `level`, filling every slot with a Simplex chain
fn build(name: &str, level: FeatureSet) -> NodeHandle {
    let mut node = create_node(name, level).unwrap();
    let metadata = node.metadata();
    for slot in &metadata.sources {
        let child = if slot.requires.contains(Capabilities::DOMAIN_WARP) {
            build("DomainWarpSimplex", level)
        } else {
            create_node("Simplex", level).unwrap()
        };
        node.set_source(slot.name, child).unwrap();
    }
    node
}

/// Generate scattered 3D positions
fn generate_positions(n: usize) -> [Vec<f32>; 3] {
    [
        (0..n).map(|i| (i as f32 * 0.37).sin() * 400.0).collect(),
        (0..n).map(|i| (i as f32 * 0.11).cos() * 400.0).collect(),
        (0..n).map(|i| i as f32 * 0.05).collect(),
    ]
}

fn bench_uniform_grid_2d(c: &mut Criterion) {
    let mut group = c.benchmark_group("uniform_grid_2d");
    group.throughput(Throughput::Elements((GRID * GRID) as u64));

    for name in ["Simplex", "SimplexSmooth", "DomainWarpSimplex", "FractalFBm"] {
        for level in FeatureSet::available() {
            let graph = NodeGraph::new(build(name, level)).unwrap();
            let mut out = vec![0.0f32; GRID * GRID];
            group.bench_with_input(BenchmarkId::new(name, level), &graph, |b, graph| {
                b.iter(|| {
                    black_box(graph.gen_uniform_grid_2d(
                        &mut out,
                        [0, 0],
                        [GRID, GRID],
                        0.02,
                        1337,
                    ))
                });
            });
        }
    }

    group.finish();
}

fn bench_position_array_3d(c: &mut Criterion) {
    let mut group = c.benchmark_group("position_array_3d");
    let positions = generate_positions(10_000);
    group.throughput(Throughput::Elements(positions[0].len() as u64));

    for name in ["Simplex", "DomainWarpFractalProgressive"] {
        for level in FeatureSet::available() {
            let graph = NodeGraph::new(build(name, level)).unwrap();
            let mut out = vec![0.0f32; positions[0].len()];
            group.bench_with_input(BenchmarkId::new(name, level), &graph, |b, graph| {
                b.iter(|| {
                    black_box(graph.gen_position_array_3d(
                        &mut out,
                        &positions[0],
                        &positions[1],
                        &positions[2],
                        [0.0; 3],
                        1337,
                    ))
                });
            });
        }
    }

    group.finish();
}

#[cfg(feature = "parallel")]
fn bench_parallel_grid(c: &mut Criterion) {
    let mut group = c.benchmark_group("uniform_grid_2d_par");
    let level = FeatureSet::best_available();
    let graph = NodeGraph::new(build("FractalFBm", level)).unwrap();
    let mut out = vec![0.0f32; 1024 * 1024];
    group.throughput(Throughput::Elements(out.len() as u64));
    group.bench_function(BenchmarkId::new("FractalFBm", level), |b| {
        b.iter(|| {
            black_box(graph.gen_uniform_grid_2d_par(&mut out, [0, 0], [1024, 1024], 0.01, 7))
        });
    });
    group.finish();
}

#[cfg(not(feature = "parallel"))]
criterion_group!(benches, bench_uniform_grid_2d, bench_position_array_3d);

#[cfg(feature = "parallel")]
criterion_group!(
    benches,
    bench_uniform_grid_2d,
    bench_position_array_3d,
    bench_parallel_grid
);
criterion_main!(benches);
