use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use city_street_generator::{
    AnalyticEnvironment, CityGenerator, GeneratorConfig, GrowthOptions, PopulationDensity,
    QuadTree,
};
use glam::Vec2;
use std::hint::black_box;

fn build_points(count: usize) -> Vec<Vec2> {
    (0..count)
        .map(|i| {
            let x = ((i * 37) % 1000) as f32 + (i / 1000) as f32 * 0.001;
            let y = ((i * 53) % 1000) as f32 + (i % 1000) as f32 * 0.001;
            Vec2::new(x - 500.0, y - 500.0)
        })
        .collect()
}

fn build_tree(points: &[Vec2]) -> QuadTree<Vec2> {
    let mut tree = QuadTree::new(Vec2::splat(-500.0), Vec2::splat(500.0));
    for &point in points {
        tree = tree.insert(point);
    }
    tree
}

fn bench_quadtree(c: &mut Criterion) {
    let mut group = c.benchmark_group("quadtree");

    for &count in &[10_000usize, 100_000usize] {
        let points = build_points(count);

        group.bench_with_input(BenchmarkId::new("insert_batch", count), &points, |b, points| {
            b.iter(|| {
                let tree = build_tree(black_box(points));
                black_box(tree.len())
            })
        });

        let tree = build_tree(&points);
        let queries = build_points(1024);
        group.bench_with_input(BenchmarkId::new("neighbor_batch", count), &tree, |b, tree| {
            b.iter(|| {
                let mut hits = 0usize;
                for query in &queries {
                    hits += tree
                        .neighbors(black_box(query.x), black_box(query.y), 50.0)
                        .expect("Abfrage erwartet")
                        .len();
                }
                black_box(hits)
            })
        });
    }

    group.finish();
}

fn bench_generation(c: &mut Criterion) {
    let mut group = c.benchmark_group("generation");
    group.sample_size(20);

    for &target in &[4u32, 6u32] {
        group.bench_with_input(BenchmarkId::new("produce", target), &target, |b, &target| {
            b.iter(|| {
                let config = GeneratorConfig {
                    axiom_position: Vec2::new(400.0, 0.0),
                    target_generations: target,
                    options: GrowthOptions::default(),
                };
                let env = AnalyticEnvironment::new(PopulationDensity::default());
                let mut generator =
                    CityGenerator::new(config, Box::new(env)).expect("Generator erwartet");
                generator.produce().expect("Produktion erwartet");
                black_box(generator.graph().node_count())
            })
        });
    }

    group.finish();
}

criterion_group!(core_benches, bench_quadtree, bench_generation);
criterion_main!(core_benches);
