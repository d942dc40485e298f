use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use ordo_core::config::{EngineConfig, RepairConfig};
use ordo_core::graph::DependencyGraph;
use ordo_core::model::{ActionSpec, EdgeKind, ScoreMap};
use ordo_core::schedule::select_actions;

const TIERS: [(&str, usize); 3] = [("small", 100), ("medium", 1_000), ("large", 5_000)];

/// Layered synthetic plan: each action depends on up to three actions from
/// the previous layer, plus one back edge per layer to exercise repair.
fn synthetic_plan(count: usize) -> (Vec<ActionSpec>, ScoreMap) {
    const WIDTH: usize = 25;
    let categories = ["debt", "savings", "growth", "protection", "planning"];

    let mut actions = Vec::with_capacity(count);
    let mut scores = ScoreMap::with_capacity(count);
    for i in 0..count {
        let layer = i / WIDTH;
        let id = format!("a{i}");
        #[allow(clippy::cast_precision_loss)]
        let effort = (i % 7) as f64 + 0.5;
        let mut spec = ActionSpec::new(id.clone(), effort, categories[i % categories.len()]);
        if layer > 0 {
            let base = (layer - 1) * WIDTH;
            for offset in [i % WIDTH, (i * 7) % WIDTH, (i * 13) % WIDTH] {
                spec = spec.depends_on(format!("a{}", base + offset), EdgeKind::Hard);
            }
        }
        if i % WIDTH == 0 && i + WIDTH < count {
            spec = spec.depends_on(format!("a{}", i + WIDTH), EdgeKind::Soft);
        }
        #[allow(clippy::cast_precision_loss)]
        scores.insert(id, ((i * 37) % 101) as f64);
        actions.push(spec);
    }
    (actions, scores)
}

fn bench_ordering(c: &mut Criterion) {
    let mut group = c.benchmark_group("ordering");
    let config = EngineConfig::default();

    for (name, count) in TIERS {
        let (actions, scores) = synthetic_plan(count);
        group.throughput(Throughput::Elements(count as u64));

        group.bench_with_input(BenchmarkId::new("build", name), &actions, |b, actions| {
            b.iter(|| {
                black_box(
                    DependencyGraph::from_actions(actions, &scores, &RepairConfig::default())
                        .map(|graph| graph.node_count()),
                )
            });
        });

        let Ok(graph) = DependencyGraph::from_actions(&actions, &scores, &config.repair) else {
            continue;
        };

        group.bench_with_input(BenchmarkId::new("sequence", name), &graph, |b, graph| {
            b.iter(|| black_box(graph.parallel_groups().len()));
        });

        group.bench_with_input(BenchmarkId::new("select", name), &graph, |b, graph| {
            b.iter(|| black_box(select_actions(graph, &config.selector).len()));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_ordering);
criterion_main!(benches);
