use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use graph_explorer::config::WindowConfig;
use graph_explorer::expansion::ExpansionState;
use graph_explorer::explore::{build_exploration_graph, cluster_graph};
use graph_explorer::hierarchy::HierarchyConfig;
use graph_explorer::ir::{GraphData, GraphNode};
use std::hint::black_box;

/// Milestones own `epics` epics, each epic owns `tasks` tasks, and every
/// task depends on the first task of the next epic.
fn roadmap(milestones: usize, epics: usize, tasks: usize) -> GraphData {
    let mut graph = GraphData::new();
    let mut previous_first_task: Option<String> = None;
    for m in 0..milestones {
        let milestone = format!("m{m}");
        graph.push_node(
            GraphNode::new(&milestone, &format!("Milestone {m}")).with_type("milestone"),
        );
        for e in 0..epics {
            let epic = format!("m{m}e{e}");
            graph.push_node(GraphNode::new(&epic, &format!("Epic {e}")).with_type("epic"));
            graph.push_edge(&milestone, &epic);
            for t in 0..tasks {
                let task = format!("{epic}t{t}");
                graph.push_node(
                    GraphNode::new(&task, &format!("Task {t}")).with_labels(["type:task"]),
                );
                graph.push_edge(&epic, &task);
                if let Some(prev) = &previous_first_task {
                    graph.push_edge(&task, prev);
                }
            }
            previous_first_task = Some(format!("{epic}t0"));
        }
    }
    graph
}

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("build_exploration_graph");
    let hierarchy = HierarchyConfig::default();
    let window = WindowConfig::default();
    let state = ExpansionState::default();
    for (milestones, epics, tasks) in [(10usize, 10usize, 10usize), (20, 10, 25), (40, 12, 10)] {
        let graph = roadmap(milestones, epics, tasks);
        let name = format!("{}_nodes", graph.nodes.len());
        group.bench_with_input(BenchmarkId::from_parameter(name), &graph, |b, graph| {
            b.iter(|| {
                let explored =
                    build_exploration_graph(black_box(graph), &hierarchy, &window, &state);
                black_box(explored.nodes.len());
            });
        });
    }
    group.finish();
}

fn bench_toggle(c: &mut Criterion) {
    let mut group = c.benchmark_group("rebuild_after_toggle");
    let hierarchy = HierarchyConfig::default();
    let window = WindowConfig::default();
    let graph = roadmap(20, 10, 25);
    let mut state = ExpansionState::default();
    state.toggle_bucket(0);
    state.toggle_group("m19e9");
    group.bench_with_input(BenchmarkId::from_parameter("expanded"), &state, |b, state| {
        b.iter(|| {
            let explored = build_exploration_graph(&graph, &hierarchy, &window, black_box(state));
            black_box(explored.edges.len());
        });
    });
    group.finish();
}

fn bench_cluster(c: &mut Criterion) {
    let mut group = c.benchmark_group("cluster_graph");
    let hierarchy = HierarchyConfig::default();
    for (milestones, epics, tasks) in [(10usize, 10usize, 10usize), (20, 10, 25)] {
        let graph = roadmap(milestones, epics, tasks);
        let name = format!("{}_nodes", graph.nodes.len());
        group.bench_with_input(BenchmarkId::from_parameter(name), &graph, |b, graph| {
            b.iter(|| {
                let clustered = cluster_graph(black_box(graph), &hierarchy);
                black_box(clustered.clusters.len());
            });
        });
    }
    group.finish();
}

criterion_group!(
    name = benches;
    config = Criterion::default().sample_size(20);
    targets = bench_build, bench_toggle, bench_cluster
);
criterion_main!(benches);
