//! Exploration-graph engine.
//!
//! Turns a full dependency graph into a smaller graph of real and virtual
//! nodes: tiers are assigned from the type hierarchy, nodes are grouped
//! under their nearest container, per-tier budgets decide what stays
//! visible, and edges touching hidden nodes are rewritten and bundled.
//! Every build is a pure function of its inputs.

mod cluster;
mod edges;
mod tiers;
pub(crate) mod types;
mod window;

pub use cluster::{assign_owners, build_clusters};
pub use tiers::partition_tiers;
pub use types::*;

use std::collections::HashSet;

use tracing::{debug, warn};

use crate::config::{Config, WindowConfig};
use crate::expansion::ExpansionState;
use crate::hierarchy::{HierarchyConfig, ResolvedHierarchy};
use crate::ir::{GraphData, GraphEdge, GraphNode};

use edges::aggregate_edges;
use window::{WindowInput, apply_window};

/// Validated view of one graph snapshot: first occurrence of each node id
/// in input order, and only edges whose endpoints both exist.
struct Snapshot<'a> {
    nodes: Vec<&'a GraphNode>,
    edges: Vec<GraphEdge>,
}

fn snapshot<'a>(graph: &'a GraphData, diagnostics: &mut BuildDiagnostics) -> Snapshot<'a> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut nodes = Vec::with_capacity(graph.nodes.len());
    for node in &graph.nodes {
        if seen.insert(node.id.as_str()) {
            nodes.push(node);
        } else {
            debug!(node = %node.id, "skipping duplicate node id");
            diagnostics.duplicate_nodes += 1;
        }
    }

    let mut edges = Vec::with_capacity(graph.edges.len());
    for edge in &graph.edges {
        if !seen.contains(edge.from.as_str()) || !seen.contains(edge.to.as_str()) {
            debug!(from = %edge.from, to = %edge.to, "skipping dangling edge");
            diagnostics.dangling_edges += 1;
            continue;
        }
        if edge.from == edge.to {
            diagnostics.self_loops += 1;
            continue;
        }
        edges.push(edge.clone());
    }

    Snapshot { nodes, edges }
}

fn resolve_hierarchy(
    hierarchy: &HierarchyConfig,
    diagnostics: &mut BuildDiagnostics,
) -> ResolvedHierarchy {
    match hierarchy.resolve() {
        Ok(resolved) => resolved,
        Err(err) => {
            warn!(error = %err, "invalid type hierarchy, rendering a flat graph");
            diagnostics.config_fallback = Some(err.to_string());
            ResolvedHierarchy::flat()
        }
    }
}

/// Assigns tiers and groups the graph into clusters without windowing.
pub fn cluster_graph(graph: &GraphData, hierarchy: &HierarchyConfig) -> ClusteredGraph {
    let mut diagnostics = BuildDiagnostics::default();
    let resolved = resolve_hierarchy(hierarchy, &mut diagnostics);
    let snapshot = snapshot(graph, &mut diagnostics);
    let tier_of = partition_tiers(&snapshot.nodes, &resolved);
    build_clusters(&tier_of, &snapshot.edges, resolved.levels().first().copied())
}

/// Builds the exploration graph for one snapshot of the inputs.
///
/// Never fails: hierarchy errors fall back to a flat single-tier graph and
/// inconsistent input is skipped and counted in the diagnostics.
pub fn build_exploration_graph(
    graph: &GraphData,
    hierarchy: &HierarchyConfig,
    window: &WindowConfig,
    expansion: &ExpansionState,
) -> ExplorationGraph {
    let mut diagnostics = BuildDiagnostics::default();
    let resolved = resolve_hierarchy(hierarchy, &mut diagnostics);
    let snapshot = snapshot(graph, &mut diagnostics);

    let tier_of = partition_tiers(&snapshot.nodes, &resolved);
    diagnostics.unknown_types = tiers::unknown_types(&snapshot.nodes, &resolved);
    for unknown in &diagnostics.unknown_types {
        match &unknown.suggestion {
            Some(suggestion) => warn!(
                type_name = %unknown.type_name,
                nodes = unknown.node_count,
                "unknown issue type, did you mean '{suggestion}'?"
            ),
            None => warn!(
                type_name = %unknown.type_name,
                nodes = unknown.node_count,
                "unknown issue type, treating as tactical"
            ),
        }
    }

    let clustered = build_clusters(&tier_of, &snapshot.edges, resolved.levels().first().copied());
    let windowed = apply_window(
        &WindowInput {
            nodes: &snapshot.nodes,
            tier_of: &tier_of,
            hierarchy: &resolved,
            clustered: &clustered,
        },
        window,
        expansion,
    );
    let aggregated = aggregate_edges(
        &snapshot.edges,
        &windowed.folded_into,
        &windowed.virtual_nodes,
    );
    diagnostics.collapsed_edges = aggregated.collapsed;

    let mut nodes: Vec<ExplorationNode> = snapshot
        .nodes
        .iter()
        .filter(|node| !windowed.folded_into.contains_key(&node.id))
        .map(|node| ExplorationNode::Real((*node).clone()))
        .collect();
    let visible = nodes.len();
    nodes.extend(windowed.virtual_nodes.into_iter().map(ExplorationNode::Virtual));

    debug!(
        input_nodes = snapshot.nodes.len(),
        visible,
        virtual_nodes = nodes.len() - visible,
        clusters = clustered.clusters.len(),
        edges = aggregated.edges.len(),
        "built exploration graph"
    );

    ExplorationGraph {
        nodes,
        edges: aggregated.edges,
        virtual_node_metadata: aggregated.metadata,
        diagnostics,
    }
}

/// Convenience wrapper taking a loaded [`Config`].
pub fn explore(graph: &GraphData, config: &Config, expansion: &ExpansionState) -> ExplorationGraph {
    build_exploration_graph(graph, &config.hierarchy, &config.window, expansion)
}
