use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::ir::GraphEdge;

use super::types::{ClusteredGraph, SubgraphCluster};

/// Nearest strictly-more-strategic container for every node that has one.
///
/// For each distinct level, all nodes on lower levels act as BFS sources
/// along `from -> to` edges. The search advances one layer at a time and a
/// newly reached node takes the smallest container id offered by the
/// previous layer, so equidistant containers resolve to the lowest id.
/// Visited nodes are never relabelled, which also bounds the walk on
/// cyclic input.
pub fn assign_owners(
    tier_of: &BTreeMap<String, i32>,
    edges: &[GraphEdge],
) -> BTreeMap<String, String> {
    let mut successors: HashMap<&str, Vec<&str>> = HashMap::new();
    for edge in edges {
        if edge.from == edge.to
            || !tier_of.contains_key(&edge.from)
            || !tier_of.contains_key(&edge.to)
        {
            continue;
        }
        successors
            .entry(edge.from.as_str())
            .or_default()
            .push(edge.to.as_str());
    }

    let levels: BTreeSet<i32> = tier_of.values().copied().collect();
    let mut owners = BTreeMap::new();

    // The most strategic level never has an owner.
    for &target_level in levels.iter().skip(1) {
        let mut claimed: HashMap<&str, &str> = HashMap::new();
        let mut frontier: Vec<&str> = Vec::new();
        for (id, level) in tier_of {
            if *level < target_level {
                claimed.insert(id.as_str(), id.as_str());
                frontier.push(id.as_str());
            }
        }

        while !frontier.is_empty() {
            let mut next: BTreeMap<&str, &str> = BTreeMap::new();
            for &node in &frontier {
                let container = claimed[node];
                let Some(targets) = successors.get(node) else {
                    continue;
                };
                for &target in targets {
                    if claimed.contains_key(target) {
                        continue;
                    }
                    next.entry(target)
                        .and_modify(|current| {
                            if container < *current {
                                *current = container;
                            }
                        })
                        .or_insert(container);
                }
            }
            frontier = next.keys().copied().collect();
            claimed.extend(next);
        }

        for (id, level) in tier_of {
            if *level != target_level {
                continue;
            }
            if let Some(container) = claimed.get(id.as_str()) {
                owners.insert(id.clone(), (*container).to_string());
            }
        }
    }

    owners
}

/// Groups nodes under the root of their ownership chain and classifies
/// every edge against that membership.
///
/// Primary-level nodes always root a cluster. Any other unowned node roots
/// one only when it owns something; the rest are orphans.
///
/// Policy: an unowned secondary or tactical node that owns members is not
/// reachable from the primary tier, yet it still roots its own cluster so
/// its members stay grouped with it. Only unowned nodes that own nothing
/// are orphans.
pub fn build_clusters(
    tier_of: &BTreeMap<String, i32>,
    edges: &[GraphEdge],
    primary_level: Option<i32>,
) -> ClusteredGraph {
    let owners = assign_owners(tier_of, edges);

    let mut root_of: HashMap<&str, &str> = HashMap::new();
    for id in tier_of.keys() {
        root_of.insert(id.as_str(), chain_root(id, &owners));
    }

    let containers: BTreeSet<&str> = owners.values().map(String::as_str).collect();
    let mut clusters: BTreeMap<String, SubgraphCluster> = BTreeMap::new();
    for (id, level) in tier_of {
        if owners.contains_key(id) {
            continue;
        }
        if Some(*level) == primary_level || containers.contains(id.as_str()) {
            clusters.insert(id.clone(), SubgraphCluster::new(id, *level));
        }
    }

    let mut orphan_nodes = BTreeSet::new();
    let mut cluster_of: HashMap<&str, &str> = HashMap::new();
    for id in tier_of.keys() {
        let root = root_of[id.as_str()];
        match clusters.get_mut(root) {
            Some(cluster) => {
                cluster.nodes.insert(id.clone());
                cluster_of.insert(id.as_str(), root);
            }
            None => {
                orphan_nodes.insert(id.clone());
            }
        }
    }

    let mut cross_cluster_edges = Vec::new();
    for edge in edges {
        if !tier_of.contains_key(&edge.from) || !tier_of.contains_key(&edge.to) {
            continue;
        }
        let from = cluster_of.get(edge.from.as_str()).copied();
        let to = cluster_of.get(edge.to.as_str()).copied();
        if let (Some(a), Some(b)) = (from, to) {
            if a == b {
                if let Some(cluster) = clusters.get_mut(a) {
                    cluster.internal_edges.push(edge.clone());
                }
                continue;
            }
        }
        if let Some(cluster) = from.and_then(|id| clusters.get_mut(id)) {
            cluster.outgoing_edges.push(edge.clone());
        }
        if let Some(cluster) = to.and_then(|id| clusters.get_mut(id)) {
            cluster.incoming_edges.push(edge.clone());
        }
        cross_cluster_edges.push(edge.clone());
    }

    ClusteredGraph {
        clusters,
        cross_cluster_edges,
        orphan_nodes,
        owners,
    }
}

// Chains strictly decrease in level, so this always terminates.
fn chain_root<'a>(id: &'a str, owners: &'a BTreeMap<String, String>) -> &'a str {
    let mut current = id;
    while let Some(owner) = owners.get(current) {
        current = owner.as_str();
    }
    current
}
