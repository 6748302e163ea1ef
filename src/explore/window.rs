use std::collections::{BTreeMap, HashMap, HashSet};

use crate::config::WindowConfig;
use crate::expansion::ExpansionState;
use crate::hierarchy::{ResolvedHierarchy, TierBand};
use crate::ir::GraphNode;

use super::types::{
    ClusteredGraph, HiddenCounts, MORE_NODE_SCOPE, UNTYPED, VirtualKind, VirtualNode,
};

pub(crate) struct WindowInput<'a> {
    /// Deduplicated nodes in stable (input) order.
    pub nodes: &'a [&'a GraphNode],
    pub tier_of: &'a BTreeMap<String, i32>,
    pub hierarchy: &'a ResolvedHierarchy,
    pub clustered: &'a ClusteredGraph,
}

#[derive(Debug, Default)]
pub(crate) struct Windowed {
    /// Hidden real node id -> id of the virtual node it folded into.
    pub folded_into: BTreeMap<String, String>,
    pub virtual_nodes: Vec<VirtualNode>,
    /// Real and already generated ids a new virtual id must not reuse.
    taken: HashSet<String>,
}

impl Windowed {
    fn is_folded(&self, id: &str) -> bool {
        self.folded_into.contains_key(id)
    }

    /// Virtual ids share the namespace of upstream ids. A generated id that
    /// is already taken gets the first free `~N` suffix.
    fn claim_id(&mut self, base: String) -> String {
        let mut id = base.clone();
        let mut suffix = 1;
        while self.taken.contains(&id) {
            id = format!("{base}~{suffix}");
            suffix += 1;
        }
        self.taken.insert(id.clone());
        id
    }

    fn fold(&mut self, members: &[&str], mut virtual_node: VirtualNode) {
        virtual_node.id = self.claim_id(virtual_node.id);
        for member in members {
            self.folded_into
                .insert((*member).to_string(), virtual_node.id.clone());
        }
        self.virtual_nodes.push(virtual_node);
    }
}

struct NodeFacts<'a> {
    node: &'a GraphNode,
    position: usize,
    band: TierBand,
    type_key: String,
}

pub(crate) fn apply_window(
    input: &WindowInput<'_>,
    window: &WindowConfig,
    expansion: &ExpansionState,
) -> Windowed {
    let mut windowed = Windowed::default();
    if input.hierarchy.is_flat() {
        return windowed;
    }
    windowed.taken = input.nodes.iter().map(|node| node.id.clone()).collect();

    let mut facts: HashMap<&str, NodeFacts<'_>> = HashMap::new();
    for (position, node) in input.nodes.iter().enumerate() {
        let level = input
            .tier_of
            .get(&node.id)
            .copied()
            .unwrap_or_else(|| input.hierarchy.implicit_level());
        facts.insert(
            node.id.as_str(),
            NodeFacts {
                node: *node,
                position,
                band: input.hierarchy.band(level),
                type_key: node.type_name().unwrap_or_else(|| UNTYPED.to_string()),
            },
        );
    }

    let mut children: HashMap<&str, Vec<&str>> = HashMap::new();
    for (member, owner) in &input.clustered.owners {
        if facts.contains_key(member.as_str()) && facts.contains_key(owner.as_str()) {
            children
                .entry(owner.as_str())
                .or_default()
                .push(member.as_str());
        }
    }
    for list in children.values_mut() {
        list.sort_by_key(|id| facts[id].position);
    }

    let counts_of = |members: &[&str]| {
        let mut counts = HiddenCounts::default();
        for id in members {
            let fact = &facts[id];
            counts.record(fact.band, &fact.type_key);
        }
        counts
    };

    // Primary tier: the most recent nodes stay visible, the older prefix
    // collapses into buckets keyed by their start index.
    let primaries: Vec<&str> = input
        .nodes
        .iter()
        .map(|node| node.id.as_str())
        .filter(|id| facts[id].band == TierBand::Primary)
        .collect();
    let hidden_primaries = primaries
        .len()
        .saturating_sub(window.visible_primary_tier_count);
    for (start, end) in bucket_ranges(hidden_primaries, window.bucket_size()) {
        if expansion.is_bucket_expanded(start) {
            continue;
        }
        let mut members = Vec::new();
        for id in &primaries[start..=end] {
            collect_subtree(id, &children, &mut members);
        }
        let counts = counts_of(&members);
        let node = VirtualNode {
            id: format!("bucket:{start}-{end}"),
            label: format!("{}-{} (+{} hidden)", start, end, counts.total),
            kind: VirtualKind::CollapsedPrimaryBucket {
                range: [start, end],
                counts,
            },
        };
        windowed.fold(&members, node);
    }

    // Secondary tier: per visible primary, the first `budget` owned
    // secondaries stay, the rest collapse one group each unless expanded.
    for primary in &primaries {
        if windowed.is_folded(primary) {
            continue;
        }
        let Some(owned) = children.get(primary) else {
            continue;
        };
        let secondaries = owned
            .iter()
            .filter(|id| facts[*id].band == TierBand::Secondary);
        for (idx, secondary) in secondaries.enumerate() {
            if idx < window.secondary_tier_budget || expansion.is_group_expanded(secondary) {
                continue;
            }
            let mut members = Vec::new();
            collect_subtree(secondary, &children, &mut members);
            let counts = counts_of(&members);
            let node = VirtualNode {
                id: format!("group:{secondary}"),
                label: format!("{} (+{} hidden)", facts[secondary].node.label, counts.total),
                kind: VirtualKind::CollapsedSecondaryGroup {
                    secondary_id: (*secondary).to_string(),
                    counts,
                },
            };
            windowed.fold(&members, node);
        }
    }

    // Tactical tier: every visible anchor keeps its first `budget` tactical
    // descendants and folds the overflow into a single more-node.
    for node in input.nodes {
        let id = node.id.as_str();
        if windowed.is_folded(id) {
            continue;
        }
        let anchor = facts[id].band != TierBand::Tactical
            || !input.clustered.owners.contains_key(id);
        if !anchor {
            continue;
        }
        let mut descendants = Vec::new();
        collect_tactical(id, &children, &facts, &mut descendants);
        if descendants.len() <= window.tactical_budget {
            continue;
        }
        descendants.sort_by_key(|member| facts[member].position);
        let overflow = &descendants[window.tactical_budget..];
        let counts = counts_of(overflow);
        let more = VirtualNode {
            id: format!("more:{id}"),
            label: format!("+{} more {}", counts.total, MORE_NODE_SCOPE),
            kind: VirtualKind::MoreNode {
                scope: MORE_NODE_SCOPE.to_string(),
                count: counts.total,
                parent_id: id.to_string(),
                counts,
            },
        };
        windowed.fold(overflow, more);
    }

    windowed
}

/// Inclusive `(start, end)` ranges over the hidden primary prefix.
///
/// With a bucket size the chunks are fixed, so two adjacent collapsed
/// chunks stay separate buckets instead of merging into one maximal run.
/// This keeps every bucket key independent of the expansion state.
fn bucket_ranges(hidden: usize, bucket_size: Option<usize>) -> Vec<(usize, usize)> {
    if hidden == 0 {
        return Vec::new();
    }
    match bucket_size {
        None => vec![(0, hidden - 1)],
        Some(size) => (0..hidden)
            .step_by(size)
            .map(|start| (start, (start + size).min(hidden) - 1))
            .collect(),
    }
}

fn collect_subtree<'a>(
    root: &'a str,
    children: &HashMap<&'a str, Vec<&'a str>>,
    out: &mut Vec<&'a str>,
) {
    let mut stack = vec![root];
    while let Some(id) = stack.pop() {
        out.push(id);
        if let Some(owned) = children.get(id) {
            stack.extend(owned.iter().rev());
        }
    }
}

fn collect_tactical<'a>(
    anchor: &'a str,
    children: &HashMap<&'a str, Vec<&'a str>>,
    facts: &HashMap<&'a str, NodeFacts<'_>>,
    out: &mut Vec<&'a str>,
) {
    let mut stack = vec![anchor];
    while let Some(id) = stack.pop() {
        let Some(owned) = children.get(id) else {
            continue;
        };
        for &child in owned.iter().rev() {
            if facts[child].band == TierBand::Tactical {
                out.push(child);
                stack.push(child);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_bucket_covers_hidden_prefix() {
        assert_eq!(bucket_ranges(0, None), vec![]);
        assert_eq!(bucket_ranges(3, None), vec![(0, 2)]);
    }

    #[test]
    fn fixed_stride_buckets() {
        assert_eq!(bucket_ranges(7, Some(3)), vec![(0, 2), (3, 5), (6, 6)]);
        assert_eq!(bucket_ranges(2, Some(5)), vec![(0, 1)]);
    }

    #[test]
    fn subtree_walk_is_preorder_by_child_order() {
        let mut children: HashMap<&str, Vec<&str>> = HashMap::new();
        children.insert("m", vec!["e1", "e2"]);
        children.insert("e1", vec!["t1"]);
        let mut out = Vec::new();
        collect_subtree("m", &children, &mut out);
        assert_eq!(out, vec!["m", "e1", "t1", "e2"]);
    }
}
