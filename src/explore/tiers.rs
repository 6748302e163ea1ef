use std::collections::BTreeMap;

use crate::hierarchy::ResolvedHierarchy;
use crate::ir::GraphNode;

use super::types::UnknownType;

/// Assigns every node its hierarchy level. Nodes with a missing or
/// unconfigured type land on the implicit level below all configured ones.
pub fn partition_tiers(
    nodes: &[&GraphNode],
    hierarchy: &ResolvedHierarchy,
) -> BTreeMap<String, i32> {
    nodes
        .iter()
        .map(|node| {
            let type_name = node.type_name();
            (node.id.clone(), hierarchy.level_of(type_name.as_deref()))
        })
        .collect()
}

/// Types present on nodes but absent from the hierarchy, with a close
/// configured name when one exists.
pub(crate) fn unknown_types(
    nodes: &[&GraphNode],
    hierarchy: &ResolvedHierarchy,
) -> Vec<UnknownType> {
    if hierarchy.is_flat() {
        return Vec::new();
    }
    let mut seen: BTreeMap<String, usize> = BTreeMap::new();
    for node in nodes {
        if let Some(type_name) = node.type_name() {
            if !hierarchy.contains_type(&type_name) {
                *seen.entry(type_name).or_insert(0) += 1;
            }
        }
    }
    seen.into_iter()
        .map(|(type_name, node_count)| UnknownType {
            suggestion: hierarchy.suggest_type(&type_name),
            type_name,
            node_count,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hierarchy::HierarchyConfig;

    #[test]
    fn assigns_configured_and_implicit_levels() {
        let hierarchy = HierarchyConfig::default().resolve().unwrap();
        let nodes = [
            GraphNode::new("m", "M").with_type("milestone"),
            GraphNode::new("e", "E").with_labels(["type:epic"]),
            GraphNode::new("x", "X"),
            GraphNode::new("s", "S").with_type("spike"),
        ];
        let refs: Vec<&GraphNode> = nodes.iter().collect();
        let tier_of = partition_tiers(&refs, &hierarchy);
        assert_eq!(tier_of["m"], 1);
        assert_eq!(tier_of["e"], 2);
        assert_eq!(tier_of["x"], 5);
        assert_eq!(tier_of["s"], 5);
    }

    #[test]
    fn reports_unknown_types_with_suggestions() {
        let hierarchy = HierarchyConfig::default().resolve().unwrap();
        let nodes = [
            GraphNode::new("a", "A").with_type("taks"),
            GraphNode::new("b", "B").with_type("taks"),
            GraphNode::new("c", "C").with_type("research"),
            GraphNode::new("d", "D"),
        ];
        let refs: Vec<&GraphNode> = nodes.iter().collect();
        let unknown = unknown_types(&refs, &hierarchy);
        assert_eq!(unknown.len(), 2);
        assert_eq!(unknown[0].type_name, "research");
        assert_eq!(unknown[0].suggestion, None);
        assert_eq!(unknown[1].type_name, "taks");
        assert_eq!(unknown[1].node_count, 2);
        assert_eq!(unknown[1].suggestion.as_deref(), Some("task"));
    }
}
