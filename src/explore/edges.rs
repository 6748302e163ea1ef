use std::collections::BTreeMap;

use crate::ir::GraphEdge;

use super::types::{ExplorationEdge, VirtualEdge, VirtualNode, VirtualNodeMetadata};

#[derive(Debug, Default)]
pub(crate) struct AggregatedEdges {
    pub edges: Vec<ExplorationEdge>,
    pub metadata: BTreeMap<String, VirtualNodeMetadata>,
    /// Originals dropped because both endpoints landed on the same node.
    pub collapsed: usize,
}

/// Rewrites hidden endpoints onto the virtual node they folded into, then
/// groups by the rewritten pair. Singletons stay plain edges; larger groups
/// become one bundled edge that remembers its originals.
pub(crate) fn aggregate_edges(
    edges: &[GraphEdge],
    folded_into: &BTreeMap<String, String>,
    virtual_nodes: &[VirtualNode],
) -> AggregatedEdges {
    let resolve = |id: &str| -> String {
        folded_into
            .get(id)
            .cloned()
            .unwrap_or_else(|| id.to_string())
    };

    let mut collapsed = 0;
    let mut grouped: BTreeMap<(String, String), Vec<String>> = BTreeMap::new();
    for edge in edges {
        let from = resolve(&edge.from);
        let to = resolve(&edge.to);
        if from == to {
            collapsed += 1;
            continue;
        }
        grouped.entry((from, to)).or_default().push(edge.source_id());
    }

    let mut metadata: BTreeMap<String, VirtualNodeMetadata> = virtual_nodes
        .iter()
        .map(|node| {
            (
                node.id.clone(),
                VirtualNodeMetadata {
                    virtual_node_id: node.id.clone(),
                    ..Default::default()
                },
            )
        })
        .collect();

    let mut out = Vec::with_capacity(grouped.len());
    for ((from, to), source_edge_ids) in grouped {
        let count = source_edge_ids.len();
        if let Some(meta) = metadata.get_mut(&from) {
            meta.outbound_edge_count += count;
            meta.outbound_to.insert(to.clone());
        }
        if let Some(meta) = metadata.get_mut(&to) {
            meta.inbound_edge_count += count;
            meta.inbound_from.insert(from.clone());
        }
        if count == 1 {
            out.push(ExplorationEdge::Real(GraphEdge { from, to }));
        } else {
            out.push(ExplorationEdge::Virtual(VirtualEdge {
                from,
                to,
                count,
                source_edge_ids,
            }));
        }
    }

    AggregatedEdges {
        edges: out,
        metadata,
        collapsed,
    }
}
