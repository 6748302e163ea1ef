use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::hierarchy::TierBand;
use crate::ir::{GraphEdge, GraphNode};

pub const MORE_NODE_SCOPE: &str = "tasks";
pub const UNTYPED: &str = "untyped";

/// Real nodes folded into one virtual node, broken down by tier.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HiddenCounts {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secondary: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tactical: Option<BTreeMap<String, usize>>,
    pub total: usize,
}

impl HiddenCounts {
    pub(crate) fn record(&mut self, band: TierBand, type_name: &str) {
        match band {
            TierBand::Primary => *self.primary.get_or_insert(0) += 1,
            TierBand::Secondary => *self.secondary.get_or_insert(0) += 1,
            TierBand::Tactical => {
                *self
                    .tactical
                    .get_or_insert_with(BTreeMap::new)
                    .entry(type_name.to_string())
                    .or_insert(0) += 1
            }
        }
        self.total += 1;
    }

    /// Sum of the per-tier components; equals `total` for every count the
    /// engine produces.
    pub fn component_sum(&self) -> usize {
        self.primary.unwrap_or(0)
            + self.secondary.unwrap_or(0)
            + self
                .tactical
                .as_ref()
                .map(|by_type| by_type.values().sum::<usize>())
                .unwrap_or(0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "virtualType", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum VirtualKind {
    /// Contiguous run of hidden primary nodes, `range` is inclusive.
    CollapsedPrimaryBucket {
        range: [usize; 2],
        counts: HiddenCounts,
    },
    /// One hidden secondary container and its subtree.
    CollapsedSecondaryGroup {
        secondary_id: String,
        counts: HiddenCounts,
    },
    /// Tactical overflow below one parent. Not individually expandable.
    MoreNode {
        scope: String,
        count: usize,
        parent_id: String,
        counts: HiddenCounts,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VirtualNode {
    pub id: String,
    pub label: String,
    #[serde(flatten)]
    pub kind: VirtualKind,
}

impl VirtualNode {
    pub fn counts(&self) -> &HiddenCounts {
        match &self.kind {
            VirtualKind::CollapsedPrimaryBucket { counts, .. }
            | VirtualKind::CollapsedSecondaryGroup { counts, .. }
            | VirtualKind::MoreNode { counts, .. } => counts,
        }
    }

    /// Number shown on the "+N hidden" badge.
    pub fn hidden_node_count(&self) -> usize {
        self.counts().total
    }

    /// Start index of a collapsed bucket, the key `toggle_bucket` expects.
    pub fn bucket_start(&self) -> Option<usize> {
        match &self.kind {
            VirtualKind::CollapsedPrimaryBucket { range, .. } => Some(range[0]),
            _ => None,
        }
    }

    /// Secondary id of a collapsed group, the key `toggle_group` expects.
    pub fn group_id(&self) -> Option<&str> {
        match &self.kind {
            VirtualKind::CollapsedSecondaryGroup { secondary_id, .. } => Some(secondary_id),
            _ => None,
        }
    }
}

/// Bundle of two or more real edges that collapse onto the same endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VirtualEdge {
    pub from: String,
    pub to: String,
    pub count: usize,
    pub source_edge_ids: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ExplorationNode {
    Virtual(VirtualNode),
    Real(GraphNode),
}

impl ExplorationNode {
    pub fn id(&self) -> &str {
        match self {
            ExplorationNode::Virtual(node) => &node.id,
            ExplorationNode::Real(node) => &node.id,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            ExplorationNode::Virtual(node) => &node.label,
            ExplorationNode::Real(node) => &node.label,
        }
    }

    pub fn as_virtual(&self) -> Option<&VirtualNode> {
        match self {
            ExplorationNode::Virtual(node) => Some(node),
            ExplorationNode::Real(_) => None,
        }
    }

    pub fn as_real(&self) -> Option<&GraphNode> {
        match self {
            ExplorationNode::Virtual(_) => None,
            ExplorationNode::Real(node) => Some(node),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ExplorationEdge {
    Virtual(VirtualEdge),
    Real(GraphEdge),
}

impl ExplorationEdge {
    pub fn from(&self) -> &str {
        match self {
            ExplorationEdge::Virtual(edge) => &edge.from,
            ExplorationEdge::Real(edge) => &edge.from,
        }
    }

    pub fn to(&self) -> &str {
        match self {
            ExplorationEdge::Virtual(edge) => &edge.to,
            ExplorationEdge::Real(edge) => &edge.to,
        }
    }

    /// Number of original edges this output edge stands for.
    pub fn count(&self) -> usize {
        match self {
            ExplorationEdge::Virtual(edge) => edge.count,
            ExplorationEdge::Real(_) => 1,
        }
    }
}

/// Edge-bundling bookkeeping for one virtual node. Derived from the edge
/// list and never authoritative.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VirtualNodeMetadata {
    pub virtual_node_id: String,
    pub inbound_edge_count: usize,
    pub outbound_edge_count: usize,
    pub inbound_from: BTreeSet<String>,
    pub outbound_to: BTreeSet<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnknownType {
    pub type_name: String,
    pub node_count: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

/// Non-fatal problems found while building. The build never fails.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildDiagnostics {
    pub dangling_edges: usize,
    pub duplicate_nodes: usize,
    pub self_loops: usize,
    /// Edges whose endpoints both folded into the same virtual node.
    pub collapsed_edges: usize,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unknown_types: Vec<UnknownType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config_fallback: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExplorationGraph {
    pub nodes: Vec<ExplorationNode>,
    pub edges: Vec<ExplorationEdge>,
    pub virtual_node_metadata: BTreeMap<String, VirtualNodeMetadata>,
    #[serde(default)]
    pub diagnostics: BuildDiagnostics,
}

impl ExplorationGraph {
    pub fn virtual_nodes(&self) -> impl Iterator<Item = &VirtualNode> {
        self.nodes.iter().filter_map(ExplorationNode::as_virtual)
    }

    pub fn real_nodes(&self) -> impl Iterator<Item = &GraphNode> {
        self.nodes.iter().filter_map(ExplorationNode::as_real)
    }

    pub fn node_ids(&self) -> BTreeSet<&str> {
        self.nodes.iter().map(ExplorationNode::id).collect()
    }

    pub fn find_node(&self, id: &str) -> Option<&ExplorationNode> {
        self.nodes.iter().find(|node| node.id() == id)
    }

    pub fn hidden_node_count(&self, virtual_id: &str) -> Option<usize> {
        self.virtual_nodes()
            .find(|node| node.id == virtual_id)
            .map(VirtualNode::hidden_node_count)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubgraphCluster {
    pub container_id: String,
    pub container_level: i32,
    /// Members including the container itself.
    pub nodes: BTreeSet<String>,
    pub internal_edges: Vec<GraphEdge>,
    pub outgoing_edges: Vec<GraphEdge>,
    pub incoming_edges: Vec<GraphEdge>,
}

impl SubgraphCluster {
    pub(crate) fn new(container_id: &str, container_level: i32) -> Self {
        Self {
            container_id: container_id.to_string(),
            container_level,
            nodes: BTreeSet::from([container_id.to_string()]),
            internal_edges: Vec::new(),
            outgoing_edges: Vec::new(),
            incoming_edges: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusteredGraph {
    pub clusters: BTreeMap<String, SubgraphCluster>,
    pub cross_cluster_edges: Vec<GraphEdge>,
    pub orphan_nodes: BTreeSet<String>,
    /// Direct (nearest) container of every claimed node.
    pub owners: BTreeMap<String, String>,
}

impl ClusteredGraph {
    pub fn cluster_of(&self, node_id: &str) -> Option<&SubgraphCluster> {
        self.clusters
            .values()
            .find(|cluster| cluster.nodes.contains(node_id))
    }
}
