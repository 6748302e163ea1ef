use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static TYPE_LABEL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^type:([^:]*)$").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueState {
    Backlog,
    Ready,
    InProgress,
    Gated,
    Done,
    Archived,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    Normal,
    High,
    Critical,
}

/// One issue as delivered by the graph source. Never mutated by the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
    pub id: String,
    pub label: String,
    pub state: IssueState,
    pub priority: Priority,
    #[serde(default)]
    pub assignee: Option<String>,
    #[serde(default)]
    pub blocked: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<String>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub node_type: Option<String>,
}

impl GraphNode {
    pub fn new(id: &str, label: &str) -> Self {
        Self {
            id: id.to_string(),
            label: label.to_string(),
            state: IssueState::Backlog,
            priority: Priority::Normal,
            assignee: None,
            blocked: false,
            labels: Vec::new(),
            node_type: None,
        }
    }

    pub fn with_type(mut self, node_type: &str) -> Self {
        self.node_type = Some(node_type.to_string());
        self
    }

    pub fn with_labels<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.labels = labels.into_iter().map(Into::into).collect();
        self
    }

    /// Classification input for the tier partitioner: the explicit `type`
    /// field, otherwise the first well-formed `type:<value>` label.
    pub fn type_name(&self) -> Option<String> {
        if let Some(explicit) = self.node_type.as_deref() {
            let normalized = explicit.trim().to_lowercase();
            if !normalized.is_empty() {
                return Some(normalized);
            }
        }
        self.labels.iter().find_map(|label| extract_type(label))
    }
}

/// Returns the normalized value of a `type:<value>` label.
pub fn extract_type(label: &str) -> Option<String> {
    let caps = TYPE_LABEL_RE.captures(label)?;
    let value = caps.get(1)?.as_str().trim().to_lowercase();
    if value.is_empty() {
        return None;
    }
    Some(value)
}

/// `from` depends on `to`: `to` must complete before `from`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GraphEdge {
    pub from: String,
    pub to: String,
}

impl GraphEdge {
    pub fn new(from: &str, to: &str) -> Self {
        Self {
            from: from.to_string(),
            to: to.to_string(),
        }
    }

    /// Provenance id used by bundled virtual edges.
    pub fn source_id(&self) -> String {
        format!("{}-{}", self.from, self.to)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphData {
    #[serde(default)]
    pub nodes: Vec<GraphNode>,
    #[serde(default)]
    pub edges: Vec<GraphEdge>,
}

impl GraphData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_node(&mut self, node: GraphNode) {
        self.nodes.push(node);
    }

    pub fn push_edge(&mut self, from: &str, to: &str) {
        self.edges.push(GraphEdge::new(from, to));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_type_labels() {
        assert_eq!(extract_type("type:task"), Some("task".to_string()));
        assert_eq!(extract_type("type: Epic "), Some("epic".to_string()));
        assert_eq!(extract_type("type:"), None);
        assert_eq!(extract_type("epic:auth"), None);
        assert_eq!(extract_type("type:a:b"), None);
    }

    #[test]
    fn explicit_type_wins_over_labels() {
        let node = GraphNode::new("a", "A")
            .with_labels(["type:story", "epic:auth"])
            .with_type("Milestone");
        assert_eq!(node.type_name().as_deref(), Some("milestone"));

        let node = GraphNode::new("b", "B").with_labels(["epic:auth", "type:story"]);
        assert_eq!(node.type_name().as_deref(), Some("story"));

        let node = GraphNode::new("c", "C").with_type("  ");
        assert_eq!(node.type_name(), None);
    }

    #[test]
    fn parses_backend_graph_payload() {
        let json = r#"{
            "nodes": [
                {"id": "1", "label": "Ship v1", "state": "in_progress", "priority": "high",
                 "assignee": null, "blocked": false, "labels": ["type:milestone"]},
                {"id": "2", "label": "Auth", "state": "backlog", "priority": "normal",
                 "blocked": true, "type": "epic"}
            ],
            "edges": [{"from": "1", "to": "2"}]
        }"#;
        let data: GraphData = serde_json::from_str(json).unwrap();
        assert_eq!(data.nodes.len(), 2);
        assert_eq!(data.nodes[0].state, IssueState::InProgress);
        assert_eq!(data.nodes[1].node_type.as_deref(), Some("epic"));
        assert!(data.nodes[1].blocked);
        assert_eq!(data.edges[0].source_id(), "1-2");
    }
}
