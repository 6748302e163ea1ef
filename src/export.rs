use crate::explore::{ExplorationEdge, ExplorationGraph, ExplorationNode, VirtualKind};
use crate::ir::IssueState;
use std::collections::HashMap;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// Pretty JSON to `path`, or stdout when no path is given.
pub fn write_exploration_json(
    path: Option<&Path>,
    graph: &ExplorationGraph,
) -> anyhow::Result<()> {
    match path {
        Some(path) => {
            let writer = BufWriter::new(File::create(path)?);
            serde_json::to_writer_pretty(writer, graph)?;
        }
        None => {
            let stdout = io::stdout();
            let mut lock = stdout.lock();
            serde_json::to_writer_pretty(&mut lock, graph)?;
            writeln!(lock)?;
        }
    }
    Ok(())
}

pub fn write_text_output(path: Option<&Path>, text: &str) -> anyhow::Result<()> {
    if let Some(path) = path {
        std::fs::write(path, text)?;
    } else {
        let stdout = io::stdout();
        let mut lock = stdout.lock();
        lock.write_all(text.as_bytes())?;
    }
    Ok(())
}

/// Mermaid flowchart preview of an exploration graph.
///
/// Node ids are replaced by positional ids since issue ids are not valid
/// Mermaid identifiers in general.
pub fn to_mermaid(graph: &ExplorationGraph) -> String {
    let mut out = String::from("flowchart TD\n");
    let mut short_ids: HashMap<&str, String> = HashMap::new();
    let mut virtual_ids = Vec::new();
    let mut blocked_ids = Vec::new();
    let mut done_ids = Vec::new();

    for (idx, node) in graph.nodes.iter().enumerate() {
        let short = format!("n{idx}");
        let label = escape_label(node.label());
        match node {
            ExplorationNode::Real(real) => {
                if real.blocked {
                    blocked_ids.push(short.clone());
                }
                if real.state == IssueState::Done {
                    done_ids.push(short.clone());
                }
                out.push_str(&format!("  {short}[\"{label}\"]\n"));
            }
            ExplorationNode::Virtual(virtual_node) => {
                virtual_ids.push(short.clone());
                let (open, close) = match virtual_node.kind {
                    VirtualKind::CollapsedPrimaryBucket { .. } => ("([", "])"),
                    VirtualKind::CollapsedSecondaryGroup { .. } => ("[[", "]]"),
                    VirtualKind::MoreNode { .. } => ("((", "))"),
                };
                out.push_str(&format!("  {short}{open}\"{label}\"{close}\n"));
            }
        }
        short_ids.insert(node.id(), short);
    }

    for edge in &graph.edges {
        let (Some(from), Some(to)) = (short_ids.get(edge.from()), short_ids.get(edge.to())) else {
            continue;
        };
        match edge {
            ExplorationEdge::Virtual(bundle) => {
                out.push_str(&format!("  {from} -->|x{}| {to}\n", bundle.count));
            }
            ExplorationEdge::Real(_) => out.push_str(&format!("  {from} --> {to}\n")),
        }
    }

    for (class, style, ids) in [
        ("collapsed", "stroke-dasharray:4 3", &virtual_ids),
        ("blocked", "stroke:#D33", &blocked_ids),
        ("done", "fill:#E8F5E9", &done_ids),
    ] {
        if ids.is_empty() {
            continue;
        }
        out.push_str(&format!("  classDef {class} {style}\n"));
        out.push_str(&format!("  class {} {class}\n", ids.join(",")));
    }

    out
}

fn escape_label(label: &str) -> String {
    label
        .replace('"', "#quot;")
        .replace('\n', " ")
}
