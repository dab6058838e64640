//! JSON graph parser
//!
//! ```json
//! {
//!   "nodes": [{ "name": "A", "lead_time": 2, "holding_cost": 1 }],
//!   "edges": [{ "from": "A", "to": "B" }]
//! }
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use echelon_core::{Diagnostics, Network, Stage};

use super::ImportResult;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphDocument {
    pub nodes: Vec<NodeRecord>,
    #[serde(default)]
    pub edges: Vec<EdgeRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeRecord {
    pub name: String,
    pub lead_time: f64,
    pub holding_cost: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_service_time: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EdgeRecord {
    pub from: String,
    pub to: String,
}

impl GraphDocument {
    /// Snapshot of a network, in stage order.
    pub fn from_network(network: &Network) -> Self {
        let name = |id| network.stage(id).map(|s: &Stage| s.name.clone()).unwrap_or_default();
        Self {
            nodes: network
                .stages()
                .map(|s| NodeRecord {
                    name: s.name.clone(),
                    lead_time: s.lead_time,
                    holding_cost: s.holding_cost,
                    max_service_time: s.max_service_time,
                })
                .collect(),
            edges: network
                .links()
                .map(|link| EdgeRecord {
                    from: name(link.upstream),
                    to: name(link.downstream),
                })
                .collect(),
        }
    }
}

/// Parse a JSON graph file
pub fn parse_json(path: &Path) -> Result<ImportResult> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading JSON graph: {}", path.display()))?;
    parse_json_str(&content).with_context(|| format!("parsing JSON graph: {}", path.display()))
}

pub fn parse_json_str(content: &str) -> Result<ImportResult> {
    let document: GraphDocument = serde_json::from_str(content).context("invalid graph document")?;
    let mut network = Network::new();
    let mut diagnostics = Diagnostics::new();

    for node in document.nodes {
        if network.find_by_name(&node.name).is_some() {
            diagnostics.add_error_with_entity(
                "parse",
                "duplicate stage",
                &format!("stage '{}'", node.name),
            );
            continue;
        }
        let mut stage = Stage::new(node.name, node.lead_time, node.holding_cost);
        stage.max_service_time = node.max_service_time;
        network.add_stage(stage);
    }

    for (idx, edge) in document.edges.iter().enumerate() {
        let entity = format!("edge {} ({} -> {})", idx, edge.from, edge.to);
        match (network.find_by_name(&edge.from), network.find_by_name(&edge.to)) {
            (Some(from), Some(to)) => {
                if let Err(err) = network.add_link(from, to) {
                    diagnostics.add_error_with_entity("structure", &err.to_string(), &entity);
                }
            }
            _ => diagnostics.add_error_with_entity("parse", "edge references unknown stage", &entity),
        }
    }

    Ok(ImportResult {
        network,
        diagnostics,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "nodes": [
            {"name": "A", "lead_time": 2, "holding_cost": 1},
            {"name": "B", "lead_time": 3, "holding_cost": 2, "max_service_time": 1}
        ],
        "edges": [{"from": "A", "to": "B"}]
    }"#;

    #[test]
    fn parses_document() {
        let result = parse_json_str(SAMPLE).unwrap();
        assert!(!result.diagnostics.has_errors());
        let network = result.network;
        let b = network.find_by_name("B").unwrap();
        assert_eq!(network.stage(b).unwrap().max_service_time, Some(1.0));
        assert_eq!(network.predecessors(b).len(), 1);
    }

    #[test]
    fn unknown_edge_endpoint_is_an_error() {
        let result = parse_json_str(
            r#"{"nodes": [{"name": "A", "lead_time": 1, "holding_cost": 1}],
                "edges": [{"from": "A", "to": "Z"}]}"#,
        )
        .unwrap();
        assert_eq!(result.diagnostics.error_count(), 1);
    }

    #[test]
    fn malformed_json_fails() {
        assert!(parse_json_str("{\"nodes\": [").is_err());
    }

    #[test]
    fn document_round_trips_network() {
        let network = parse_json_str(SAMPLE).unwrap().network;
        let document = GraphDocument::from_network(&network);
        assert_eq!(document.nodes.len(), 2);
        assert_eq!(document.edges[0].from, "A");
        assert_eq!(document.edges[0].to, "B");
    }
}
