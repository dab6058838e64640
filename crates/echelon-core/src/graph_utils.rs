use crate::{EchelonError, EchelonResult, Network, NodeId};
use anyhow::{anyhow, Result};
use petgraph::algo::{connected_components, toposort};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use std::collections::HashMap;

/// Summary statistics produced by `graph stats`.
#[derive(Debug)]
pub struct GraphStats {
    pub node_count: usize,
    pub edge_count: usize,
    /// Weakly connected components
    pub connected_components: usize,
    pub max_in_degree: usize,
    pub max_out_degree: usize,
    pub density: f64,
    /// Longest lead-time path from any supply stage to any demand stage
    pub longest_lead_time_path: f64,
}

/// Longest lead-time path ending at a stage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CumulativeLeadTime {
    /// Longest path over all suppliers, excluding the stage's own lead time
    pub upstream: f64,
    /// `upstream` plus the stage's own lead time
    pub through: f64,
}

/// Calculates graph-level statistics such as density and degree extremes.
pub fn graph_stats(network: &Network) -> Result<GraphStats> {
    let graph = network.graph();
    let node_count = graph.node_count();
    let edge_count = graph.edge_count();
    let degree = |direction| {
        graph
            .node_indices()
            .map(|idx| graph.neighbors_directed(idx, direction).count())
            .max()
            .unwrap_or(0)
    };
    let density = if node_count < 2 {
        0.0
    } else {
        edge_count as f64 / (node_count as f64 * (node_count as f64 - 1.0))
    };
    let cumulative = cumulative_lead_times(network)?;
    Ok(GraphStats {
        node_count,
        edge_count,
        connected_components: connected_components(graph),
        max_in_degree: degree(Direction::Incoming),
        max_out_degree: degree(Direction::Outgoing),
        density,
        longest_lead_time_path: longest_lead_time_path(&cumulative),
    })
}

/// Stages ordered so that every supplier precedes its customers.
pub fn topological_order(network: &Network) -> EchelonResult<Vec<NodeId>> {
    toposort(network.graph(), None)
        .map(|order| order.into_iter().map(|idx| NodeId::new(idx.index())).collect())
        .map_err(|cycle| {
            let name = network
                .stage(NodeId::new(cycle.node_id().index()))
                .map(|s| s.name.clone())
                .unwrap_or_default();
            EchelonError::Network(format!("supply network contains a cycle through stage '{name}'"))
        })
}

/// Longest cumulative lead time into and through every stage.
///
/// These bound the service times: a stage can never wait longer for its
/// inputs than the slowest upstream chain takes to replenish.
pub fn cumulative_lead_times(network: &Network) -> EchelonResult<HashMap<NodeId, CumulativeLeadTime>> {
    let mut cumulative: HashMap<NodeId, CumulativeLeadTime> = HashMap::with_capacity(network.len());
    for id in topological_order(network)? {
        let upstream = network
            .predecessors(id)
            .iter()
            .filter_map(|pred| cumulative.get(pred))
            .map(|c| c.through)
            .fold(0.0, f64::max);
        let lead_time = network.stage(id).map_or(0.0, |s| s.lead_time);
        cumulative.insert(
            id,
            CumulativeLeadTime {
                upstream,
                through: upstream + lead_time,
            },
        );
    }
    Ok(cumulative)
}

pub fn longest_lead_time_path(cumulative: &HashMap<NodeId, CumulativeLeadTime>) -> f64 {
    cumulative.values().map(|c| c.through).fold(0.0, f64::max)
}

/// Export the topology to a DOT string (Graphviz) so external tools can visualize the layout.
pub fn export_graph(network: &Network, format: &str) -> Result<String> {
    match format.to_ascii_lowercase().as_str() {
        "graphviz" | "dot" => Ok(render_dot(network)),
        other => Err(anyhow!("unsupported graph export format '{other}'")),
    }
}

fn render_dot(network: &Network) -> String {
    let mut buffer = String::new();
    buffer.push_str("digraph supply_network {\n");
    for stage in network.stages() {
        let label = sanitize_label(&stage.name);
        buffer.push_str(&format!(
            "  n{} [label=\"{}\\nL={} h={}\"];\n",
            stage.id.value(),
            label,
            stage.lead_time,
            stage.holding_cost
        ));
    }
    for edge in network.graph().edge_references() {
        let source = edge.source().index();
        let target = edge.target().index();
        buffer.push_str(&format!("  n{source} -> n{target};\n"));
    }
    buffer.push('}');
    buffer
}

fn sanitize_label(label: &str) -> String {
    label.replace('"', "\\\"")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Stage;

    fn diamond() -> Network {
        let mut network = Network::new();
        let raw = network.add_stage(Stage::new("raw", 1.0, 1.0));
        let left = network.add_stage(Stage::new("left", 4.0, 1.0));
        let right = network.add_stage(Stage::new("right", 2.0, 1.0));
        let end = network.add_stage(Stage::new("end", 3.0, 1.0));
        network.add_link(raw, left).unwrap();
        network.add_link(raw, right).unwrap();
        network.add_link(left, end).unwrap();
        network.add_link(right, end).unwrap();
        network
    }

    #[test]
    fn topological_order_puts_suppliers_first() {
        let network = diamond();
        let order = topological_order(&network).unwrap();
        let position = |name: &str| {
            let id = network.find_by_name(name).unwrap();
            order.iter().position(|x| *x == id).unwrap()
        };
        assert!(position("raw") < position("left"));
        assert!(position("left") < position("end"));
        assert!(position("right") < position("end"));
    }

    #[test]
    fn cumulative_lead_times_follow_longest_path() {
        let network = diamond();
        let cumulative = cumulative_lead_times(&network).unwrap();
        let end = network.find_by_name("end").unwrap();
        assert_eq!(cumulative[&end].upstream, 5.0);
        assert_eq!(cumulative[&end].through, 8.0);
        assert_eq!(longest_lead_time_path(&cumulative), 8.0);
    }

    #[test]
    fn graph_stats_reports_degrees() {
        let stats = graph_stats(&diamond()).unwrap();
        assert_eq!(stats.node_count, 4);
        assert_eq!(stats.edge_count, 4);
        assert_eq!(stats.connected_components, 1);
        assert_eq!(stats.max_in_degree, 2);
        assert_eq!(stats.max_out_degree, 2);
        assert_eq!(stats.longest_lead_time_path, 8.0);
    }

    #[test]
    fn export_dot_lists_every_link() {
        let dot = export_graph(&diamond(), "dot").unwrap();
        assert!(dot.starts_with("digraph supply_network {"));
        assert_eq!(dot.matches("->").count(), 4);
        assert!(export_graph(&diamond(), "gexf").is_err());
    }
}
