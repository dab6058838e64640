//! # echelon-core: Supply Network Modeling Core
//!
//! Provides the data structures for multi-echelon supply networks used by the
//! safety-stock placement solver.
//!
//! ## Design Philosophy
//!
//! Networks are modeled as **directed graphs** where:
//! - **Nodes**: [`Stage`]s (a processing or stocking step with a lead time and a holding cost)
//! - **Edges**: [`SupplyLink`]s (upstream stage supplies the downstream stage)
//!
//! Following the guaranteed-service convention, every stage quotes an outbound
//! service time to its customers and receives an inbound service time from its
//! suppliers. Stages without successors face external demand.
//!
//! ## Quick Start
//!
//! ```rust
//! use echelon_core::*;
//!
//! let mut network = Network::new();
//! let part = network.add_stage(Stage::new("part", 2.0, 1.0));
//! let assembly = network.add_stage(Stage::new("assembly", 3.0, 2.0));
//! network.add_link(part, assembly).unwrap();
//!
//! assert!(network.is_demand_stage(assembly));
//! assert_eq!(network.committed_service_time(assembly), Some(0.0));
//! assert_eq!(network.committed_service_time(part), None);
//! ```
//!
//! ## Modules
//!
//! - [`diagnostics`] - Validation and diagnostic reporting
//! - [`error`] - Unified error type
//! - [`graph_utils`] - Topological analysis (ordering, cumulative lead times, DOT export)

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use serde::{Deserialize, Serialize};

pub mod diagnostics;
pub mod error;
pub mod graph_utils;

pub use diagnostics::{DiagnosticIssue, Diagnostics, Severity};
pub use error::{EchelonError, EchelonResult};
pub use graph_utils::*;

/// Identity of a stage inside a [`Network`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(usize);

impl NodeId {
    #[inline]
    pub fn new(value: usize) -> Self {
        NodeId(value)
    }
    #[inline]
    pub fn value(&self) -> usize {
        self.0
    }

    #[inline]
    fn index(self) -> NodeIndex {
        NodeIndex::new(self.0)
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A stage of the supply network.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stage {
    pub id: NodeId,
    pub name: String,
    /// Processing/transport time of the stage
    pub lead_time: f64,
    /// Holding cost per unit of safety stock
    pub holding_cost: f64,
    /// Outbound service time promised to external customers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_service_time: Option<f64>,
}

impl Stage {
    /// Create a stage. The id is assigned by [`Network::add_stage`].
    pub fn new(name: impl Into<String>, lead_time: f64, holding_cost: f64) -> Self {
        Self {
            id: NodeId(0),
            name: name.into(),
            lead_time,
            holding_cost,
            max_service_time: None,
        }
    }

    pub fn with_max_service_time(mut self, service_time: f64) -> Self {
        self.max_service_time = Some(service_time);
        self
    }
}

/// Directed supply relation: `upstream` delivers into `downstream`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupplyLink {
    pub upstream: NodeId,
    pub downstream: NodeId,
}

/// The supply network graph.
///
/// Stage ids are dense and equal to the petgraph node index; stages are never
/// removed, so ids stay stable for the lifetime of the network.
#[derive(Debug, Clone, Default)]
pub struct Network {
    graph: DiGraph<Stage, SupplyLink>,
}

impl Network {
    pub fn new() -> Self {
        Self {
            graph: DiGraph::new(),
        }
    }

    /// Add a stage and return its id.
    pub fn add_stage(&mut self, mut stage: Stage) -> NodeId {
        let id = NodeId(self.graph.node_count());
        stage.id = id;
        let index = self.graph.add_node(stage);
        debug_assert_eq!(index.index(), id.0);
        id
    }

    /// Connect `upstream` to `downstream`.
    pub fn add_link(&mut self, upstream: NodeId, downstream: NodeId) -> EchelonResult<()> {
        for id in [upstream, downstream] {
            if self.stage(id).is_none() {
                return Err(EchelonError::Network(format!("unknown stage {id}")));
            }
        }
        if upstream == downstream {
            return Err(EchelonError::Network(format!(
                "stage {upstream} cannot supply itself"
            )));
        }
        if self
            .graph
            .find_edge(upstream.index(), downstream.index())
            .is_none()
        {
            self.graph.add_edge(
                upstream.index(),
                downstream.index(),
                SupplyLink {
                    upstream,
                    downstream,
                },
            );
        }
        Ok(())
    }

    pub fn graph(&self) -> &DiGraph<Stage, SupplyLink> {
        &self.graph
    }

    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    pub fn stage(&self, id: NodeId) -> Option<&Stage> {
        self.graph.node_weight(id.index())
    }

    /// Stages in insertion order.
    pub fn stages(&self) -> impl Iterator<Item = &Stage> {
        self.graph.node_weights()
    }

    pub fn links(&self) -> impl Iterator<Item = &SupplyLink> {
        self.graph.edge_weights()
    }

    pub fn find_by_name(&self, name: &str) -> Option<NodeId> {
        self.stages().find(|s| s.name == name).map(|s| s.id)
    }

    /// Direct suppliers of a stage, sorted by id.
    pub fn predecessors(&self, id: NodeId) -> Vec<NodeId> {
        self.neighbors(id, Direction::Incoming)
    }

    /// Direct customers of a stage, sorted by id.
    pub fn successors(&self, id: NodeId) -> Vec<NodeId> {
        self.neighbors(id, Direction::Outgoing)
    }

    fn neighbors(&self, id: NodeId, direction: Direction) -> Vec<NodeId> {
        let mut ids: Vec<NodeId> = self
            .graph
            .neighbors_directed(id.index(), direction)
            .map(|idx| NodeId(idx.index()))
            .collect();
        ids.sort();
        ids
    }

    /// A stage with no customers inside the network serves external demand.
    pub fn is_demand_stage(&self, id: NodeId) -> bool {
        self.graph
            .neighbors_directed(id.index(), Direction::Outgoing)
            .next()
            .is_none()
    }

    /// Upper bound on the outbound service time of a stage.
    ///
    /// Demand stages without an explicit promise serve immediately (`0.0`);
    /// internal stages are only bounded when a value was given.
    pub fn committed_service_time(&self, id: NodeId) -> Option<f64> {
        let stage = self.stage(id)?;
        match stage.max_service_time {
            Some(value) => Some(value),
            None if self.is_demand_stage(id) => Some(0.0),
            None => None,
        }
    }

    /// Compute basic statistics about the network
    pub fn stats(&self) -> NetworkStats {
        let mut stats = NetworkStats::default();
        for stage in self.stages() {
            stats.num_stages += 1;
            stats.total_lead_time += stage.lead_time;
            stats.total_holding_cost += stage.holding_cost;
            stats.max_lead_time = stats.max_lead_time.max(stage.lead_time);
            if self.is_demand_stage(stage.id) {
                stats.num_demand_stages += 1;
            }
            if self.predecessors(stage.id).is_empty() {
                stats.num_supply_stages += 1;
            }
        }
        stats.num_links = self.graph.edge_count();
        stats
    }

    /// Validate network data for issues that would make the placement model
    /// meaningless or infeasible.
    pub fn validate_into(&self, diag: &mut Diagnostics) {
        if self.is_empty() {
            diag.add_error("structure", "Network has no stages");
            return;
        }

        let mut seen = std::collections::HashSet::new();
        for stage in self.stages() {
            let entity = format!("stage '{}'", stage.name);
            if !seen.insert(stage.name.as_str()) {
                diag.add_error_with_entity("structure", "Duplicate stage name", &entity);
            }
            if !stage.lead_time.is_finite() || stage.lead_time < 0.0 {
                diag.add_error_with_entity(
                    "data",
                    &format!("Lead time must be a non-negative number, got {}", stage.lead_time),
                    &entity,
                );
            }
            if !stage.holding_cost.is_finite() || stage.holding_cost < 0.0 {
                diag.add_error_with_entity(
                    "data",
                    &format!(
                        "Holding cost must be a non-negative number, got {}",
                        stage.holding_cost
                    ),
                    &entity,
                );
            } else if stage.holding_cost == 0.0 {
                diag.add_warning_with_entity("data", "Holding cost is zero", &entity);
            }
            if let Some(service) = stage.max_service_time {
                if !service.is_finite() || service < 0.0 {
                    diag.add_error_with_entity(
                        "data",
                        &format!("Service time must be a non-negative number, got {service}"),
                        &entity,
                    );
                }
            }
        }

        if let Err(err) = graph_utils::topological_order(self) {
            diag.add_error("structure", &err.to_string());
        }
    }
}

/// Statistics about a network's size
#[derive(Debug, Clone, Default)]
pub struct NetworkStats {
    pub num_stages: usize,
    pub num_links: usize,
    pub num_demand_stages: usize,
    pub num_supply_stages: usize,
    pub total_lead_time: f64,
    pub max_lead_time: f64,
    pub total_holding_cost: f64,
}

impl std::fmt::Display for NetworkStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} stages, {} links, {} demand stages, {} supply stages, max lead time {:.2}",
            self.num_stages,
            self.num_links,
            self.num_demand_stages,
            self.num_supply_stages,
            self.max_lead_time
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain() -> (Network, NodeId, NodeId) {
        let mut network = Network::new();
        let a = network.add_stage(Stage::new("A", 2.0, 1.0));
        let b = network.add_stage(Stage::new("B", 3.0, 2.0));
        network.add_link(a, b).unwrap();
        (network, a, b)
    }

    #[test]
    fn test_network_creation() {
        let (network, a, b) = chain();
        assert_eq!(network.len(), 2);
        assert_eq!(network.stage(a).unwrap().name, "A");
        assert_eq!(network.successors(a), vec![b]);
        assert_eq!(network.predecessors(b), vec![a]);
        assert_eq!(network.find_by_name("B"), Some(b));
    }

    #[test]
    fn test_duplicate_link_is_ignored() {
        let (mut network, a, b) = chain();
        network.add_link(a, b).unwrap();
        assert_eq!(network.stats().num_links, 1);
    }

    #[test]
    fn test_link_to_unknown_stage_fails() {
        let (mut network, a, _) = chain();
        let err = network.add_link(a, NodeId::new(42)).unwrap_err();
        assert!(matches!(err, EchelonError::Network(_)));
        assert!(network.add_link(a, a).is_err());
    }

    #[test]
    fn test_committed_service_time() {
        let mut network = Network::new();
        let a = network.add_stage(Stage::new("A", 1.0, 1.0).with_max_service_time(4.0));
        let b = network.add_stage(Stage::new("B", 1.0, 1.0));
        let c = network.add_stage(Stage::new("C", 1.0, 1.0).with_max_service_time(2.0));
        network.add_link(a, b).unwrap();
        network.add_link(a, c).unwrap();

        assert_eq!(network.committed_service_time(a), Some(4.0));
        assert_eq!(network.committed_service_time(b), Some(0.0));
        assert_eq!(network.committed_service_time(c), Some(2.0));
    }

    #[test]
    fn test_stats() {
        let (network, _, _) = chain();
        let stats = network.stats();
        assert_eq!(stats.num_stages, 2);
        assert_eq!(stats.num_demand_stages, 1);
        assert_eq!(stats.num_supply_stages, 1);
        assert_eq!(stats.max_lead_time, 3.0);
        assert!(stats.to_string().contains("2 stages"));
    }

    #[test]
    fn test_validate_flags_bad_data() {
        let mut network = Network::new();
        network.add_stage(Stage::new("A", -1.0, 1.0));
        network.add_stage(Stage::new("A", 1.0, f64::NAN));

        let mut diag = Diagnostics::new();
        network.validate_into(&mut diag);
        assert_eq!(diag.error_count(), 3);
    }

    #[test]
    fn test_validate_empty_network() {
        let mut diag = Diagnostics::new();
        Network::new().validate_into(&mut diag);
        assert!(diag.has_errors());
    }

    #[test]
    fn test_validate_detects_cycle() {
        let (mut network, a, b) = chain();
        network.add_link(b, a).unwrap();
        let mut diag = Diagnostics::new();
        network.validate_into(&mut diag);
        assert!(diag.errors().any(|i| i.message.contains("cycle")));
    }
}
