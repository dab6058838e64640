//! Placement results.

use std::time::Duration;

use echelon_core::{Network, NodeId};
use serde::{Serialize, Serializer};

use super::approximation::ApproximationTable;
use super::backend::ServiceTimes;
use super::cost::{round_to, ConcaveCost, TANGENT_DECIMALS};
use super::error::PlacementError;

/// `Σ h · f(round(NRP, 3))` over every stage.
///
/// This is the figure reported as the answer. It never uses the tangents, so
/// it is comparable between passes.
pub fn true_total_cost(
    network: &Network,
    service_times: &ServiceTimes,
    cost: &dyn ConcaveCost,
) -> Result<f64, PlacementError> {
    let mut total = 0.0;
    for stage in network.stages() {
        let nrp = service_times
            .require(stage.id)?
            .net_replenishment_period(stage.lead_time);
        total += stage.holding_cost * cost.evaluate(round_to(nrp, TANGENT_DECIMALS));
    }
    Ok(total)
}

/// How the iteration ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Termination {
    /// Total error fell within tolerance
    Converged,
    /// Two passes produced the same total error
    Stalled,
    /// The configured pass limit ran out; the result is the cheapest pass seen
    ExceededBound,
}

impl Termination {
    pub fn is_success(&self) -> bool {
        !matches!(self, Termination::ExceededBound)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Termination::Converged => "converged",
            Termination::Stalled => "stalled",
            Termination::ExceededBound => "exceeded iteration bound",
        }
    }
}

impl std::fmt::Display for Termination {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Placement of one stage
#[derive(Debug, Clone, Serialize)]
pub struct NodePlacement {
    pub id: NodeId,
    pub name: String,
    pub outbound_service_time: f64,
    pub inbound_service_time: f64,
    pub net_replenishment_period: f64,
    /// Whether the indicator switched the tangent intercept on
    pub indicator: bool,
    pub slope: f64,
    pub intercept: f64,
    /// `h · f(NRP)` for this stage
    pub safety_stock_cost: f64,
}

impl NodePlacement {
    pub fn holds_stock(&self) -> bool {
        self.net_replenishment_period > 0.0
    }
}

/// Trace of one solver pass
#[derive(Debug, Clone, Serialize)]
pub struct IterationRecord {
    pub iteration: usize,
    pub total_error: f64,
    pub surrogate_objective: f64,
    pub true_total_cost: f64,
    /// Stages whose tangent moved after this pass
    pub updated_nodes: usize,
}

/// One line of the net replenishment export
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NetReplenishmentRecord {
    pub name: String,
    pub net_replenishment_period: f64,
}

/// Final result of a placement run
#[derive(Debug, Clone, Serialize)]
pub struct PlacementSolution {
    pub termination: Termination,
    pub true_total_cost: f64,
    pub surrogate_objective: f64,
    pub total_error: f64,
    /// Solver passes performed
    pub iterations: usize,
    pub solver: String,
    pub nodes: Vec<NodePlacement>,
    #[serde(rename = "solve_time_seconds", serialize_with = "serialize_seconds")]
    pub solve_time: Duration,
    pub history: Vec<IterationRecord>,
}

fn serialize_seconds<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(duration.as_secs_f64())
}

impl PlacementSolution {
    pub fn is_success(&self) -> bool {
        self.termination.is_success()
    }

    pub fn node(&self, name: &str) -> Option<&NodePlacement> {
        self.nodes.iter().find(|n| n.name == name)
    }

    /// Stages holding safety stock
    pub fn stocking_nodes(&self) -> impl Iterator<Item = &NodePlacement> {
        self.nodes.iter().filter(|n| n.holds_stock())
    }

    /// Export records in network order.
    pub fn net_replenishment_records(&self) -> Vec<NetReplenishmentRecord> {
        self.nodes
            .iter()
            .map(|n| NetReplenishmentRecord {
                name: n.name.clone(),
                net_replenishment_period: n.net_replenishment_period,
            })
            .collect()
    }

    /// Format a human-readable summary
    pub fn summary(&self) -> String {
        let mut s = String::new();
        s.push_str(&format!("Safety Stock Placement\n{}\n", "=".repeat(40)));
        s.push_str(&format!("Status: {}\n", self.termination));
        s.push_str(&format!("True Total Cost: {:.4}\n", self.true_total_cost));
        s.push_str(&format!("Surrogate Objective: {:.4}\n", self.surrogate_objective));
        s.push_str(&format!("Approximation Error: {:.6}\n", self.total_error));
        s.push_str(&format!(
            "Iterations: {} ({})\n",
            self.iterations, self.solver
        ));
        s.push_str(&format!(
            "Stocking Stages: {} of {}\n",
            self.stocking_nodes().count(),
            self.nodes.len()
        ));
        s.push_str(&format!("Solve Time: {:.2?}\n", self.solve_time));

        if !self.nodes.is_empty() {
            s.push_str("\nStages:\n");
            for node in &self.nodes {
                if node.holds_stock() {
                    s.push_str(&format!(
                        "  [STOCK] {} S={} SI={} NRP={} cost={:.4}\n",
                        node.name,
                        node.outbound_service_time,
                        node.inbound_service_time,
                        node.net_replenishment_period,
                        node.safety_stock_cost
                    ));
                } else {
                    s.push_str(&format!(
                        "  [PASS]  {} S={} SI={}\n",
                        node.name, node.outbound_service_time, node.inbound_service_time
                    ));
                }
            }
        }

        s
    }
}

/// Per-stage placements of a solved point, in network order.
pub(crate) fn node_placements(
    network: &Network,
    service_times: &ServiceTimes,
    table: &ApproximationTable,
    cost: &dyn ConcaveCost,
) -> Result<Vec<NodePlacement>, PlacementError> {
    network
        .stages()
        .map(|stage| {
            let values = service_times.require(stage.id)?;
            let nrp = values.net_replenishment_period(stage.lead_time);
            let tangent = table
                .get(stage.id)
                .ok_or(PlacementError::MissingValue { node: stage.id })?;
            Ok(NodePlacement {
                id: stage.id,
                name: stage.name.clone(),
                outbound_service_time: values.outbound,
                inbound_service_time: values.inbound,
                net_replenishment_period: nrp,
                indicator: values.indicator >= 0.5,
                slope: tangent.slope,
                intercept: tangent.intercept,
                safety_stock_cost: stage.holding_cost * cost.evaluate(round_to(nrp, TANGENT_DECIMALS)),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::placement::backend::NodeServiceTimes;
    use crate::placement::cost::SquareRoot;
    use echelon_core::Stage;

    fn chain() -> Network {
        let mut network = Network::new();
        let a = network.add_stage(Stage::new("A", 2.0, 1.0));
        let b = network.add_stage(Stage::new("B", 3.0, 2.0));
        network.add_link(a, b).unwrap();
        network
    }

    fn placement(name: &str, nrp: f64) -> NodePlacement {
        NodePlacement {
            id: NodeId::new(0),
            name: name.to_string(),
            outbound_service_time: 0.0,
            inbound_service_time: 0.0,
            net_replenishment_period: nrp,
            indicator: nrp > 0.0,
            slope: 0.5,
            intercept: 0.5,
            safety_stock_cost: nrp.sqrt(),
        }
    }

    fn solution() -> PlacementSolution {
        PlacementSolution {
            termination: Termination::Converged,
            true_total_cost: 4.4721,
            surrogate_objective: 4.4721,
            total_error: 0.0,
            iterations: 3,
            solver: "microlp".to_string(),
            nodes: vec![placement("A", 0.0), placement("B", 5.0)],
            solve_time: Duration::from_millis(12),
            history: Vec::new(),
        }
    }

    #[test]
    fn true_cost_uses_concave_function() {
        let network = chain();
        let times: ServiceTimes = [
            (NodeId::new(0), NodeServiceTimes::new(2.0, 0.0, 0.0)),
            (NodeId::new(1), NodeServiceTimes::new(0.0, 2.0, 1.0)),
        ]
        .into_iter()
        .collect();
        let cost = true_total_cost(&network, &times, &SquareRoot).unwrap();
        assert!((cost - 2.0 * 5f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn true_cost_requires_every_stage() {
        let network = chain();
        let times: ServiceTimes = [(NodeId::new(0), NodeServiceTimes::default())]
            .into_iter()
            .collect();
        assert!(matches!(
            true_total_cost(&network, &times, &SquareRoot),
            Err(PlacementError::MissingValue { .. })
        ));
    }

    #[test]
    fn exceeded_bound_is_not_success() {
        assert!(Termination::Converged.is_success());
        assert!(Termination::Stalled.is_success());
        assert!(!Termination::ExceededBound.is_success());
    }

    #[test]
    fn records_keep_network_order() {
        let records = solution().net_replenishment_records();
        assert_eq!(records[0].name, "A");
        assert_eq!(records[1].net_replenishment_period, 5.0);
    }

    #[test]
    fn summary_lists_stocking_stages() {
        let summary = solution().summary();
        assert!(summary.contains("Status: converged"));
        assert!(summary.contains("Stocking Stages: 1 of 2"));
        assert!(summary.contains("[STOCK] B"));
        assert!(summary.contains("[PASS]  A"));
    }

    #[test]
    fn json_reports_seconds() {
        let json = serde_json::to_value(solution()).unwrap();
        assert_eq!(json["termination"], "converged");
        assert_eq!(json["solve_time_seconds"], 0.012);
    }
}
