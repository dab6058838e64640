//! Guaranteed-service feasibility model.
//!
//! Everything here is independent of the tangent coefficients: the polytope
//! is built once per run and only the objective changes between passes.

use echelon_core::{cumulative_lead_times, longest_lead_time_path, Diagnostics, EchelonError, Network, NodeId};
use serde::Serialize;

use super::approximation::ApproximationTable;
use super::backend::NodeServiceTimes;
use super::cost::Tangent;
use super::error::PlacementError;

/// Solver-facing view of one stage.
#[derive(Debug, Clone, Serialize)]
pub struct StageData {
    pub id: NodeId,
    pub name: String,
    pub lead_time: f64,
    pub holding_cost: f64,
    /// Upper bound on the outbound service time, if any
    pub committed_service_time: Option<f64>,
    /// Longest lead-time chain feeding the stage; bounds the inbound service time
    pub max_inbound_service_time: f64,
    pub suppliers: Vec<NodeId>,
}

impl StageData {
    /// Upper bound on the outbound service time used for the variable domain.
    pub fn max_outbound_service_time(&self) -> f64 {
        let through = self.max_inbound_service_time + self.lead_time;
        self.committed_service_time.map_or(through, |c| c.min(through))
    }
}

/// One weighted surrogate term `h · (slope · NRP + y · intercept)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObjectiveTerm {
    pub node: NodeId,
    pub holding_cost: f64,
    pub lead_time: f64,
    pub tangent: Tangent,
}

impl ObjectiveTerm {
    pub fn evaluate(&self, values: &NodeServiceTimes) -> f64 {
        let nrp = values.net_replenishment_period(self.lead_time);
        self.holding_cost * self.tangent.evaluate(nrp, values.indicator)
    }
}

/// The base model: stage data in network order plus the indicator constant.
///
/// ```text
/// SI(j) ≥ S(i)                  every link i → j
/// S(j)  ≤ SI(j) + L(j)          non-negative net replenishment period
/// S(j)  ≤ committed(j)          where a service time is promised
/// SI(j) ≤ upstream(j)           longest lead-time chain into j
/// SI(j) + L(j) − S(j) ≤ M·y(j)  indicator switches the intercept on
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct ServiceTimeModel {
    stages: Vec<StageData>,
    big_m: f64,
}

impl ServiceTimeModel {
    /// Build the model, rejecting networks that fail validation.
    ///
    /// `big_m` overrides the derived constant; values below the longest
    /// cumulative lead time would cut off feasible placements and are refused.
    pub fn build(network: &Network, big_m: Option<f64>) -> Result<Self, PlacementError> {
        if network.is_empty() {
            return Err(PlacementError::EmptyNetwork);
        }

        let mut diagnostics = Diagnostics::new();
        network.validate_into(&mut diagnostics);
        if let Some(issue) = diagnostics.errors().next() {
            return Err(PlacementError::Network(EchelonError::Validation(format!(
                "{} ({})",
                issue,
                diagnostics.summary()
            ))));
        }

        let cumulative = cumulative_lead_times(network)?;
        let derived = longest_lead_time_path(&cumulative) + 1.0;
        let big_m = match big_m {
            None => derived,
            Some(value) if value.is_finite() && value >= derived => value,
            Some(value) => {
                return Err(PlacementError::Config(format!(
                    "big_m {value} must be finite and at least {derived} for this network"
                )))
            }
        };

        let stages = network
            .stages()
            .map(|stage| StageData {
                id: stage.id,
                name: stage.name.clone(),
                lead_time: stage.lead_time,
                holding_cost: stage.holding_cost,
                committed_service_time: network.committed_service_time(stage.id),
                max_inbound_service_time: cumulative.get(&stage.id).map_or(0.0, |c| c.upstream),
                suppliers: network.predecessors(stage.id),
            })
            .collect();

        Ok(Self { stages, big_m })
    }

    pub fn stages(&self) -> &[StageData] {
        &self.stages
    }

    pub fn stage(&self, id: NodeId) -> Option<&StageData> {
        self.stages.iter().find(|s| s.id == id)
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    pub fn big_m(&self) -> f64 {
        self.big_m
    }

    /// Surrogate objective for the current tangents, in stage order.
    pub fn objective(&self, table: &ApproximationTable) -> Result<Vec<ObjectiveTerm>, PlacementError> {
        self.stages
            .iter()
            .map(|stage| {
                let tangent = table
                    .get(stage.id)
                    .ok_or(PlacementError::MissingValue { node: stage.id })?;
                Ok(ObjectiveTerm {
                    node: stage.id,
                    holding_cost: stage.holding_cost,
                    lead_time: stage.lead_time,
                    tangent,
                })
            })
            .collect()
    }
}
