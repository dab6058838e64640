//! MIP backends for the service-time model.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use anyhow::anyhow;
use echelon_core::NodeId;
use good_lp::solvers::microlp::microlp;
use good_lp::{
    constraint, variable, variables, Expression, ResolutionError, Solution, SolverModel, Variable,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::error::PlacementError;
use super::model::{ObjectiveTerm, ServiceTimeModel};

/// Status reported by a backend after one solve.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SolveStatus {
    Optimal,
    Infeasible,
    Unbounded,
    Error(String),
}

impl SolveStatus {
    pub fn is_optimal(&self) -> bool {
        matches!(self, SolveStatus::Optimal)
    }
}

impl fmt::Display for SolveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolveStatus::Optimal => write!(f, "optimal"),
            SolveStatus::Infeasible => write!(f, "infeasible"),
            SolveStatus::Unbounded => write!(f, "unbounded"),
            SolveStatus::Error(msg) => write!(f, "error ({msg})"),
        }
    }
}

/// Solved `(S, SI, y)` of one stage.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct NodeServiceTimes {
    pub outbound: f64,
    pub inbound: f64,
    /// Binary indicator, rounded to the nearest integer
    pub indicator: f64,
}

impl NodeServiceTimes {
    pub fn new(outbound: f64, inbound: f64, indicator: f64) -> Self {
        Self {
            outbound,
            inbound,
            indicator,
        }
    }

    /// `SI + L − S`
    #[inline]
    pub fn net_replenishment_period(&self, lead_time: f64) -> f64 {
        self.inbound + lead_time - self.outbound
    }
}

/// Solved values of every stage of a model.
#[derive(Debug, Clone, Default)]
pub struct ServiceTimes {
    values: HashMap<NodeId, NodeServiceTimes>,
}

impl ServiceTimes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, node: NodeId, values: NodeServiceTimes) {
        self.values.insert(node, values);
    }

    pub fn get(&self, node: NodeId) -> Option<&NodeServiceTimes> {
        self.values.get(&node)
    }

    /// Values of a stage, or [`PlacementError::MissingValue`].
    pub fn require(&self, node: NodeId) -> Result<&NodeServiceTimes, PlacementError> {
        self.values
            .get(&node)
            .ok_or(PlacementError::MissingValue { node })
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl FromIterator<(NodeId, NodeServiceTimes)> for ServiceTimes {
    fn from_iter<I: IntoIterator<Item = (NodeId, NodeServiceTimes)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

/// What a backend hands back from one solve.
#[derive(Debug, Clone)]
pub struct SolveOutcome {
    pub status: SolveStatus,
    /// Surrogate objective at the solved point (0 unless optimal)
    pub objective_value: f64,
    pub service_times: ServiceTimes,
}

impl SolveOutcome {
    pub fn optimal(objective_value: f64, service_times: ServiceTimes) -> Self {
        Self {
            status: SolveStatus::Optimal,
            objective_value,
            service_times,
        }
    }

    /// Outcome of a solve that produced no usable point.
    pub fn failed(status: SolveStatus) -> Self {
        Self {
            status,
            objective_value: 0.0,
            service_times: ServiceTimes::new(),
        }
    }
}

/// Minimises a linear objective over the service-time model.
///
/// A status other than optimal is reported inside the outcome; `Err` is kept
/// for failures that prevent a solve from being attempted at all.
pub trait ServiceTimeBackend {
    /// Returns the backend identifier (e.g., "microlp")
    fn id(&self) -> &str;

    fn solve(
        &self,
        model: &ServiceTimeModel,
        objective: &[ObjectiveTerm],
    ) -> Result<SolveOutcome, PlacementError>;
}

/// MIP engine used through `good_lp`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LpSolverKind {
    /// Pure-Rust branch and bound, always available
    #[default]
    Microlp,
    #[cfg(feature = "solver-coin_cbc")]
    CoinCbc,
    #[cfg(feature = "solver-highs")]
    Highs,
}

impl LpSolverKind {
    pub fn available() -> &'static [&'static str] {
        AVAILABLE_LP_SOLVERS
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LpSolverKind::Microlp => "microlp",
            #[cfg(feature = "solver-coin_cbc")]
            LpSolverKind::CoinCbc => "coin_cbc",
            #[cfg(feature = "solver-highs")]
            LpSolverKind::Highs => "highs",
        }
    }
}

impl fmt::Display for LpSolverKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

const AVAILABLE_LP_SOLVERS: &[&str] = &[
    "microlp",
    #[cfg(feature = "solver-coin_cbc")]
    "coin_cbc",
    #[cfg(feature = "solver-highs")]
    "highs",
];

fn unknown_solver_error(label: &str) -> anyhow::Error {
    anyhow!(
        "unknown mip solver '{}'; supported values: {}",
        label,
        LpSolverKind::available().join(", ")
    )
}

impl FromStr for LpSolverKind {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.to_ascii_lowercase();
        match normalized.as_str() {
            "microlp" => Ok(LpSolverKind::Microlp),
            "coin_cbc" | "cbc" => {
                #[cfg(feature = "solver-coin_cbc")]
                {
                    Ok(LpSolverKind::CoinCbc)
                }
                #[cfg(not(feature = "solver-coin_cbc"))]
                {
                    Err(unknown_solver_error(&normalized))
                }
            }
            "highs" => {
                #[cfg(feature = "solver-highs")]
                {
                    Ok(LpSolverKind::Highs)
                }
                #[cfg(not(feature = "solver-highs"))]
                {
                    Err(unknown_solver_error(&normalized))
                }
            }
            other => Err(unknown_solver_error(other)),
        }
    }
}

/// [`ServiceTimeBackend`] on top of `good_lp`.
#[derive(Debug, Clone, Copy, Default)]
pub struct GoodLpBackend {
    kind: LpSolverKind,
}

/// Variables of one stage.
#[derive(Debug, Clone, Copy)]
struct StageVars {
    outbound: Variable,
    inbound: Variable,
    indicator: Variable,
}

impl GoodLpBackend {
    pub fn new(kind: LpSolverKind) -> Self {
        Self { kind }
    }

    pub fn kind(&self) -> LpSolverKind {
        self.kind
    }
}

impl ServiceTimeBackend for GoodLpBackend {
    fn id(&self) -> &str {
        self.kind.as_str()
    }

    fn solve(
        &self,
        model: &ServiceTimeModel,
        objective: &[ObjectiveTerm],
    ) -> Result<SolveOutcome, PlacementError> {
        let mut vars = variables!();
        let mut stage_vars: HashMap<NodeId, StageVars> = HashMap::with_capacity(model.len());
        for stage in model.stages() {
            let handles = StageVars {
                outbound: vars.add(variable().min(0.0).max(stage.max_outbound_service_time())),
                inbound: vars.add(variable().min(0.0).max(stage.max_inbound_service_time)),
                indicator: vars.add(variable().binary()),
            };
            stage_vars.insert(stage.id, handles);
        }

        // Σ h · (slope · (SI + L − S) + intercept · y)
        let mut objective_expr = Expression::from(0.0);
        for term in objective {
            let handles = stage_vars
                .get(&term.node)
                .ok_or(PlacementError::MissingValue { node: term.node })?;
            let weight = term.holding_cost * term.tangent.slope;
            objective_expr += weight * handles.inbound;
            objective_expr += -weight * handles.outbound;
            objective_expr += weight * term.lead_time;
            objective_expr += (term.holding_cost * term.tangent.intercept) * handles.indicator;
        }

        let unsolved = vars.minimise(objective_expr);
        match self.kind {
            LpSolverKind::Microlp => solve_model(unsolved.using(microlp), model, &stage_vars, objective),
            #[cfg(feature = "solver-coin_cbc")]
            LpSolverKind::CoinCbc => solve_model(
                unsolved.using(good_lp::solvers::coin_cbc::coin_cbc),
                model,
                &stage_vars,
                objective,
            ),
            #[cfg(feature = "solver-highs")]
            LpSolverKind::Highs => solve_model(
                unsolved.using(good_lp::solvers::highs::highs),
                model,
                &stage_vars,
                objective,
            ),
        }
    }
}

fn add_service_time_constraints<M>(
    mut problem: M,
    model: &ServiceTimeModel,
    stage_vars: &HashMap<NodeId, StageVars>,
) -> Result<M, PlacementError>
where
    M: SolverModel,
{
    let big_m = model.big_m();
    for stage in model.stages() {
        let own = stage_vars
            .get(&stage.id)
            .ok_or(PlacementError::MissingValue { node: stage.id })?;

        // Inbound service covers every supplier's outbound promise
        for supplier in &stage.suppliers {
            let upstream = stage_vars
                .get(supplier)
                .ok_or(PlacementError::MissingValue { node: *supplier })?;
            problem = problem.with(constraint!(own.inbound - upstream.outbound >= 0.0));
        }

        problem = problem.with(constraint!(own.outbound - own.inbound <= stage.lead_time));
        problem = problem.with(constraint!(
            own.inbound - own.outbound - big_m * own.indicator <= -stage.lead_time
        ));
    }
    Ok(problem)
}

fn solve_model<M>(
    problem: M,
    model: &ServiceTimeModel,
    stage_vars: &HashMap<NodeId, StageVars>,
    objective: &[ObjectiveTerm],
) -> Result<SolveOutcome, PlacementError>
where
    M: SolverModel<Error = ResolutionError>,
{
    let problem = add_service_time_constraints(problem, model, stage_vars)?;
    let solution = match problem.solve() {
        Ok(solution) => solution,
        Err(ResolutionError::Infeasible) => return Ok(SolveOutcome::failed(SolveStatus::Infeasible)),
        Err(ResolutionError::Unbounded) => return Ok(SolveOutcome::failed(SolveStatus::Unbounded)),
        Err(other) => return Ok(SolveOutcome::failed(SolveStatus::Error(other.to_string()))),
    };

    let service_times: ServiceTimes = stage_vars
        .iter()
        .map(|(id, handles)| {
            let values = NodeServiceTimes::new(
                solution.value(handles.outbound),
                solution.value(handles.inbound),
                solution.value(handles.indicator).round(),
            );
            (*id, values)
        })
        .collect();

    let mut objective_value = 0.0;
    for term in objective {
        objective_value += term.evaluate(service_times.require(term.node)?);
    }
    debug!(objective = objective_value, stages = service_times.len(), "mip solved");

    Ok(SolveOutcome::optimal(objective_value, service_times))
}
