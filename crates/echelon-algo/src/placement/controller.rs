//! Successive linearization loop.

use std::time::Instant;

use echelon_core::Network;
use tracing::{debug, info, warn};

use super::approximation::ApproximationTable;
use super::backend::{GoodLpBackend, ServiceTimeBackend, ServiceTimes};
use super::config::PlacementConfig;
use super::cost::{round_to, ConcaveCost, SquareRoot, SOLUTION_DECIMALS};
use super::error::PlacementError;
use super::model::ServiceTimeModel;
use super::solution::{node_placements, true_total_cost, IterationRecord, PlacementSolution, Termination};

/// Where the controller is in its pass loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Running,
    Converged,
    Stalled,
    ExceededBound,
    /// The last solve was not optimal; the run is over
    Infeasible,
}

impl LoopState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, LoopState::Running)
    }
}

/// Counters carried between passes.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct IterationState {
    pub iteration: usize,
    /// Total error of the previous pass
    pub previous_error: Option<f64>,
    /// True total cost recorded when the loop stops
    pub converged_value: Option<f64>,
}

/// A solved pass kept for result extraction.
#[derive(Debug, Clone)]
struct Pass {
    service_times: ServiceTimes,
    objective_value: f64,
    total_error: f64,
    true_cost: f64,
    /// Tangents the pass was solved with
    tangents: ApproximationTable,
}

/// Drives solve / measure / update passes over one network.
///
/// Tangent coefficients live in the controller, so separate runs never share
/// them.
#[derive(Debug)]
pub struct PlacementController<'a> {
    network: &'a Network,
    config: PlacementConfig,
    model: ServiceTimeModel,
    cost: Box<dyn ConcaveCost>,
    table: ApproximationTable,
    iteration: IterationState,
    state: LoopState,
    last: Option<Pass>,
    best: Option<Pass>,
    history: Vec<IterationRecord>,
}

impl<'a> PlacementController<'a> {
    pub fn new(network: &'a Network, config: PlacementConfig) -> Result<Self, PlacementError> {
        config.validate()?;
        let model = ServiceTimeModel::build(network, config.big_m)?;
        let cost: Box<dyn ConcaveCost> = Box::new(SquareRoot);
        let table = ApproximationTable::new(network.stages().map(|s| s.id), cost.as_ref());
        Ok(Self {
            network,
            config,
            model,
            cost,
            table,
            iteration: IterationState::default(),
            state: LoopState::Running,
            last: None,
            best: None,
            history: Vec::new(),
        })
    }

    /// Replace the concave cost. Tangents restart from the new function.
    pub fn with_cost(mut self, cost: Box<dyn ConcaveCost>) -> Self {
        self.table = ApproximationTable::new(self.network.stages().map(|s| s.id), cost.as_ref());
        self.cost = cost;
        self
    }

    pub fn approximations(&self) -> &ApproximationTable {
        &self.table
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn iteration_state(&self) -> &IterationState {
        &self.iteration
    }

    pub fn model(&self) -> &ServiceTimeModel {
        &self.model
    }

    pub fn history(&self) -> &[IterationRecord] {
        &self.history
    }

    /// Run one pass. Terminal states are returned without solving again.
    pub fn step(&mut self, backend: &dyn ServiceTimeBackend) -> Result<LoopState, PlacementError> {
        if self.state.is_terminal() {
            return Ok(self.state);
        }

        self.iteration.iteration += 1;
        let iteration = self.iteration.iteration;

        let objective = self.model.objective(&self.table)?;
        let outcome = backend.solve(&self.model, &objective)?;
        if !outcome.status.is_optimal() {
            self.state = LoopState::Infeasible;
            warn!(iteration, status = %outcome.status, backend = backend.id(), "solve was not optimal");
            return Err(PlacementError::NonOptimal {
                iteration,
                status: outcome.status,
            });
        }

        let mut total_error = 0.0;
        for stage in self.model.stages() {
            let values = outcome.service_times.require(stage.id)?;
            let nrp = round_to(values.net_replenishment_period(stage.lead_time), SOLUTION_DECIMALS);
            total_error += stage.holding_cost
                * self
                    .table
                    .node_error(stage.id, nrp, values.indicator, self.cost.as_ref());
        }
        let true_cost = true_total_cost(self.network, &outcome.service_times, self.cost.as_ref())?;

        info!(
            iteration,
            total_error,
            surrogate = outcome.objective_value,
            true_cost,
            "placement pass"
        );

        let tolerance = self.config.epsilon / self.model.len() as f64;
        self.state = if total_error <= tolerance {
            LoopState::Converged
        } else if self
            .iteration
            .previous_error
            .is_some_and(|previous| (total_error - previous).abs() <= self.config.stall_tolerance)
        {
            warn!(iteration, total_error, "approximation error stopped improving");
            LoopState::Stalled
        } else if self
            .config
            .max_iterations
            .is_some_and(|limit| iteration >= limit)
        {
            warn!(iteration, total_error, "iteration bound reached before convergence");
            LoopState::ExceededBound
        } else {
            LoopState::Running
        };

        let tangents = self.table.clone();
        let updated_nodes = if self.state == LoopState::Running {
            self.iteration.previous_error = Some(total_error);
            self.update_tangents(&outcome.service_times)?
        } else {
            0
        };

        self.history.push(IterationRecord {
            iteration,
            total_error,
            surrogate_objective: outcome.objective_value,
            true_total_cost: true_cost,
            updated_nodes,
        });

        let pass = Pass {
            service_times: outcome.service_times,
            objective_value: outcome.objective_value,
            total_error,
            true_cost,
            tangents,
        };
        if self.best.as_ref().map_or(true, |best| pass.true_cost < best.true_cost) {
            self.best = Some(pass.clone());
        }
        self.last = Some(pass);

        if matches!(self.state, LoopState::Converged | LoopState::Stalled) {
            self.iteration.converged_value = Some(true_cost);
        }
        Ok(self.state)
    }

    fn update_tangents(&mut self, service_times: &ServiceTimes) -> Result<usize, PlacementError> {
        let mut updated = 0;
        for stage in self.model.stages() {
            let values = service_times.require(stage.id)?;
            let nrp = round_to(values.net_replenishment_period(stage.lead_time), SOLUTION_DECIMALS);
            let changed = self.table.refresh(
                stage.id,
                nrp,
                values.indicator,
                self.cost.as_ref(),
                self.config.local_threshold,
            );
            if changed {
                updated += 1;
            }
            debug!(
                stage = %stage.name,
                nrp,
                indicator = values.indicator,
                changed,
                "tangent update"
            );
        }
        Ok(updated)
    }

    /// Step until a terminal state and extract the result.
    pub fn run(&mut self, backend: &dyn ServiceTimeBackend) -> Result<PlacementSolution, PlacementError> {
        let start = Instant::now();
        while self.step(backend)? == LoopState::Running {}

        let (termination, pass) = match self.state {
            LoopState::Converged => (Termination::Converged, self.last.as_ref()),
            LoopState::Stalled => (Termination::Stalled, self.last.as_ref()),
            LoopState::ExceededBound => (Termination::ExceededBound, self.best.as_ref()),
            LoopState::Running | LoopState::Infeasible => {
                return Err(PlacementError::Config(format!(
                    "placement loop stopped in state {:?}",
                    self.state
                )))
            }
        };
        let pass = pass.ok_or(PlacementError::EmptyNetwork)?;

        let nodes = node_placements(self.network, &pass.service_times, &pass.tangents, self.cost.as_ref())?;
        info!(
            termination = %termination,
            true_total_cost = pass.true_cost,
            iterations = self.iteration.iteration,
            "placement finished"
        );

        Ok(PlacementSolution {
            termination,
            true_total_cost: pass.true_cost,
            surrogate_objective: pass.objective_value,
            total_error: pass.total_error,
            iterations: self.iteration.iteration,
            solver: backend.id().to_string(),
            nodes,
            solve_time: start.elapsed(),
            history: self.history.clone(),
        })
    }
}

/// Place safety stock with the `good_lp` backend selected in `config`.
///
/// # Example
///
/// ```
/// use echelon_algo::placement::{solve_placement, PlacementConfig};
/// use echelon_core::{Network, Stage};
///
/// let mut network = Network::new();
/// network.add_stage(Stage::new("retail", 0.0, 1.0));
///
/// let solution = solve_placement(&network, &PlacementConfig::default())?;
/// assert_eq!(solution.true_total_cost, 0.0);
/// # Ok::<(), echelon_algo::placement::PlacementError>(())
/// ```
pub fn solve_placement(network: &Network, config: &PlacementConfig) -> Result<PlacementSolution, PlacementError> {
    let backend = GoodLpBackend::new(config.solver);
    PlacementController::new(network, config.clone())?.run(&backend)
}
