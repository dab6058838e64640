use serde::{Deserialize, Serialize};

use super::approximation::LOCAL_FIT_THRESHOLD;
use super::backend::LpSolverKind;
use super::error::PlacementError;

/// Settings of one placement run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacementConfig {
    /// Total error tolerance; a pass converges once the weighted error is
    /// at most `epsilon / stage_count`
    #[serde(default = "default_epsilon")]
    pub epsilon: f64,
    /// Safety bound on solver passes (unbounded when unset)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_iterations: Option<usize>,
    /// Largest error change still treated as a stall
    #[serde(default)]
    pub stall_tolerance: f64,
    #[serde(default = "default_local_threshold")]
    pub local_threshold: f64,
    /// Indicator constant; derived from the network when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub big_m: Option<f64>,
    #[serde(default)]
    pub solver: LpSolverKind,
}

fn default_epsilon() -> f64 {
    0.1
}

fn default_local_threshold() -> f64 {
    LOCAL_FIT_THRESHOLD
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            epsilon: default_epsilon(),
            max_iterations: None,
            stall_tolerance: 0.0,
            local_threshold: default_local_threshold(),
            big_m: None,
            solver: LpSolverKind::default(),
        }
    }
}

impl PlacementConfig {
    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon;
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = Some(max_iterations);
        self
    }

    pub fn with_solver(mut self, solver: LpSolverKind) -> Self {
        self.solver = solver;
        self
    }

    pub fn validate(&self) -> Result<(), PlacementError> {
        if !self.epsilon.is_finite() || self.epsilon <= 0.0 {
            return Err(PlacementError::Config(format!(
                "epsilon must be a positive number, got {}",
                self.epsilon
            )));
        }
        if self.max_iterations == Some(0) {
            return Err(PlacementError::Config(
                "max_iterations must allow at least one pass".to_string(),
            ));
        }
        if !self.stall_tolerance.is_finite() || self.stall_tolerance < 0.0 {
            return Err(PlacementError::Config(format!(
                "stall_tolerance must be non-negative, got {}",
                self.stall_tolerance
            )));
        }
        if !self.local_threshold.is_finite() || self.local_threshold < 0.0 {
            return Err(PlacementError::Config(format!(
                "local_threshold must be non-negative, got {}",
                self.local_threshold
            )));
        }
        Ok(())
    }
}
