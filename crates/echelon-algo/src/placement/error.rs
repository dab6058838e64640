use echelon_core::{EchelonError, NodeId};
use thiserror::Error;

use super::backend::SolveStatus;

/// Errors raised while placing safety stock.
#[derive(Error, Debug)]
pub enum PlacementError {
    #[error("network has no stages to place stock at")]
    EmptyNetwork,

    /// The solver did not return an optimal point. Fatal: the same model
    /// cannot become feasible by solving it again.
    #[error("solver returned {status} on iteration {iteration}")]
    NonOptimal { iteration: usize, status: SolveStatus },

    #[error("invalid placement configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Network(#[from] EchelonError),

    /// The backend returned no value for a stage in the model
    #[error("solver returned no service times for stage {node}")]
    MissingValue { node: NodeId },
}
