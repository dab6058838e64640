//! Safety-Stock Placement
//!
//! Decides where a multi-echelon supply network holds safety stock under the
//! guaranteed-service model, by successive linearization of a concave cost.
//!
//! ## Problem Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  SAFETY-STOCK PLACEMENT                                                 │
//! │  ──────────────────────                                                 │
//! │                                                                         │
//! │  Given:                                                                 │
//! │    • Stages with lead time L and holding cost h                         │
//! │    • Supply links (upstream stage feeds downstream stage)               │
//! │    • Service promised to external customers                             │
//! │                                                                         │
//! │  Decide:                                                                │
//! │    • Outbound service time S of every stage (continuous)                │
//! │    • Inbound service time SI of every stage (continuous)                │
//! │                                                                         │
//! │  Minimize:                                                              │
//! │    Σ h · √(SI + L − S)      safety stock held for the net               │
//! │                             replenishment period                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Linearized MILP
//!
//! The square root is concave, so a MIP solver cannot minimise it directly.
//! Each pass replaces it with a tangent line per stage:
//!
//! ```text
//! minimize    Σ_j h_j · (α_j · (SI_j + L_j − S_j) + β_j · y_j)
//!
//! subject to:
//!   SI_j ≥ S_i                     every link i → j
//!   S_j ≤ SI_j + L_j               net replenishment period ≥ 0
//!   S_j ≤ committed_j              demand stages promise 0 by default
//!   SI_j + L_j − S_j ≤ M · y_j     y_j switches the intercept β_j on
//!   y_j ∈ {0,1}
//! ```
//!
//! The indicator lets a stage with zero net replenishment period drop its
//! intercept, matching `√0 = 0`. `M` is derived from the longest cumulative
//! lead time of the network.
//!
//! ## Iteration
//!
//! After each solve the weighted gap between tangent and true cost is
//! measured. The loop stops when it is within `ε / N`, when it repeats the
//! previous pass exactly (a stall), or when an optional pass limit runs out.
//! Otherwise every poorly fit stage gets a new tangent at its solved period
//! and the model is solved again.
//!
//! The result is a local optimum; nothing here proves global optimality.

mod approximation;
mod backend;
mod config;
mod controller;
mod cost;
mod error;
mod model;
mod solution;

pub use approximation::{ApproximationTable, INITIAL_EXPANSION_POINT, LOCAL_FIT_THRESHOLD};
pub use backend::{
    GoodLpBackend, LpSolverKind, NodeServiceTimes, ServiceTimeBackend, ServiceTimes, SolveOutcome,
    SolveStatus,
};
pub use config::PlacementConfig;
pub use controller::{solve_placement, IterationState, LoopState, PlacementController};
pub use cost::{
    round_to, ConcaveCost, SquareRoot, Tangent, DEGENERATE_SLOPE, SOLUTION_DECIMALS,
    TANGENT_DECIMALS,
};
pub use error::PlacementError;
pub use model::{ObjectiveTerm, ServiceTimeModel, StageData};
pub use solution::{
    true_total_cost, IterationRecord, NetReplenishmentRecord, NodePlacement, PlacementSolution,
    Termination,
};
