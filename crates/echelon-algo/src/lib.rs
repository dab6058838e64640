//! # echelon-algo: Safety-Stock Placement
//!
//! Optimization algorithms over the supply networks of `echelon-core`.
//!
//! ## Placement
//!
//! [`placement`] places safety stock in a multi-echelon network under the
//! guaranteed-service model. The concave holding cost is replaced by tangent
//! lines that are re-derived from the solver's own output until tangent and
//! true cost agree.
//!
//! ### Architecture
//!
//! The loop is split along two strategy traits:
//!
//! - **[`placement::ConcaveCost`]**: the cost of holding stock for a net
//!   replenishment period ([`placement::SquareRoot`] by default)
//! - **[`placement::ServiceTimeBackend`]**: the MIP solver behind each pass
//!   ([`placement::GoodLpBackend`], using `good_lp`)
//!
//! [`placement::PlacementController`] owns the tangent table and the loop
//! state and never shares them between runs.
//!
//! ## Example
//!
//! ```
//! use echelon_algo::placement::{solve_placement, PlacementConfig, Termination};
//! use echelon_core::{Network, Stage};
//!
//! let mut network = Network::new();
//! let part = network.add_stage(Stage::new("part", 2.0, 1.0));
//! let assembly = network.add_stage(Stage::new("assembly", 3.0, 2.0));
//! network.add_link(part, assembly)?;
//!
//! let solution = solve_placement(&network, &PlacementConfig::default())?;
//! assert_ne!(solution.termination, Termination::ExceededBound);
//! println!("{}", solution.summary());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod placement;

pub use placement::{solve_placement, PlacementConfig, PlacementError, PlacementSolution, Termination};
