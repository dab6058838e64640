//! # echelon-io: Supply Network I/O
//!
//! Reads supply networks from disk and writes placement results.
//!
//! ## Supported Formats
//!
//! | Format | File Extensions | Notes |
//! |--------|-----------------|-------|
//! | DAG text | `.txt`, `.dag` | `node` / `edge` records, `#` comments |
//! | JSON | `.json` | `nodes` / `edges` document |
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use echelon_algo::placement::{solve_placement, PlacementConfig};
//! use echelon_io::exporters::{write_net_replenishment, DEFAULT_OUTPUT_FILE};
//! use echelon_io::importers::load_network;
//!
//! fn main() -> anyhow::Result<()> {
//!     let network = load_network("DAG.txt")?.network;
//!     let solution = solve_placement(&network, &PlacementConfig::default())?;
//!     write_net_replenishment(DEFAULT_OUTPUT_FILE, &solution.net_replenishment_records())?;
//!     Ok(())
//! }
//! ```

pub mod exporters;
pub mod importers;

pub use importers::{load_network, Format, ImportResult};
