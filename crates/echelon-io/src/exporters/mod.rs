//! Placement result writers.

mod net_replenishment;
mod report;

pub use net_replenishment::{
    write_net_replenishment, write_net_replenishment_to_writer, DEFAULT_OUTPUT_FILE,
};
pub use report::write_solution_json;
