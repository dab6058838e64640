//! Supply network importers.
//!
//! - **DAG text** (`.txt`, `.dag`) - one `node` or `edge` record per line
//! - **JSON** (`.json`) - a `nodes` / `edges` document
//!
//! Every parser returns an [`ImportResult`] whose diagnostics carry the
//! problems found on the way. [`load_network`] adds structural validation and
//! refuses networks with error-severity issues.
//!
//! ```no_run
//! use echelon_io::importers::load_network;
//!
//! let result = load_network("DAG.txt")?;
//! println!("{} ({})", result.network.stats(), result.diagnostics.summary());
//! # Ok::<(), anyhow::Error>(())
//! ```

use std::path::Path;

use anyhow::{anyhow, bail, Result};
use echelon_core::{Diagnostics, Network};

mod dag;
mod format;
mod json;

pub use dag::{parse_dag, parse_dag_str};
pub use format::Format;
pub use json::{parse_json, parse_json_str, EdgeRecord, GraphDocument, NodeRecord};

/// A parsed network together with what was noticed while reading it.
#[derive(Debug)]
pub struct ImportResult {
    pub network: Network,
    pub diagnostics: Diagnostics,
}

/// Load and validate a network, detecting the format from the extension.
pub fn load_network(path: impl AsRef<Path>) -> Result<ImportResult> {
    let path = path.as_ref();
    let format = Format::detect(path).ok_or_else(|| {
        anyhow!(
            "cannot detect graph format of {}; expected one of: .txt, .dag, .json",
            path.display()
        )
    })?;
    load_network_as(path, format)
}

/// Load and validate a network in a known format.
pub fn load_network_as(path: impl AsRef<Path>, format: Format) -> Result<ImportResult> {
    let path = path.as_ref();
    let mut result = format.parse(path)?;
    result.network.validate_into(&mut result.diagnostics);
    if result.diagnostics.has_errors() {
        bail!(
            "{} is not a usable supply network:\n{}",
            path.display(),
            result.diagnostics
        );
    }
    Ok(result)
}
