//! JSON placement report.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use echelon_algo::placement::PlacementSolution;

/// Write the full solution, including the pass history, as pretty JSON.
pub fn write_solution_json(output_path: impl AsRef<Path>, solution: &PlacementSolution) -> Result<()> {
    let output_path = output_path.as_ref();
    let file = File::create(output_path)
        .with_context(|| format!("creating report file: {}", output_path.display()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, solution).context("serializing placement report")?;
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}
