//! Tab-separated net replenishment periods, one stage per line.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use echelon_algo::placement::NetReplenishmentRecord;

/// Default file name of the export.
pub const DEFAULT_OUTPUT_FILE: &str = "mip solution.txt";

/// Write `name<TAB>period` lines to a file, replacing any existing content.
pub fn write_net_replenishment(
    output_path: impl AsRef<Path>,
    records: &[NetReplenishmentRecord],
) -> Result<()> {
    let output_path = output_path.as_ref();
    let file = File::create(output_path)
        .with_context(|| format!("creating output file: {}", output_path.display()))?;
    let mut writer = BufWriter::new(file);
    write_net_replenishment_to_writer(&mut writer, records)?;
    writer
        .flush()
        .with_context(|| format!("writing output file: {}", output_path.display()))
}

/// Periods use the shortest representation that reads back to the same value.
pub fn write_net_replenishment_to_writer<W: Write>(
    writer: &mut W,
    records: &[NetReplenishmentRecord],
) -> Result<()> {
    for record in records {
        writeln!(writer, "{}\t{}", record.name, record.net_replenishment_period)?;
    }
    Ok(())
}
