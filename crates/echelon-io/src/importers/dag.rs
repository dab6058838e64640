//! Plain-text DAG parser
//!
//! ```text
//! # comment
//! node <name> <lead_time> <holding_cost> [max_service_time]
//! edge <upstream> <downstream>
//! ```
//!
//! Edges may name stages declared further down the file.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use echelon_core::{Diagnostics, Network, Stage};

use super::ImportResult;

/// Parse a DAG text file
pub fn parse_dag(path: &Path) -> Result<ImportResult> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading DAG file: {}", path.display()))?;
    Ok(parse_dag_str(&content))
}

/// Parse DAG content from a string.
///
/// Malformed lines are reported as diagnostics with their line number; the
/// remaining lines are still imported.
pub fn parse_dag_str(content: &str) -> ImportResult {
    let mut network = Network::new();
    let mut diagnostics = Diagnostics::new();
    let mut edges: Vec<(usize, &str, &str)> = Vec::new();

    for (idx, line) in content.lines().enumerate() {
        let line_no = idx + 1;
        let trimmed = line.split('#').next().unwrap_or("").trim();
        if trimmed.is_empty() {
            continue;
        }

        let fields: Vec<&str> = trimmed.split_whitespace().collect();
        match fields[0].to_ascii_lowercase().as_str() {
            "node" => match parse_node(&fields[1..]) {
                Ok(stage) => {
                    if network.find_by_name(&stage.name).is_some() {
                        diagnostics.add_error_at_line(
                            "parse",
                            &format!("duplicate stage '{}'", stage.name),
                            line_no,
                        );
                    } else {
                        network.add_stage(stage);
                    }
                }
                Err(message) => diagnostics.add_error_at_line("parse", &message, line_no),
            },
            "edge" => {
                if fields.len() == 3 {
                    edges.push((line_no, fields[1], fields[2]));
                } else {
                    diagnostics.add_error_at_line(
                        "parse",
                        "expected 'edge <upstream> <downstream>'",
                        line_no,
                    );
                }
            }
            other => diagnostics.add_error_at_line(
                "parse",
                &format!("unknown keyword '{other}'"),
                line_no,
            ),
        }
    }

    for (line_no, upstream, downstream) in edges {
        let Some(from) = network.find_by_name(upstream) else {
            diagnostics.add_error_at_line("parse", &format!("unknown stage '{upstream}'"), line_no);
            continue;
        };
        let Some(to) = network.find_by_name(downstream) else {
            diagnostics.add_error_at_line("parse", &format!("unknown stage '{downstream}'"), line_no);
            continue;
        };
        if let Err(err) = network.add_link(from, to) {
            diagnostics.add_error_at_line("structure", &err.to_string(), line_no);
        }
    }

    ImportResult {
        network,
        diagnostics,
    }
}

fn parse_node(fields: &[&str]) -> std::result::Result<Stage, String> {
    if !(3..=4).contains(&fields.len()) {
        return Err(
            "expected 'node <name> <lead_time> <holding_cost> [max_service_time]'".to_string(),
        );
    }
    let number = |label: &str, raw: &str| {
        raw.parse::<f64>()
            .map_err(|_| format!("invalid {label} '{raw}' for stage '{}'", fields[0]))
    };
    let mut stage = Stage::new(
        fields[0],
        number("lead time", fields[1])?,
        number("holding cost", fields[2])?,
    );
    if let Some(&raw) = fields.get(3) {
        stage = stage.with_max_service_time(number("service time", raw)?);
    }
    Ok(stage)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
# two-stage chain
node A 2 1
node B 3 2.5 1   # promises one period
edge A B
";

    #[test]
    fn parses_nodes_and_edges() {
        let result = parse_dag_str(SAMPLE);
        assert!(!result.diagnostics.has_errors(), "{}", result.diagnostics);

        let network = result.network;
        let a = network.find_by_name("A").unwrap();
        let b = network.find_by_name("B").unwrap();
        assert_eq!(network.successors(a), vec![b]);
        let stage_b = network.stage(b).unwrap();
        assert_eq!(stage_b.holding_cost, 2.5);
        assert_eq!(stage_b.max_service_time, Some(1.0));
    }

    #[test]
    fn edges_may_precede_nodes() {
        let result = parse_dag_str("edge A B\nnode A 1 1\nnode B 1 1\n");
        assert!(!result.diagnostics.has_errors());
        assert_eq!(result.network.stats().num_links, 1);
    }

    #[test]
    fn reports_bad_lines_with_numbers() {
        let result = parse_dag_str("node A x 1\nlink A B\nnode A 1 1\nnode A 2 2\nedge A C\n");
        let lines: Vec<_> = result.diagnostics.errors().filter_map(|i| i.line).collect();
        assert_eq!(lines, vec![1, 2, 4, 5]);
        assert!(result.diagnostics.errors().any(|i| i.message.contains("unknown stage 'C'")));
    }

    #[test]
    fn reads_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("DAG.txt");
        std::fs::write(&path, SAMPLE).unwrap();
        let result = parse_dag(&path).unwrap();
        assert_eq!(result.network.len(), 2);

        let missing = parse_dag(&dir.path().join("missing.txt")).unwrap_err();
        assert!(missing.to_string().contains("reading DAG file"));
    }
}
