//! Integration tests for the `echelon` binary

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const CHAIN: &str = "\
# two-stage serial chain
node A 2 1
node B 3 2
edge A B
";

fn write(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).unwrap();
    path
}

/// Empty config file so a user's own configuration never leaks into a test.
fn empty_config(dir: &Path) -> PathBuf {
    write(dir, "config.toml", "")
}

#[test]
fn help_lists_commands() {
    cargo_bin_cmd!("echelon")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("solve"))
        .stdout(predicate::str::contains("graph"));
}

#[test]
fn solve_writes_net_replenishment_file() {
    let dir = TempDir::new().unwrap();
    let graph = write(dir.path(), "DAG.txt", CHAIN);
    let out = dir.path().join("mip solution.txt");

    cargo_bin_cmd!("echelon")
        .arg("--config")
        .arg(empty_config(dir.path()))
        .arg("solve")
        .arg(&graph)
        .arg("--out")
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("Optimal value: 4.47"))
        .stdout(predicate::str::contains("Termination: converged"));

    let contents = fs::read_to_string(&out).unwrap();
    let lines: Vec<&str> = contents.lines().collect();
    assert_eq!(lines.len(), 2);
    for line in &lines {
        let fields: Vec<&str> = line.split('\t').collect();
        assert_eq!(fields.len(), 2);
        assert!(fields[1].parse::<f64>().is_ok());
    }
    assert!(lines.iter().any(|line| line.starts_with("A\t")));
    assert!(lines.iter().any(|line| line.starts_with("B\t")));
}

#[test]
fn solve_writes_json_report_when_asked() {
    let dir = TempDir::new().unwrap();
    let graph = write(dir.path(), "DAG.txt", CHAIN);
    let report = dir.path().join("report.json");

    cargo_bin_cmd!("echelon")
        .arg("--config")
        .arg(empty_config(dir.path()))
        .arg("solve")
        .arg(&graph)
        .arg("-o")
        .arg(dir.path().join("periods.txt"))
        .arg("--json")
        .arg(&report)
        .assert()
        .success();

    let value: serde_json::Value = serde_json::from_str(&fs::read_to_string(report).unwrap()).unwrap();
    assert_eq!(value["termination"], "converged");
    assert_eq!(value["nodes"].as_array().map(Vec::len), Some(2));
}

#[test]
fn solve_fails_on_missing_file() {
    let dir = TempDir::new().unwrap();
    cargo_bin_cmd!("echelon")
        .arg("--config")
        .arg(empty_config(dir.path()))
        .arg("solve")
        .arg(dir.path().join("absent.txt"))
        .assert()
        .failure();
}

#[test]
fn solve_rejects_cyclic_network() {
    let dir = TempDir::new().unwrap();
    let graph = write(
        dir.path(),
        "cycle.txt",
        "node A 1 1\nnode B 1 1\nedge A B\nedge B A\n",
    );
    let out = dir.path().join("out.txt");

    cargo_bin_cmd!("echelon")
        .arg("--config")
        .arg(empty_config(dir.path()))
        .arg("solve")
        .arg(&graph)
        .arg("--out")
        .arg(&out)
        .assert()
        .failure();
    assert!(!out.exists());
}

#[test]
fn solve_rejects_bad_epsilon() {
    let dir = TempDir::new().unwrap();
    let graph = write(dir.path(), "DAG.txt", CHAIN);

    cargo_bin_cmd!("echelon")
        .arg("--config")
        .arg(empty_config(dir.path()))
        .arg("solve")
        .arg(&graph)
        .arg("--epsilon")
        .arg("0")
        .arg("--out")
        .arg(dir.path().join("out.txt"))
        .assert()
        .failure();
}

#[test]
fn graph_stats_reports_counts() {
    let dir = TempDir::new().unwrap();
    let graph = write(dir.path(), "DAG.txt", CHAIN);

    cargo_bin_cmd!("echelon")
        .arg("--config")
        .arg(empty_config(dir.path()))
        .args(["graph", "stats"])
        .arg(&graph)
        .assert()
        .success()
        .stdout(predicate::str::contains("Stages        : 2"))
        .stdout(predicate::str::contains("Links         : 1"));
}

#[test]
fn graph_export_emits_dot() {
    let dir = TempDir::new().unwrap();
    let graph = write(dir.path(), "DAG.txt", CHAIN);

    cargo_bin_cmd!("echelon")
        .arg("--config")
        .arg(empty_config(dir.path()))
        .args(["graph", "export"])
        .arg(&graph)
        .assert()
        .success()
        .stdout(predicate::str::contains("digraph"));
}

#[test]
fn config_init_then_show() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("echelon.toml");

    cargo_bin_cmd!("echelon")
        .arg("--config")
        .arg(&path)
        .args(["config", "init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration written"));
    assert!(path.exists());

    fs::write(&path, "[placement]\nepsilon = 0.25\n").unwrap();
    cargo_bin_cmd!("echelon")
        .arg("--config")
        .arg(&path)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("epsilon = 0.25"));
}
