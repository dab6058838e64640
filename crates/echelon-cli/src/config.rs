//! Configuration file handling.
//! Default location: `<config dir>/echelon/config.toml`

use anyhow::{anyhow, Context, Result};
use echelon_algo::placement::PlacementConfig;
use echelon_io::exporters::DEFAULT_OUTPUT_FILE;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct EchelonConfig {
    #[serde(default)]
    pub placement: PlacementConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Where `solve` writes its results
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Net replenishment export
    #[serde(default = "default_output_file")]
    pub file: String,
    /// JSON report, written only when set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub json_report: Option<String>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            file: default_output_file(),
            json_report: None,
        }
    }
}

fn default_output_file() -> String {
    DEFAULT_OUTPUT_FILE.to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl LoggingConfig {
    pub fn tracing_level(&self) -> Result<tracing::Level> {
        self.level
            .parse()
            .map_err(|_| anyhow!("invalid log level '{}' in configuration", self.level))
    }
}

/// Default configuration file location
pub fn config_path() -> Result<PathBuf> {
    let dir = dirs::config_dir().ok_or_else(|| anyhow!("unable to determine config directory"))?;
    Ok(dir.join("echelon").join("config.toml"))
}

/// Load configuration.
///
/// An explicit path must exist; a missing default file yields the defaults.
pub fn load_config(explicit: Option<&Path>) -> Result<EchelonConfig> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => match config_path() {
            Ok(path) if path.exists() => path,
            _ => return Ok(EchelonConfig::default()),
        },
    };
    let contents = std::fs::read_to_string(&path)
        .with_context(|| format!("reading config file: {}", path.display()))?;
    parse_config(&contents).with_context(|| format!("parsing config file: {}", path.display()))
}

pub fn parse_config(contents: &str) -> Result<EchelonConfig> {
    let config: EchelonConfig = toml::from_str(contents)?;
    config.placement.validate()?;
    config.logging.tracing_level()?;
    Ok(config)
}

/// Write the default configuration unless the file already exists.
/// Returns whether a file was written.
pub fn init_config(path: &Path) -> Result<bool> {
    if path.exists() {
        return Ok(false);
    }
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("creating config directory: {}", dir.display()))?;
    }
    let contents = toml::to_string_pretty(&EchelonConfig::default())?;
    std::fs::write(path, contents)
        .with_context(|| format!("writing config file: {}", path.display()))?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use echelon_algo::placement::LpSolverKind;

    #[test]
    fn config_path_ends_with_echelon_toml() {
        if let Ok(path) = config_path() {
            assert!(path.ends_with("echelon/config.toml"));
        }
    }

    #[test]
    fn empty_file_gives_defaults() {
        let config = parse_config("").unwrap();
        assert_eq!(config.placement.epsilon, 0.1);
        assert_eq!(config.output.file, "mip solution.txt");
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn reads_placement_section() {
        let config = parse_config(
            r#"
[placement]
epsilon = 0.01
max_iterations = 25
solver = "microlp"

[output]
file = "periods.tsv"
"#,
        )
        .unwrap();
        assert_eq!(config.placement.epsilon, 0.01);
        assert_eq!(config.placement.max_iterations, Some(25));
        assert_eq!(config.placement.solver, LpSolverKind::Microlp);
        assert_eq!(config.output.file, "periods.tsv");
    }

    #[test]
    fn rejects_invalid_values() {
        assert!(parse_config("[placement]\nepsilon = -1.0\n").is_err());
        assert!(parse_config("[logging]\nlevel = \"loud\"\n").is_err());
    }

    #[test]
    fn init_writes_once_and_reads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        assert!(init_config(&path).unwrap());
        assert!(!init_config(&path).unwrap());
        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.placement, PlacementConfig::default());
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_config(Some(&dir.path().join("absent.toml"))).is_err());
    }
}
