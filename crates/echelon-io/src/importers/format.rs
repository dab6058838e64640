//! Format detection and unified import interface.

use std::path::Path;

use anyhow::{anyhow, Result};

use super::ImportResult;

/// Supported graph formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// Line-oriented `node` / `edge` records
    Dag,
    /// `{ "nodes": [...], "edges": [...] }` documents
    Json,
}

impl Format {
    pub const ALL: &'static [Format] = &[Format::Dag, Format::Json];

    /// Expected file extensions for this format.
    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            Format::Dag => &["txt", "dag"],
            Format::Json => &["json"],
        }
    }

    pub fn friendly_name(&self) -> &'static str {
        match self {
            Format::Dag => "DAG text",
            Format::Json => "JSON graph",
        }
    }

    pub fn command_name(&self) -> &'static str {
        match self {
            Format::Dag => "dag",
            Format::Json => "json",
        }
    }

    /// Detect the format from the file extension.
    pub fn detect(path: &Path) -> Option<Format> {
        let ext = path.extension()?.to_str()?;
        Self::ALL
            .iter()
            .copied()
            .find(|format| format.extensions().iter().any(|e| e.eq_ignore_ascii_case(ext)))
    }

    /// Parse a file in this format. Validation is left to the caller.
    pub fn parse(&self, path: &Path) -> Result<ImportResult> {
        match self {
            Format::Dag => super::parse_dag(path),
            Format::Json => super::parse_json(path),
        }
    }
}

impl std::fmt::Display for Format {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.friendly_name())
    }
}

impl std::str::FromStr for Format {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.to_ascii_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|f| f.command_name() == normalized || f.extensions().contains(&normalized.as_str()))
            .ok_or_else(|| {
                let names: Vec<_> = Self::ALL.iter().map(|f| f.command_name()).collect();
                anyhow!("unknown graph format '{}'; supported: {}", s, names.join(", "))
            })
    }
}
