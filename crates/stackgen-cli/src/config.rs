//! CLI configuration loaded from `stackgen.toml`

use crate::{CliError, Result};
use serde::{Deserialize, Serialize};
use stackgen_wasm::CodegenOptions;
use std::path::Path;

/// Shape of the written output
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    /// Concatenated function bodies, relocations left unpatched
    #[default]
    Binary,
    /// One line per function with hex encoded type and body
    Hex,
    /// Decoded instruction listing
    Listing,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub format: OutputFormat,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StackgenConfig {
    /// Code generator settings
    pub codegen: CodegenOptions,

    /// Output settings
    pub output: OutputConfig,
}

impl StackgenConfig {
    pub const DEFAULT_FILE: &'static str = "stackgen.toml";

    /// Load from an explicit path, or from `stackgen.toml` in the working
    /// directory when it exists. Falls back to defaults otherwise.
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        if let Some(path) = config_path {
            return Self::load_from_file(path);
        }
        let local = Path::new(Self::DEFAULT_FILE);
        if local.exists() {
            return Self::load_from_file(local);
        }
        Ok(Self::default())
    }

    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            CliError::Config(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::from_toml_str(&content).map_err(|e| match e {
            CliError::Config(msg) => {
                CliError::Config(format!("{} ({})", msg, path.display()))
            }
            other => other,
        })
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| CliError::Config(format!("Failed to parse config: {}", e)))
    }
}
