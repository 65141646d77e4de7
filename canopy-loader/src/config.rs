use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

/// The `grammars.toml` runtime file naming every grammar the process
/// supports.
///
/// ```toml
/// [[grammar]]
/// name = "json"
///
/// [[grammar]]
/// name = "go"
/// library = "/opt/grammars/libtree-sitter-go.so"
/// ```
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Configuration {
    pub grammar: Vec<GrammarConfiguration>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GrammarConfiguration {
    pub name: String,
    /// Overrides the default `<runtime>/grammars/<name>` library location.
    pub library: Option<PathBuf>,
}

impl Configuration {
    pub fn load(path: &Path) -> Result<Configuration> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read grammar configuration {}", path.display()))?;
        toml::from_str(&raw)
            .with_context(|| format!("invalid grammar configuration {}", path.display()))
    }
}
