use anyhow::Context;
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::codec::CodecConfig;

#[derive(Debug, Deserialize)]
pub struct Config {
    pub version: u32,
    #[serde(default)]
    pub codec: CodecConfig,
    pub database: Database,
    #[serde(default)]
    pub library: LibrarySource,
}

impl Config {
    pub fn load(path: &Path) -> anyhow::Result<Config> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        toml::from_str(&contents).with_context(|| "Failed to parse config TOML")
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Database {
    pub in_memory: bool,
    pub path: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct LibrarySource {
    pub roots: Vec<PathBuf>,
    #[serde(default)]
    pub follow_symlinks: bool,
    #[serde(default)]
    pub ignored_dirs: Vec<PathBuf>,
}
