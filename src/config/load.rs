use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use glob::Pattern;

use super::types::StitchConfig;

/// A loaded configuration file with its associated directory.
///
/// Paths in the config are relative to the config file location,
/// so we need to track where the config was loaded from.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    /// The parsed configuration
    pub config: StitchConfig,
    /// The directory containing the config file
    pub config_dir: PathBuf,
}

impl LoadedConfig {
    /// Load a config file from the given path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;

        let config: StitchConfig = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse config file: {}", path.display()))?;

        let config_dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));

        Ok(Self { config, config_dir })
    }

    /// Resolve the resources root relative to the config file directory.
    pub fn resolve_resources(&self) -> PathBuf {
        self.config_dir.join(&self.config.resources)
    }

    /// Compile the `exclude` globs. These match directory paths relative to
    /// `textures/`, so they are not joined onto the config directory.
    pub fn exclude_patterns(&self) -> Result<Vec<Pattern>> {
        self.config
            .exclude
            .iter()
            .map(|p| Pattern::new(p).with_context(|| format!("invalid exclude pattern: {}", p)))
            .collect()
    }
}
