use serde::{Deserialize, Serialize};

use crate::atlas::DEFAULT_MAX_SIZE;
use crate::cli::CompressionLevel;

/// PNG compression level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CompressConfig {
    /// Optimization level 0-6
    Level(u8),
    /// Maximum compression ("max")
    Max(String),
}

impl CompressConfig {
    pub fn level(&self) -> Option<CompressionLevel> {
        match self {
            CompressConfig::Level(n) if *n <= 6 => Some(CompressionLevel::Level(*n)),
            CompressConfig::Max(s) if s.eq_ignore_ascii_case("max") => Some(CompressionLevel::Max),
            _ => None,
        }
    }
}

/// Stitchmap configuration file structure.
///
/// All paths in the config are relative to the config file location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StitchConfig {
    /// Config file version (currently 1)
    pub version: u32,
    /// Resources root holding `textures/` and `models/`
    pub resources: String,
    /// Padding between images in pixels
    pub padding: u32,
    /// Extrude image edges by N pixels
    pub extrude: u32,
    /// Largest canvas side an atlas may grow to
    pub max_size: u32,
    /// Round atlas dimensions up to powers of two
    pub power_of_two: bool,
    /// Packing heuristic to use
    pub heuristic: String,
    /// PNG compression configuration (optional)
    pub compress: Option<CompressConfig>,
    /// Glob patterns, relative to `textures/`, of directories the scan skips
    pub exclude: Vec<String>,
}

impl Default for StitchConfig {
    fn default() -> Self {
        Self {
            version: 1,
            resources: "resources".to_string(),
            padding: 0,
            extrude: 0,
            max_size: DEFAULT_MAX_SIZE,
            power_of_two: false,
            heuristic: "best-short-side-fit".to_string(),
            compress: None,
            exclude: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_take_defaults() {
        let config: StitchConfig = serde_json::from_str(r#"{ "padding": 2 }"#).unwrap();
        assert_eq!(config.padding, 2);
        assert_eq!(config.max_size, DEFAULT_MAX_SIZE);
        assert_eq!(config.resources, "resources");
        assert!(config.exclude.is_empty());
    }

    #[test]
    fn test_compress_forms() {
        let config: StitchConfig = serde_json::from_str(r#"{ "compress": "max" }"#).unwrap();
        assert_eq!(config.compress.and_then(|c| c.level()), Some(CompressionLevel::Max));

        let config: StitchConfig = serde_json::from_str(r#"{ "compress": 4 }"#).unwrap();
        assert_eq!(config.compress.and_then(|c| c.level()), Some(CompressionLevel::Level(4)));

        assert_eq!(CompressConfig::Level(9).level(), None);
        assert_eq!(CompressConfig::Max("fast".into()).level(), None);
    }
}
