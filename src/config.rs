//! Retrieval configuration

use crate::error::{PixelError, Result};
use crate::layout::MAX_TILE_EDGE;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Settings applied to every retrieval made through a [`PixelSet`](crate::PixelSet)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Largest sub-tile edge requested from the raw data source
    pub max_tile_edge: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            max_tile_edge: MAX_TILE_EDGE,
        }
    }
}

impl FetchConfig {
    /// Set the maximum sub-tile edge
    pub fn with_max_tile_edge(mut self, max_tile_edge: usize) -> Self {
        self.max_tile_edge = max_tile_edge;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_tile_edge == 0 {
            return Err(PixelError::Configuration(
                "max_tile_edge must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Parse and validate a JSON configuration
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON configuration file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let config = FetchConfig::default();
        assert_eq!(config.max_tile_edge, 5000);
        assert!(config.validate().is_ok());
        assert_eq!(FetchConfig::from_json("{}").unwrap(), config);
    }

    #[test]
    fn test_zero_edge_rejected() {
        assert!(matches!(
            FetchConfig::from_json(r#"{"max_tile_edge": 0}"#),
            Err(PixelError::Configuration(_))
        ));
        assert!(FetchConfig::default().with_max_tile_edge(0).validate().is_err());
    }

    #[test]
    fn test_from_file() {
        let config = FetchConfig::default().with_max_tile_edge(1024);
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(config.to_json().unwrap().as_bytes()).unwrap();

        assert_eq!(FetchConfig::from_file(file.path()).unwrap(), config);
        assert!(matches!(
            FetchConfig::from_file(file.path().with_extension("missing")),
            Err(PixelError::Io(_))
        ));
    }
}
