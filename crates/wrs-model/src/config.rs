use std::path::Path;

use serde::{Deserialize, Serialize};
use wrs_types::IsoStyle;

use crate::error::{ModelError, ModelResult};

/// Tunables for the model layer.
///
/// Every field has a default, so a TOML file only needs to name what it
/// overrides:
///
/// ```toml
/// score_unit = 1024.0
/// scan_batch_size = 100
/// max_dupe_suffix = 100000
/// iso_style = "space"
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Spacing between neighbouring scores after an append into an empty
    /// collection or a full reorder.
    pub score_unit: f64,
    /// Batch-size hint for key scans during deletion.
    pub scan_batch_size: usize,
    /// Highest numeric suffix tried when deduplicating a name.
    pub max_dupe_suffix: u32,
    /// Default separator style for timestamps in record snapshots.
    pub iso_style: IsoStyle,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            score_unit: 1024.0,
            scan_batch_size: 100,
            max_dupe_suffix: 100_000,
            iso_style: IsoStyle::TSeparator,
        }
    }
}

impl ModelConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(s: &str) -> ModelResult<Self> {
        let config: Self = toml::from_str(s).map_err(|e| ModelError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse, and validate a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> ModelResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> ModelResult<()> {
        if !self.score_unit.is_finite() || self.score_unit <= 0.0 {
            return Err(ModelError::Config(format!(
                "score_unit must be a positive finite number, got {}",
                self.score_unit
            )));
        }
        if self.scan_batch_size == 0 {
            return Err(ModelError::Config("scan_batch_size must be at least 1".into()));
        }
        if self.max_dupe_suffix < 2 {
            return Err(ModelError::Config(format!(
                "max_dupe_suffix must be at least 2, got {}",
                self.max_dupe_suffix
            )));
        }
        Ok(())
    }
}
