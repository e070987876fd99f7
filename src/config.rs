//! Configuration constants and settings for the converter.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ConvertError, Result};
use crate::layers::LayerTable;

/// Floating-point comparison epsilon (drawing units are inches).
pub const EPS: f64 = 0.0001;

/// Thickness offered when a border carries no usable thickness tag.
pub const DEFAULT_THICKNESS: f64 = 0.75;

/// Block names containing this marker are CNC part borders.
pub const BORDER_BLOCK_MARKER: &str = "CNC_BORDER";

/// Attribute tags containing this marker hold the board thickness.
pub const THICKNESS_TAG_MARKER: &str = "THICK";

/// Circle layers containing this marker are drilled through the full board.
pub const DRILL_LAYER_MARKER: &str = "DRILL";

/// Layer that failure annotations are placed on.
pub const ANNOTATION_LAYER: &str = "0";

/// Pipeline configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Border block name marker.
    pub border_marker: String,
    /// Thickness attribute tag marker.
    pub thickness_tag: String,
    /// Drill layer marker (matched case-insensitively).
    pub drill_marker: String,
    /// Default offered by the thickness prompt.
    pub default_thickness: f64,
    /// Layer for failure annotations.
    pub annotation_layer: String,
    /// Layer to depth rules.
    pub layers: LayerTable,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            border_marker: BORDER_BLOCK_MARKER.to_string(),
            thickness_tag: THICKNESS_TAG_MARKER.to_string(),
            drill_marker: DRILL_LAYER_MARKER.to_string(),
            default_thickness: DEFAULT_THICKNESS,
            annotation_layer: ANNOTATION_LAYER.to_string(),
            layers: LayerTable::standard(),
        }
    }
}

impl PipelineConfig {
    /// Parse and validate a JSON configuration. Missing fields take defaults.
    pub fn from_json_str(content: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON configuration file.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(ConvertError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    /// Check the settings the layer table does not already validate.
    pub fn validate(&self) -> Result<()> {
        if !(self.default_thickness.is_finite() && self.default_thickness > 0.0) {
            return Err(ConvertError::InvalidConfig {
                message: format!(
                    "default_thickness must be positive, got {}",
                    self.default_thickness
                ),
            });
        }

        for (field, value) in [
            ("border_marker", &self.border_marker),
            ("thickness_tag", &self.thickness_tag),
            ("drill_marker", &self.drill_marker),
        ] {
            if value.trim().is_empty() {
                return Err(ConvertError::InvalidConfig {
                    message: format!("{} must not be empty", field),
                });
            }
        }

        Ok(())
    }

    /// Check if a circle on this layer is a drilled hole.
    pub fn is_drill_layer(&self, layer: &str) -> bool {
        layer
            .to_uppercase()
            .contains(&self.drill_marker.to_uppercase())
    }

    /// Check if a block name marks a CNC border.
    pub fn is_border_block(&self, name: &str) -> bool {
        name.to_uppercase()
            .contains(&self.border_marker.to_uppercase())
    }
}

/// Utility functions for floating-point comparisons.
pub mod float_cmp {
    use super::EPS;

    /// Check if two floats are approximately equal.
    #[inline]
    pub fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < EPS
    }

    /// Check if a float is approximately zero.
    #[inline]
    pub fn approx_zero(a: f64) -> bool {
        a.abs() < EPS
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config_is_valid() {
        let config = PipelineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.default_thickness, 0.75);
    }

    #[test]
    fn test_partial_json_takes_defaults() {
        let config = PipelineConfig::from_json_str(r#"{ "default_thickness": 0.5 }"#).unwrap();
        assert_eq!(config.default_thickness, 0.5);
        assert_eq!(config.border_marker, BORDER_BLOCK_MARKER);
        assert_eq!(config.layers.resolve_depth("1/8 ROUTE", 0.5), 0.125);
    }

    #[test]
    fn test_rejects_zero_default_thickness() {
        let result = PipelineConfig::from_json_str(r#"{ "default_thickness": 0.0 }"#);
        assert!(matches!(result, Err(ConvertError::InvalidConfig { .. })));
    }

    #[test]
    fn test_rejects_empty_marker() {
        let result = PipelineConfig::from_json_str(r#"{ "drill_marker": "  " }"#);
        assert!(matches!(result, Err(ConvertError::InvalidConfig { .. })));
    }

    #[test]
    fn test_from_json_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{ "layers": [ {{ "aliases": ["ENGRAVE"], "depth": {{ "fixed": 0.0625 }} }} ] }}"#
        )
        .unwrap();

        let config = PipelineConfig::from_json_file(file.path()).unwrap();
        assert_eq!(config.layers.resolve_depth("engrave", 0.75), 0.0625);
        assert_eq!(config.layers.resolve_depth("FULL DEPTH", 0.75), 0.0);
    }

    #[test]
    fn test_missing_file() {
        let result = PipelineConfig::from_json_file(Path::new("/nonexistent/config.json"));
        assert!(matches!(result, Err(ConvertError::FileNotFound { .. })));
    }

    #[test]
    fn test_drill_layer_is_case_insensitive() {
        let config = PipelineConfig::default();
        assert!(config.is_drill_layer("Drill"));
        assert!(config.is_drill_layer("1/4 DRILL"));
        assert!(config.is_drill_layer("drill holes"));
        assert!(!config.is_drill_layer("1/4 ROUTE"));
    }

    #[test]
    fn test_border_block_marker() {
        let config = PipelineConfig::default();
        assert!(config.is_border_block("CNC_BORDER_V2"));
        assert!(config.is_border_block("cnc_border"));
        assert!(!config.is_border_block("TITLE_BLOCK"));
    }
}
