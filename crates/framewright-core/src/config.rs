//! Editor configuration.
//!
//! Every field has a default, so a partial JSON object (or an empty one)
//! is a valid configuration. Values that make no sense are pulled back
//! into range by [`EditorConfig::validated`].

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::decode::FilterType;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid editor config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Tunables for interaction, batching and rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Logo snap distance in screen pixels.
    pub snap_threshold_px: f64,
    /// Smallest crop side in screen pixels.
    pub min_crop_px: f64,
    /// Distance of the logo rotate handle above the logo's top edge, screen px.
    pub rotate_handle_offset_px: f64,
    /// Hit radius of crop and logo handles, screen px.
    pub handle_radius_px: f64,
    /// Smallest logo scale (fraction of the viewport's short side).
    pub min_logo_scale: f64,
    /// Scale given to newly added logos.
    pub default_logo_scale: f64,
    /// Photos per batch chunk.
    pub batch_chunk_size: usize,
    /// Longest edge of generated thumbnails.
    pub thumbnail_size: u32,
    /// Resampling filter for preview and thumbnails.
    pub preview_filter: FilterType,
    /// Resampling filter for export.
    pub export_filter: FilterType,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            snap_threshold_px: 8.0,
            min_crop_px: 32.0,
            rotate_handle_offset_px: 28.0,
            handle_radius_px: 10.0,
            min_logo_scale: 0.02,
            default_logo_scale: 0.2,
            batch_chunk_size: 5,
            thumbnail_size: 256,
            preview_filter: FilterType::Bilinear,
            export_filter: FilterType::Lanczos3,
        }
    }
}

impl EditorConfig {
    /// Parse from JSON and validate.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        Ok(config.validated())
    }

    /// Replace non-finite or out-of-range values.
    pub fn validated(mut self) -> Self {
        let defaults = Self::default();

        self.snap_threshold_px = non_negative(self.snap_threshold_px, defaults.snap_threshold_px);
        self.min_crop_px = positive(self.min_crop_px, defaults.min_crop_px);
        self.rotate_handle_offset_px =
            non_negative(self.rotate_handle_offset_px, defaults.rotate_handle_offset_px);
        self.handle_radius_px = positive(self.handle_radius_px, defaults.handle_radius_px);
        self.min_logo_scale = positive(self.min_logo_scale, defaults.min_logo_scale).min(1.0);
        self.default_logo_scale = positive(self.default_logo_scale, defaults.default_logo_scale)
            .clamp(self.min_logo_scale, 1.0);
        if self.batch_chunk_size == 0 {
            self.batch_chunk_size = defaults.batch_chunk_size;
        }
        if self.thumbnail_size == 0 {
            self.thumbnail_size = defaults.thumbnail_size;
        }
        self
    }
}

fn positive(value: f64, fallback: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        fallback
    }
}

fn non_negative(value: f64, fallback: f64) -> f64 {
    if value.is_finite() && value >= 0.0 {
        value
    } else {
        fallback
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let c = EditorConfig::default();
        assert_eq!(c.snap_threshold_px, 8.0);
        assert_eq!(c.batch_chunk_size, 5);
        assert_eq!(c.export_filter, FilterType::Lanczos3);
    }

    #[test]
    fn test_from_json_partial() {
        let c = EditorConfig::from_json(r#"{"snap_threshold_px": 12, "export_filter": "bilinear"}"#)
            .unwrap();
        assert_eq!(c.snap_threshold_px, 12.0);
        assert_eq!(c.export_filter, FilterType::Bilinear);
        assert_eq!(c.min_crop_px, 32.0);
    }

    #[test]
    fn test_from_json_empty_object() {
        assert_eq!(EditorConfig::from_json("{}").unwrap(), EditorConfig::default());
    }

    #[test]
    fn test_from_json_rejects_garbage() {
        assert!(EditorConfig::from_json("not json").is_err());
    }

    #[test]
    fn test_validated_repairs_values() {
        let c = EditorConfig {
            snap_threshold_px: -3.0,
            min_crop_px: f64::NAN,
            batch_chunk_size: 0,
            min_logo_scale: 0.3,
            default_logo_scale: 0.1,
            ..Default::default()
        }
        .validated();
        assert_eq!(c.snap_threshold_px, 8.0);
        assert_eq!(c.min_crop_px, 32.0);
        assert_eq!(c.batch_chunk_size, 5);
        assert_eq!(c.default_logo_scale, 0.3);
    }
}
