use crate::error::ConfigError;
use serde::{Deserialize, Serialize};

/// Interaction tunables, all measured in screen pixels.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolConfig {
    /// Radius for vertex/edge matching around the pointer.
    pub search_radius_px: f64,
    /// Radius around an edge midpoint inside which a press inserts a vertex.
    pub edge_center_radius_px: f64,
    /// Distance of the append indicator beyond a line endpoint.
    pub endpoint_marker_offset_px: f64,
    /// Pointer travel before a press on empty canvas becomes a rectangle.
    pub rect_threshold_px: f64,
    pub snapping: bool,
}

impl Default for ToolConfig {
    fn default() -> Self {
        ToolConfig {
            search_radius_px: 10.0,
            edge_center_radius_px: 8.0,
            endpoint_marker_offset_px: 15.0,
            rect_threshold_px: 3.0,
            snapping: true,
        }
    }
}

impl ToolConfig {
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        let cfg: ToolConfig = serde_json::from_str(s)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let fields = [
            ("search_radius_px", self.search_radius_px),
            ("edge_center_radius_px", self.edge_center_radius_px),
            ("endpoint_marker_offset_px", self.endpoint_marker_offset_px),
            ("rect_threshold_px", self.rect_threshold_px),
        ];
        for (field, value) in fields {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::Invalid { field, value });
            }
        }
        Ok(())
    }
}
