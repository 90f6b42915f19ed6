//! Error types for edit resolution, scene loading and configuration.
use crate::model::{FeatureId, LayerId};
use thiserror::Error;

/// Failure while resolving or applying one vertex operation. These never
/// leave the tool: handlers log them and carry on.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EditError {
    #[error("unknown layer {0}")]
    UnknownLayer(LayerId),

    #[error("layer {0} is not editable")]
    NotEditable(LayerId),

    #[error("feature {fid} not found in layer {layer}")]
    UnknownFeature { layer: LayerId, fid: FeatureId },

    #[error("vertex {index} out of range for feature {fid}")]
    VertexOutOfRange { fid: FeatureId, index: usize },

    #[error("{op} rejected at vertex {index} of feature {fid}")]
    Rejected { op: &'static str, fid: FeatureId, index: usize },

    #[error("non-finite coordinate")]
    NonFinite,
}

#[derive(Error, Debug)]
pub enum SceneError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsupported scene version {0}")]
    Version(u32),

    #[error("duplicate layer id {0}")]
    DuplicateLayer(LayerId),

    #[error("duplicate feature id {fid} in layer {layer}")]
    DuplicateFeature { layer: LayerId, fid: FeatureId },

    #[error("limit exceeded: {0}")]
    Limit(&'static str),

    #[error("coordinate out of bounds in layer {layer}, feature {fid}")]
    Coordinate { layer: LayerId, fid: FeatureId },

    #[error("polygon ring not closed in layer {layer}, feature {fid}")]
    OpenRing { layer: LayerId, fid: FeatureId },
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{field} must be finite and positive, got {value}")]
    Invalid { field: &'static str, value: f64 },
}
