use crate::error::SceneError;
use crate::geometry::limits;
use crate::layers::{FeatureStore, MemoryLayer, Project};
use crate::model::{Crs, FeatureId, Geometry, LayerId};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeSet;

pub const SCENE_VERSION: u32 = 1;

#[derive(Serialize, Deserialize)]
struct FeatureDoc {
    id: FeatureId,
    geometry: Geometry,
}

#[derive(Serialize, Deserialize)]
struct LayerDoc {
    id: LayerId,
    #[serde(default)]
    name: String,
    #[serde(default = "yes")]
    editable: bool,
    #[serde(default = "default_crs")]
    crs: Crs,
    #[serde(default)]
    features: Vec<FeatureDoc>,
}

#[derive(Serialize, Deserialize)]
struct SceneDoc {
    version: u32,
    #[serde(default)]
    topological_editing: bool,
    #[serde(default)]
    layers: Vec<LayerDoc>,
}

fn yes() -> bool {
    true
}

fn default_crs() -> Crs {
    Crs::map(0)
}

// Rings are stored closed with at least three distinct corners.
fn rings_closed(g: &Geometry) -> bool {
    match g {
        Geometry::Polygon(rings) => rings.iter().all(|r| r.len() >= 4 && r.first() == r.last()),
        _ => true,
    }
}

pub fn project_to_json(project: &Project) -> Value {
    let layers = project
        .layers()
        .map(|l| LayerDoc {
            id: l.id(),
            name: l.name().to_string(),
            editable: l.is_editable(),
            crs: l.crs(),
            features: l
                .feature_ids()
                .into_iter()
                .filter_map(|id| l.get_feature(id).map(|geometry| FeatureDoc { id, geometry }))
                .collect(),
        })
        .collect();
    let doc = SceneDoc { version: SCENE_VERSION, topological_editing: project.topological_editing(), layers };
    serde_json::to_value(doc).unwrap_or(Value::Null)
}

/// Parse and validate a scene document into a fresh project. Nothing is
/// built unless the whole document passes.
pub fn project_from_json(v: Value) -> Result<Project, SceneError> {
    let doc: SceneDoc = serde_json::from_value(v)?;
    if doc.version != SCENE_VERSION {
        return Err(SceneError::Version(doc.version));
    }
    if doc.layers.len() > limits::MAX_LAYERS {
        return Err(SceneError::Limit("layers"));
    }
    let mut total = 0usize;
    let mut layer_ids = BTreeSet::new();
    for layer in &doc.layers {
        if !layer_ids.insert(layer.id) {
            return Err(SceneError::DuplicateLayer(layer.id));
        }
        if layer.features.len() > limits::MAX_FEATURES_PER_LAYER {
            return Err(SceneError::Limit("features per layer"));
        }
        if !(limits::in_coord_bounds(layer.crs.scale) && layer.crs.scale != 0.0 && limits::point_in_bounds(layer.crs.offset)) {
            return Err(SceneError::Limit("crs transform"));
        }
        let mut fids = BTreeSet::new();
        for f in &layer.features {
            if !fids.insert(f.id) {
                return Err(SceneError::DuplicateFeature { layer: layer.id, fid: f.id });
            }
            let n = f.geometry.vertex_count();
            if n > limits::MAX_VERTICES_PER_FEATURE {
                return Err(SceneError::Limit("vertices per feature"));
            }
            total += n;
            if total > limits::MAX_VERTICES_TOTAL {
                return Err(SceneError::Limit("vertices total"));
            }
            if !f.geometry.vertices().into_iter().all(limits::point_in_bounds) {
                return Err(SceneError::Coordinate { layer: layer.id, fid: f.id });
            }
            if !rings_closed(&f.geometry) {
                return Err(SceneError::OpenRing { layer: layer.id, fid: f.id });
            }
        }
    }
    let mut project = Project::new();
    project.set_topological_editing(doc.topological_editing);
    for layer in doc.layers {
        let mut ml = MemoryLayer::new(layer.id, layer.name, layer.crs);
        ml.set_editable(layer.editable);
        for f in layer.features {
            ml.add_feature(f.id, f.geometry);
        }
        project.add_layer(Box::new(ml));
    }
    Ok(project)
}
