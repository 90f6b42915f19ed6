pub mod model;
pub mod error;
pub mod config;
pub mod layers;
pub mod canvas;
pub mod cache;
pub mod feedback;
pub mod geometry {
    pub mod limits;
    pub mod math;
    pub mod tolerance;
    pub mod vertices;
}
pub mod algorithms {
    pub mod locator;
    pub mod matching;
    pub mod topology;
}
pub mod vertex_ref;
pub mod selection;
pub mod commit;
pub mod tool;
pub mod scene;
mod json;

pub use algorithms::locator::{Locator, Match, MemoryLocator, Target};
pub use cache::GeometryCache;
pub use canvas::MapCanvas;
pub use commit::{commit, BatchBuilder, CommitReport, EditBatch};
pub use config::ToolConfig;
pub use error::{ConfigError, EditError, SceneError};
pub use feedback::{Feedback, RecordingFeedback};
pub use geometry::vertices::{DeleteStatus, VertexPosition};
pub use json::SCENE_VERSION;
pub use layers::{FeatureStore, LayerEvent, MemoryLayer, Project};
pub use model::{Crs, FeatureId, Geometry, LayerId, Point, Rect};
pub use scene::Scene;
pub use selection::SelectionSet;
pub use tool::{Button, Drag, EditContext, Key, NodeTool, PointerEvent, ToolState};
pub use vertex_ref::{Side, VertexOp, VertexRef};
