//! A self-contained editing session: project, canvas, locator, recorded
//! feedback and the vertex tool, wired together.
use crate::algorithms::locator::MemoryLocator;
use crate::canvas::MapCanvas;
use crate::config::ToolConfig;
use crate::error::SceneError;
use crate::feedback::RecordingFeedback;
use crate::json;
use crate::layers::Project;
use crate::tool::{EditContext, Key, NodeTool, PointerEvent};
use serde_json::Value;

pub struct Scene {
    pub project: Project,
    pub canvas: MapCanvas,
    pub feedback: RecordingFeedback,
    pub tool: NodeTool,
    locator: MemoryLocator,
}

impl Default for Scene {
    fn default() -> Self {
        Scene::new(Project::new(), ToolConfig::default())
    }
}

impl Scene {
    pub fn new(project: Project, config: ToolConfig) -> Self {
        Scene {
            project,
            canvas: MapCanvas::default(),
            feedback: RecordingFeedback::new(),
            tool: NodeTool::new(config),
            locator: MemoryLocator,
        }
    }

    pub fn from_json_str(s: &str, config: ToolConfig) -> Result<Self, SceneError> {
        let v: Value = serde_json::from_str(s)?;
        Ok(Scene::new(json::project_from_json(v)?, config))
    }

    /// Replace the project; the tool is reset and all feedback dropped.
    pub fn load_json(&mut self, v: Value) -> Result<(), SceneError> {
        let project = json::project_from_json(v)?;
        self.deactivate();
        let config = self.tool.config().clone();
        self.project = project;
        self.tool = NodeTool::new(config);
        self.feedback = RecordingFeedback::new();
        tracing::debug!(layers = self.project.layers().count(), "scene loaded");
        Ok(())
    }

    pub fn to_json(&self) -> Value {
        json::project_to_json(&self.project)
    }

    fn split(&mut self) -> (&mut NodeTool, EditContext<'_>) {
        let ctx = EditContext {
            project: &mut self.project,
            canvas: &self.canvas,
            locator: &self.locator,
            feedback: &mut self.feedback,
        };
        (&mut self.tool, ctx)
    }

    /// Swap the tool configuration; any gesture in progress is dropped.
    pub fn set_config(&mut self, config: ToolConfig) {
        self.deactivate();
        self.tool = NodeTool::new(config);
    }

    pub fn set_canvas(&mut self, canvas: MapCanvas) {
        self.canvas = canvas;
    }

    pub fn press(&mut self, ev: PointerEvent) {
        let (tool, mut ctx) = self.split();
        tool.press(&mut ctx, ev)
    }

    pub fn double_click(&mut self, ev: PointerEvent) {
        let (tool, mut ctx) = self.split();
        tool.double_click(&mut ctx, ev)
    }

    pub fn move_to(&mut self, ev: PointerEvent) {
        let (tool, mut ctx) = self.split();
        tool.move_to(&mut ctx, ev)
    }

    pub fn release(&mut self, ev: PointerEvent) {
        let (tool, mut ctx) = self.split();
        tool.release(&mut ctx, ev)
    }

    /// Press then release at the same spot.
    pub fn click(&mut self, ev: PointerEvent) {
        self.press(ev);
        self.release(ev);
    }

    pub fn key(&mut self, key: Key) -> bool {
        let (tool, mut ctx) = self.split();
        tool.key(&mut ctx, key)
    }

    pub fn deactivate(&mut self) {
        let (tool, mut ctx) = self.split();
        tool.deactivate(&mut ctx)
    }
}
