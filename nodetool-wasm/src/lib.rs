use wasm_bindgen::prelude::*;
mod api;
mod error;
mod interop;

#[wasm_bindgen]
pub struct Editor { pub(crate) inner: nodetool::Scene }

impl Editor {
    pub fn rs_new() -> Editor { Editor { inner: nodetool::Scene::default() } }
    pub fn rs_scene(&self) -> &nodetool::Scene { &self.inner }
}
