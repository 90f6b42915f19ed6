use crate::Editor;
use crate::{error, interop};
use nodetool::{Button, FeatureStore, Key, MapCanvas, Point, PointerEvent, SceneError, ToolConfig, ToolState};
use js_sys::Float64Array;
use wasm_bindgen::prelude::*;
type JsValue = wasm_bindgen::JsValue;

#[wasm_bindgen]
pub fn set_panic_hook() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

// DOM MouseEvent.button numbering
fn button_of(b: u8) -> Option<Button> {
    match b {
        0 => Some(Button::Left),
        1 => Some(Button::Middle),
        2 => Some(Button::Right),
        _ => None,
    }
}

// DOM KeyboardEvent.key values
fn key_of(k: &str) -> Option<Key> {
    match k {
        "Delete" => Some(Key::Delete),
        "Backspace" => Some(Key::Backspace),
        "Escape" => Some(Key::Escape),
        "," => Some(Key::Comma),
        "." => Some(Key::Period),
        _ => None,
    }
}

fn state_name(state: &ToolState) -> &'static str {
    match state {
        ToolState::Idle => "idle",
        ToolState::RectCandidate { .. } => "rect_candidate",
        ToolState::SelectingRect { .. } => "selecting_rect",
        ToolState::Dragging(_) => "dragging",
    }
}

// Feature ids cross the boundary as JS numbers.
fn feature_id(fid: f64) -> Option<u64> {
    if fid.is_finite() && fid >= 0.0 && fid.fract() == 0.0 && fid <= 9_007_199_254_740_991.0 {
        Some(fid as u64)
    } else {
        None
    }
}

fn check_pointer(x: f64, y: f64, button: u8) -> Result<PointerEvent, JsValue> {
    if !x.is_finite() {
        return Err(error::non_finite("x"));
    }
    if !y.is_finite() {
        return Err(error::non_finite("y"));
    }
    let b = button_of(button).ok_or_else(|| error::invalid_button(button))?;
    Ok(PointerEvent::new(x, y, b))
}

fn pointer(x: f64, y: f64, button: u8) -> Option<PointerEvent> {
    check_pointer(x, y, button).ok()
}

impl Default for Editor {
    fn default() -> Self {
        Editor::rs_new()
    }
}

#[wasm_bindgen]
impl Editor {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Editor {
        crate::Editor::rs_new()
    }

    // Scene documents
    pub fn load_json(&mut self, text: &str) -> bool {
        self.rs_load_str(text).is_ok()
    }
    pub fn load_json_res(&mut self, text: &str) -> JsValue {
        match self.rs_load_str(text) {
            Ok(()) => error::ok(JsValue::from_f64(self.inner.project.layers().count() as f64)),
            Err(e) => error::bad_scene("bad_scene", &e),
        }
    }
    pub fn load_value_res(&mut self, v: JsValue) -> JsValue {
        let value: serde_json::Value = match serde_wasm_bindgen::from_value(v) {
            Ok(v) => v,
            Err(e) => return error::bad_scene("bad_scene", &e),
        };
        match self.inner.load_json(value) {
            Ok(()) => error::ok(JsValue::from_f64(self.inner.project.layers().count() as f64)),
            Err(e) => error::bad_scene("bad_scene", &e),
        }
    }
    pub fn to_json(&self) -> String {
        self.inner.to_json().to_string()
    }
    pub fn to_value_res(&self) -> JsValue {
        match interop::to_js(&self.inner.to_json()) {
            Ok(v) => error::ok(v),
            Err(e) => error::err("serialize", e.to_string(), None),
        }
    }

    // Settings
    pub fn set_config_res(&mut self, text: &str) -> JsValue {
        match ToolConfig::from_json_str(text) {
            Ok(config) => {
                self.inner.set_config(config);
                error::ok(JsValue::TRUE)
            }
            Err(e) => error::bad_scene("bad_config", &e),
        }
    }
    pub fn set_topological_editing(&mut self, on: bool) {
        self.inner.project.set_topological_editing(on);
    }
    pub fn topological_editing(&self) -> bool {
        self.inner.project.topological_editing()
    }
    pub fn set_view(&mut self, origin_x: f64, origin_y: f64, units_per_px: f64) -> bool {
        if !(origin_x.is_finite() && origin_y.is_finite() && units_per_px.is_finite() && units_per_px > 0.0) {
            return false;
        }
        self.rs_set_view(origin_x, origin_y, units_per_px);
        true
    }
    pub fn set_view_res(&mut self, origin_x: f64, origin_y: f64, units_per_px: f64) -> JsValue {
        if !origin_x.is_finite() {
            return error::non_finite("origin_x");
        }
        if !origin_y.is_finite() {
            return error::non_finite("origin_y");
        }
        if !units_per_px.is_finite() {
            return error::non_finite("units_per_px");
        }
        if units_per_px <= 0.0 {
            return error::out_of_range("units_per_px", 0.0, units_per_px);
        }
        self.rs_set_view(origin_x, origin_y, units_per_px);
        error::ok(JsValue::TRUE)
    }

    // Pointer and keyboard input, screen pixels
    pub fn press(&mut self, x: f64, y: f64, button: u8) {
        if let Some(ev) = pointer(x, y, button) {
            self.inner.press(ev);
        }
    }
    pub fn press_res(&mut self, x: f64, y: f64, button: u8) -> JsValue {
        match check_pointer(x, y, button) {
            Ok(ev) => {
                self.inner.press(ev);
                self.state_res()
            }
            Err(e) => e,
        }
    }
    pub fn pointer_move(&mut self, x: f64, y: f64) {
        if let Some(ev) = pointer(x, y, 0) {
            self.inner.move_to(ev);
        }
    }
    pub fn pointer_move_res(&mut self, x: f64, y: f64) -> JsValue {
        match check_pointer(x, y, 0) {
            Ok(ev) => {
                self.inner.move_to(ev);
                self.state_res()
            }
            Err(e) => e,
        }
    }
    pub fn release(&mut self, x: f64, y: f64, button: u8) {
        if let Some(ev) = pointer(x, y, button) {
            self.inner.release(ev);
        }
    }
    pub fn release_res(&mut self, x: f64, y: f64, button: u8) -> JsValue {
        match check_pointer(x, y, button) {
            Ok(ev) => {
                self.inner.release(ev);
                self.state_res()
            }
            Err(e) => e,
        }
    }
    pub fn double_click(&mut self, x: f64, y: f64, button: u8) {
        if let Some(ev) = pointer(x, y, button) {
            self.inner.double_click(ev);
        }
    }
    pub fn double_click_res(&mut self, x: f64, y: f64, button: u8) -> JsValue {
        match check_pointer(x, y, button) {
            Ok(ev) => {
                self.inner.double_click(ev);
                self.state_res()
            }
            Err(e) => e,
        }
    }
    /// Returns whether the key was consumed.
    pub fn key(&mut self, key: &str) -> bool {
        key_of(key).map_or(false, |k| self.inner.key(k))
    }
    pub fn key_res(&mut self, key: &str) -> JsValue {
        match key_of(key) {
            Some(k) => error::ok(JsValue::from_bool(self.inner.key(k))),
            None => error::invalid_key(key),
        }
    }
    pub fn deactivate(&mut self) {
        self.inner.deactivate();
    }

    // Read-back for drawing
    pub fn state(&self) -> String {
        state_name(self.inner.tool.state()).to_string()
    }
    pub fn feedback(&self) -> JsValue {
        interop::to_js(&self.inner.feedback).unwrap_or(JsValue::NULL)
    }
    pub fn band_data(&self) -> JsValue {
        let bands = self.inner.feedback.band_list();
        let anchors = interop::arr_points(bands.iter().map(|b| b.anchor));
        let free = interop::arr_points(bands.iter().map(|b| b.free));
        let obj = interop::new_obj();
        interop::set_kv(&obj, "anchors", &anchors.into());
        interop::set_kv(&obj, "free", &free.into());
        obj.into()
    }
    pub fn marker_positions(&self) -> Float64Array {
        interop::arr_points(self.inner.feedback.marker_points())
    }
    pub fn selection_data(&self) -> JsValue {
        let entries = self.inner.tool.selection().entries();
        let layers: Vec<u32> = entries.iter().map(|r| r.layer).collect();
        let fids: Vec<f64> = entries.iter().map(|r| r.fid as f64).collect();
        let indices: Vec<u32> = entries.iter().map(|r| r.index() as u32).collect();
        let obj = interop::new_obj();
        interop::set_kv(&obj, "layers", &interop::arr_u32(&layers).into());
        interop::set_kv(&obj, "fids", &interop::arr_f64(&fids).into());
        interop::set_kv(&obj, "indices", &interop::arr_u32(&indices).into());
        obj.into()
    }
    pub fn last_report(&self) -> JsValue {
        match self.inner.tool.last_report() {
            Some(report) => interop::to_js(report).unwrap_or(JsValue::NULL),
            None => JsValue::NULL,
        }
    }
    pub fn get_feature_res(&self, layer: u32, fid: f64) -> JsValue {
        let Some(store) = self.inner.project.layer(layer) else {
            return error::invalid_id("layer", layer as f64);
        };
        let Some(geometry) = feature_id(fid).and_then(|f| store.get_feature(f)) else {
            return error::invalid_id("feature", fid);
        };
        match interop::to_js(&geometry) {
            Ok(v) => error::ok(v),
            Err(e) => error::err("serialize", e.to_string(), None),
        }
    }
    pub fn feature_count(&self, layer: u32) -> u32 {
        self.inner.project.layer(layer).map_or(0, |l| l.feature_ids().len() as u32)
    }
}

impl Editor {
    fn rs_load_str(&mut self, text: &str) -> Result<(), SceneError> {
        let value: serde_json::Value = serde_json::from_str(text)?;
        self.inner.load_json(value)
    }

    fn rs_set_view(&mut self, origin_x: f64, origin_y: f64, units_per_px: f64) {
        let crs = self.inner.canvas.crs;
        self.inner.set_canvas(MapCanvas::new(Point::new(origin_x, origin_y), units_per_px, crs));
    }

    fn state_res(&self) -> JsValue {
        error::ok(JsValue::from_str(state_name(self.inner.tool.state())))
    }
}
