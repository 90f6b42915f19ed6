use wasm_bindgen::prelude::*;
use crate::interop::{new_obj, set_kv};

pub fn ok(v: JsValue) -> JsValue {
    let o = new_obj();
    set_kv(&o, "ok", &JsValue::from_bool(true));
    set_kv(&o, "value", &v);
    o.into()
}

pub fn err(code: &'static str, message: impl Into<String>, data: Option<JsValue>) -> JsValue {
    let root = new_obj();
    set_kv(&root, "ok", &JsValue::from_bool(false));
    let e = new_obj();
    set_kv(&e, "code", &JsValue::from_str(code));
    set_kv(&e, "message", &JsValue::from_str(&message.into()));
    if let Some(d) = data { set_kv(&e, "data", &d); }
    set_kv(&root, "error", &e.into());
    root.into()
}

#[inline]
pub fn non_finite(param: &str) -> JsValue {
    let d = new_obj(); set_kv(&d, "param", &JsValue::from_str(param));
    err("non_finite", format!("parameter '{}' must be finite", param), Some(d.into()))
}

#[inline]
pub fn out_of_range(param: &str, min: f64, got: f64) -> JsValue {
    let d = new_obj();
    set_kv(&d, "param", &JsValue::from_str(param));
    set_kv(&d, "min", &JsValue::from_f64(min));
    set_kv(&d, "got", &JsValue::from_f64(got));
    err("out_of_range", format!("parameter '{}' out of range", param), Some(d.into()))
}

#[inline]
pub fn invalid_id(kind: &str, id: f64) -> JsValue {
    let d = new_obj();
    set_kv(&d, "kind", &JsValue::from_str(kind));
    set_kv(&d, "id", &JsValue::from_f64(id));
    err("invalid_id", format!("invalid {} id", kind), Some(d.into()))
}

#[inline]
pub fn invalid_button(got: u8) -> JsValue {
    let d = new_obj(); set_kv(&d, "got", &JsValue::from_f64(got as f64));
    err("invalid_button", "button must be 0:Left, 1:Middle, 2:Right", Some(d.into()))
}

#[inline]
pub fn invalid_key(got: &str) -> JsValue {
    let d = new_obj(); set_kv(&d, "got", &JsValue::from_str(got));
    err("invalid_key", "key must be one of Delete, Backspace, Escape, ',', '.'", Some(d.into()))
}

/// Scene or config rejected; also reported on the browser console.
pub fn bad_scene(code: &'static str, e: &dyn std::fmt::Display) -> JsValue {
    let message = e.to_string();
    web_sys::console::warn_1(&JsValue::from_str(&format!("nodetool: {}", message)));
    err(code, message, None)
}
