//! WASM bindings for running extraction in the browser.
//!
//! The page serializes its (flattened) markup, hands it over, and gets the
//! outline back as a JSON string in the panel's wire format.

use wasm_bindgen::prelude::*;

use crate::dom::Document;
use crate::outline::{ExtractOptions, LandmarkPolicy, extract};

/// Initialize panic hook for better error messages in the browser console.
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

/// Extract the outline of an HTML string.
///
/// Returns `{"headings":[...],"landmarks":[...],"title":"..."}`.
#[wasm_bindgen]
pub fn extract_outline(html: &str) -> Result<String, JsValue> {
    let doc = Document::parse(html);
    let extraction = extract(&doc, &ExtractOptions::default());
    extraction
        .outline
        .to_json()
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Like [`extract_outline`], including landmarks that are not rendered.
#[wasm_bindgen]
pub fn extract_outline_all_landmarks(html: &str) -> Result<String, JsValue> {
    let doc = Document::parse(html);
    let options = ExtractOptions::new().with_landmarks(LandmarkPolicy::All);
    extract(&doc, &options)
        .outline
        .to_json()
        .map_err(|e| JsValue::from_str(&e.to_string()))
}
