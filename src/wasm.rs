//! WASM bindings for browser-based Markdown to LaTeX conversion.
//!
//! This module exposes the core conversion functions to JavaScript via wasm-bindgen.

use wasm_bindgen::prelude::*;

use crate::latex::RenderConfig;

/// Initialize panic hook for better error messages in the browser console.
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

/// Convert Markdown to a complete LaTeX document.
///
/// Uses the built-in preamble. `heading_offset` shifts every heading level
/// and may be negative.
#[wasm_bindgen]
pub fn markdown_to_latex(
    input: &str,
    heading_offset: i32,
    no_numbering: bool,
    unsafe_mode: bool,
) -> Result<String, JsValue> {
    let config = RenderConfig::new()
        .with_heading_offset(heading_offset)
        .with_numbering(!no_numbering)
        .with_unsafe(unsafe_mode);
    crate::markdown_to_latex(input, &config).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Convert Markdown to HTML.
#[wasm_bindgen]
pub fn markdown_to_html(input: &str) -> String {
    crate::markdown_to_html(input)
}
