//! Data-URI encoding for images embedded directly in HTML/SVG surfaces.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use std::fs;
use std::path::Path;

use crate::error::{GeopreviewError, Result};

/// Wrap raw bytes as `data:<mime>;base64,<payload>`
pub fn encode_as_data_uri(bytes: &[u8], mime_type: &str) -> String {
    format!("data:{};base64,{}", mime_type, STANDARD.encode(bytes))
}

/// Guess an image MIME type from the file extension
pub fn mime_for_path(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "svg" => "image/svg+xml",
        "jpg" | "jpeg" => "image/jpeg",
        _ => "image/png",
    }
}

/// Read a static asset and return it as a data URI
pub fn file_to_data_uri(path: &Path) -> Result<String> {
    let bytes = fs::read(path).map_err(|e| GeopreviewError::data_load(path, e.to_string()))?;
    Ok(encode_as_data_uri(&bytes, mime_for_path(path)))
}
