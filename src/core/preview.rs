//! Builds the local image preview shown in the webview.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::Serialize;

use super::validation::ImageUpload;

/// A locally rendered representation of the selected image. The `data_url`
/// is handed straight to an `<img src=...>` in the webview.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ImagePreview {
    pub data_url: String,
    pub file_name: String,
    pub byte_size: usize,
}

impl ImagePreview {
    pub fn from_upload(upload: &ImageUpload) -> Self {
        let data_url = format!(
            "data:{};base64,{}",
            upload.mime,
            STANDARD.encode(&upload.bytes)
        );
        Self {
            data_url,
            file_name: upload.file_name.clone(),
            byte_size: upload.bytes.len(),
        }
    }
}
