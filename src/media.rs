/// Image inputs: raw uploads converted into the inline form the model accepts.
use std::path::Path;

use anyhow::{Context, Result};

use crate::error::RecoveryError;

/// File extensions accepted for chat screenshots.
pub const SUPPORTED_IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

const FALLBACK_MIME_TYPE: &str = "image/jpeg";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageInput {
    pub mime_type: &'static str,
    pub data: Vec<u8>,
}

impl ImageInput {
    pub fn from_bytes(data: Vec<u8>) -> Self {
        Self {
            mime_type: sniff_mime_type(&data),
            data,
        }
    }
}

pub fn sniff_mime_type(bytes: &[u8]) -> &'static str {
    if bytes.starts_with(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]) {
        "image/png"
    } else if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
        "image/jpeg"
    } else if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
        "image/gif"
    } else if bytes.len() >= 12 && &bytes[..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
        "image/webp"
    } else {
        FALLBACK_MIME_TYPE
    }
}

/// Converts every buffer, in order. An empty input yields an empty set.
pub fn convert_images(buffers: Vec<Vec<u8>>) -> Vec<ImageInput> {
    buffers.into_iter().map(ImageInput::from_bytes).collect()
}

pub fn is_supported_image_path(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            SUPPORTED_IMAGE_EXTENSIONS.contains(&ext.as_str())
        })
        .unwrap_or(false)
}

pub fn load_image_file(path: &Path) -> Result<Vec<u8>> {
    if !is_supported_image_path(path) {
        return Err(RecoveryError::Image {
            name: path.display().to_string(),
            reason: format!(
                "expected one of: {}",
                SUPPORTED_IMAGE_EXTENSIONS.join(", ")
            ),
        }
        .into());
    }

    let data = std::fs::read(path)
        .with_context(|| format!("failed to read image file '{}'", path.display()))?;
    if data.is_empty() {
        return Err(RecoveryError::Image {
            name: path.display().to_string(),
            reason: "file is empty".to_string(),
        }
        .into());
    }
    Ok(data)
}

pub fn load_image_files(paths: &[String]) -> Result<Vec<Vec<u8>>> {
    paths
        .iter()
        .map(|path| load_image_file(Path::new(path)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sniffs_common_raster_formats() {
        assert_eq!(
            sniff_mime_type(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0]),
            "image/png"
        );
        assert_eq!(sniff_mime_type(&[0xFF, 0xD8, 0xFF, 0xE0]), "image/jpeg");
        assert_eq!(sniff_mime_type(b"GIF89a...."), "image/gif");
        assert_eq!(sniff_mime_type(b"RIFF\0\0\0\0WEBPVP8 "), "image/webp");
        assert_eq!(sniff_mime_type(b"not an image"), "image/jpeg");
    }

    #[test]
    fn extension_check_is_case_insensitive() {
        assert!(is_supported_image_path(Path::new("chat.PNG")));
        assert!(is_supported_image_path(Path::new("dir/chat.jpeg")));
        assert!(!is_supported_image_path(Path::new("chat.gif")));
        assert!(!is_supported_image_path(Path::new("chat")));
    }
}
