//! Core types for image editing.

use crate::error::{EditError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Image formats accepted by the file picker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    /// PNG format (lossless).
    Png,
    /// JPEG format (lossy).
    Jpeg,
    /// WebP format.
    WebP,
}

impl ImageFormat {
    /// All accepted formats, in picker order.
    pub const ALL: [ImageFormat; 3] = [Self::Png, Self::Jpeg, Self::WebP];

    /// Returns the file extension for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
            Self::WebP => "webp",
        }
    }

    /// Returns the MIME type for this format.
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::WebP => "image/webp",
        }
    }

    /// Attempts to detect format from file extension.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "png" => Some(Self::Png),
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "webp" => Some(Self::WebP),
            _ => None,
        }
    }

    /// Parses a MIME type such as `image/png`.
    pub fn from_mime_type(mime: &str) -> Option<Self> {
        let mime = mime.trim().to_lowercase();
        Self::ALL.into_iter().find(|f| f.mime_type() == mime)
    }

    /// Detects image format from magic bytes.
    pub fn from_magic_bytes(data: &[u8]) -> Option<Self> {
        if data.len() < 12 {
            return None;
        }

        // PNG: 89 50 4E 47 0D 0A 1A 0A
        if data.starts_with(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]) {
            return Some(Self::Png);
        }

        // JPEG: FF D8 FF
        if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return Some(Self::Jpeg);
        }

        // WebP: RIFF....WEBP
        if data.starts_with(b"RIFF") && &data[8..12] == b"WEBP" {
            return Some(Self::WebP);
        }

        None
    }
}

/// Where the bytes of a selected image live.
#[derive(Debug, Clone)]
pub enum ImageSource {
    /// Already loaded into memory.
    Bytes(Arc<[u8]>),
    /// On disk; read lazily when encoding.
    File(PathBuf),
}

/// An image the user picked for editing.
#[derive(Debug, Clone)]
pub struct SelectedImage {
    source: ImageSource,
    format: ImageFormat,
    display_name: String,
}

impl SelectedImage {
    /// Selects a file on disk, filtering by extension the way a file picker would.
    ///
    /// The file is not read until it is encoded.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default();
        let format = ImageFormat::from_extension(ext)
            .ok_or_else(|| EditError::UnsupportedFormat(path.display().to_string()))?;
        let display_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        Ok(Self {
            source: ImageSource::File(path.to_path_buf()),
            format,
            display_name,
        })
    }

    /// Selects an in-memory image with a declared MIME type.
    pub fn from_bytes(
        bytes: impl Into<Arc<[u8]>>,
        mime_type: &str,
        display_name: impl Into<String>,
    ) -> Result<Self> {
        let format = ImageFormat::from_mime_type(mime_type)
            .ok_or_else(|| EditError::UnsupportedFormat(mime_type.to_string()))?;
        Ok(Self {
            source: ImageSource::Bytes(bytes.into()),
            format,
            display_name: display_name.into(),
        })
    }

    /// Returns where the bytes come from.
    pub fn source(&self) -> &ImageSource {
        &self.source
    }

    /// Returns the image format.
    pub fn format(&self) -> ImageFormat {
        self.format
    }

    /// Returns the MIME type.
    pub fn mime_type(&self) -> &'static str {
        self.format.mime_type()
    }

    /// Returns the name shown to the user.
    pub fn display_name(&self) -> &str {
        &self.display_name
    }
}

/// Base64 image payload ready to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
    /// Base64 text, without any data URL prefix.
    pub data: String,
    /// MIME type of the encoded bytes.
    pub mime_type: String,
}

/// A request to edit an image with a text instruction.
#[derive(Debug, Clone)]
pub struct EditRequest {
    image: EncodedImage,
    prompt: String,
}

impl EditRequest {
    /// Creates a request, checking that image and prompt are usable.
    pub fn new(image: EncodedImage, prompt: impl Into<String>) -> Result<Self> {
        let prompt = prompt.into();
        if image.data.is_empty() {
            return Err(EditError::MissingInput("image data is empty"));
        }
        if prompt.trim().is_empty() {
            return Err(EditError::MissingInput("prompt is empty"));
        }
        if ImageFormat::from_mime_type(&image.mime_type).is_none() {
            return Err(EditError::UnsupportedFormat(image.mime_type));
        }
        Ok(Self { image, prompt })
    }

    /// Returns the encoded image.
    pub fn image(&self) -> &EncodedImage {
        &self.image
    }

    /// Returns the edit instruction.
    pub fn prompt(&self) -> &str {
        &self.prompt
    }
}

/// Editor backend kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EditorKind {
    /// Google Gemini image models.
    Gemini,
}

impl std::fmt::Display for EditorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Gemini => write!(f, "gemini"),
        }
    }
}

/// Metadata about the edit call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerationMetadata {
    /// Model used for the edit.
    pub model: Option<String>,
    /// Round-trip duration in milliseconds.
    pub duration_ms: Option<u64>,
}

/// An image returned by the service, kept in its base64 wire form.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedImage {
    /// Base64 image data.
    pub data: String,
    /// MIME type declared by the service.
    pub mime_type: String,
    /// Call metadata.
    pub metadata: GenerationMetadata,
}

impl GeneratedImage {
    /// Returns the image as a data URL usable as a display source.
    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.data)
    }

    /// Returns the format, if the declared MIME type is one we know.
    pub fn format(&self) -> Option<ImageFormat> {
        ImageFormat::from_mime_type(&self.mime_type)
    }

    /// Decodes the base64 data into raw bytes.
    pub fn decode(&self) -> Result<Vec<u8>> {
        crate::image::encoder::decode_base64(&self.data)
    }

    /// Decodes and writes the image to the given path.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<usize> {
        let bytes = self.decode()?;
        std::fs::write(path, &bytes)?;
        Ok(bytes.len())
    }
}

/// Outcome of a successful edit. Always carries an image.
#[derive(Debug, Clone, PartialEq)]
#[must_use = "edit result should be displayed or saved"]
pub struct EditResult {
    /// The edited image.
    pub image: GeneratedImage,
    /// Text the model returned alongside the image.
    pub caption: Option<String>,
}

impl EditResult {
    /// Returns the edited image as a data URL.
    pub fn image_url(&self) -> String {
        self.image.to_data_url()
    }
}
