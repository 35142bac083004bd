//! Binary-to-text encoding of selected images.

use crate::error::{EditError, Result};
use crate::image::types::{EncodedImage, ImageFormat, ImageSource, SelectedImage};
use base64::Engine;
use std::sync::Arc;

/// Reads the selected image fully and encodes it as base64.
///
/// File sources are read with `tokio::fs`; the encoding itself runs on the
/// blocking pool so large photos do not stall the caller's task.
pub async fn encode(image: &SelectedImage) -> Result<EncodedImage> {
    let bytes: Arc<[u8]> = match image.source() {
        ImageSource::Bytes(bytes) => Arc::clone(bytes),
        ImageSource::File(path) => tokio::fs::read(path).await?.into(),
    };

    // Content wins over a misleading extension
    let mime_type = match ImageFormat::from_magic_bytes(&bytes) {
        Some(sniffed) if sniffed != image.format() => {
            tracing::debug!(
                declared = image.mime_type(),
                sniffed = sniffed.mime_type(),
                "image content does not match its declared type"
            );
            sniffed.mime_type()
        }
        _ => image.mime_type(),
    };

    let len = bytes.len();
    let data = tokio::task::spawn_blocking(move || {
        base64::engine::general_purpose::STANDARD.encode(&bytes)
    })
    .await
    .map_err(|e| EditError::Io(std::io::Error::other(e)))?;

    tracing::debug!(
        name = image.display_name(),
        mime_type,
        bytes = len,
        "encoded selected image"
    );

    Ok(EncodedImage {
        data,
        mime_type: mime_type.to_string(),
    })
}

/// Strips a `data:<mime>;base64,` prefix if present.
pub fn strip_data_url_prefix(input: &str) -> &str {
    if !input.starts_with("data:") {
        return input;
    }
    match input.find(',') {
        Some(pos) => &input[pos + 1..],
        None => input,
    }
}

/// Decodes a base64 string that may be imperfectly formatted.
///
/// Accepts a data URL prefix, embedded whitespace and missing padding.
pub fn decode_base64(input: &str) -> Result<Vec<u8>> {
    let cleaned: String = strip_data_url_prefix(input)
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();

    if let Ok(data) = base64::engine::general_purpose::STANDARD.decode(&cleaned) {
        return Ok(data);
    }

    base64::engine::general_purpose::STANDARD_NO_PAD
        .decode(cleaned.trim_end_matches('='))
        .map_err(|e| EditError::Decode(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn test_encode_in_memory_bytes() {
        let image = SelectedImage::from_bytes(b"hello".to_vec(), "image/png", "dog.png").unwrap();
        let encoded = encode(&image).await.unwrap();
        assert_eq!(encoded.data, "aGVsbG8=");
        assert_eq!(encoded.mime_type, "image/png");
    }

    #[tokio::test]
    async fn test_encode_reads_file_source() {
        let mut file = tempfile::Builder::new().suffix(".jpg").tempfile().unwrap();
        file.write_all(b"hello").unwrap();

        let image = SelectedImage::from_path(file.path()).unwrap();
        let encoded = encode(&image).await.unwrap();
        assert_eq!(encoded.data, "aGVsbG8=");
        assert_eq!(encoded.mime_type, "image/jpeg");
    }

    #[tokio::test]
    async fn test_encode_prefers_sniffed_type() {
        let png = vec![0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0];
        let image = SelectedImage::from_bytes(png, "image/jpeg", "mislabeled.jpg").unwrap();
        let encoded = encode(&image).await.unwrap();
        assert_eq!(encoded.mime_type, "image/png");
    }

    #[tokio::test]
    async fn test_encode_is_repeatable() {
        let image = SelectedImage::from_bytes(vec![0u8, 1, 2, 3], "image/webp", "x.webp").unwrap();
        let first = encode(&image).await.unwrap();
        let second = encode(&image).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_encode_propagates_read_failure() {
        let dir = tempfile::tempdir().unwrap();
        let image = SelectedImage::from_path(dir.path().join("missing.png")).unwrap();
        assert!(matches!(encode(&image).await, Err(EditError::Io(_))));
    }

    #[test]
    fn test_strip_data_url_prefix() {
        assert_eq!(strip_data_url_prefix("data:image/png;base64,AAAA"), "AAAA");
        assert_eq!(strip_data_url_prefix("AAAA"), "AAAA");
        assert_eq!(strip_data_url_prefix("data:broken"), "data:broken");
    }

    #[test]
    fn test_decode_base64_lenient() {
        assert_eq!(decode_base64("aGVsbG8=").unwrap(), b"hello");
        assert_eq!(decode_base64("aGVsbG8").unwrap(), b"hello");
        assert_eq!(decode_base64("aGVs\nbG8=").unwrap(), b"hello");
        assert_eq!(decode_base64("data:image/png;base64,aGVsbG8=").unwrap(), b"hello");
        assert!(matches!(decode_base64("!!!"), Err(EditError::Decode(_))));
    }
}
