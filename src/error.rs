//! Error types for image editing.

use std::time::Duration;

/// Message shown when the model answers without an image.
pub const NO_IMAGE_MESSAGE: &str =
    "API did not return an image. It might have refused the request.";

/// Errors that can occur while preparing or running an edit.
#[derive(Debug, thiserror::Error)]
pub enum EditError {
    /// Required configuration (API key) is missing.
    #[error("configuration error: {0}")]
    Config(String),

    /// API key rejected by the service.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Rate limit exceeded.
    #[error("rate limited, retry after {retry_after:?}")]
    RateLimited { retry_after: Option<Duration> },

    /// Model not found.
    #[error("model not found: {0}")]
    InvalidModel(String),

    /// Content was blocked by safety filters.
    #[error("content blocked: {0}")]
    ContentBlocked(String),

    /// The service answered without a generated image.
    #[error("{}", NO_IMAGE_MESSAGE)]
    NoImage {
        /// Text the model returned instead, if any.
        caption: Option<String>,
    },

    /// The response did not have the expected shape.
    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),

    /// No image selected or prompt empty.
    #[error("missing input: {0}")]
    MissingInput(&'static str),

    /// A request is already in flight for this session.
    #[error("an edit is already in progress")]
    Busy,

    /// File type not accepted by the file picker.
    #[error("unsupported image type: {0}")]
    UnsupportedFormat(String),

    /// Network or HTTP error.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Failed to decode base64 data.
    #[error("failed to decode: {0}")]
    Decode(String),

    /// I/O error (reading the selected file, saving the result).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Coarse grouping of errors as the user experiences them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Submission was blocked locally; the service was never called.
    MissingInput,
    /// Local I/O, network or service-level failure.
    Transport,
    /// The service answered but declined to produce an image.
    Refusal,
}

impl EditError {
    /// Returns the category this error belongs to.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::MissingInput(_) | Self::Busy | Self::UnsupportedFormat(_) => {
                ErrorCategory::MissingInput
            }
            Self::NoImage { .. } | Self::ContentBlocked(_) => ErrorCategory::Refusal,
            _ => ErrorCategory::Transport,
        }
    }

    /// Returns true if the service declined to produce an image.
    pub fn is_refusal(&self) -> bool {
        self.category() == ErrorCategory::Refusal
    }
}

/// Result type alias for editing operations.
pub type Result<T> = std::result::Result<T, EditError>;

const MAX_ERROR_MESSAGE_LEN: usize = 300;

/// Cleans up an error body from the service for display.
///
/// Pulls `error.message` out of Google-style JSON error bodies, collapses
/// whitespace and truncates long bodies.
pub(crate) fn sanitize_error_message(text: &str) -> String {
    let extracted = serde_json::from_str::<serde_json::Value>(text)
        .ok()
        .and_then(|v| {
            v.pointer("/error/message")
                .and_then(|m| m.as_str())
                .map(str::to_string)
        })
        .unwrap_or_else(|| text.to_string());

    let collapsed = extracted.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.is_empty() {
        return "empty error response".to_string();
    }
    if collapsed.chars().count() > MAX_ERROR_MESSAGE_LEN {
        let truncated: String = collapsed.chars().take(MAX_ERROR_MESSAGE_LEN).collect();
        format!("{truncated}...")
    } else {
        collapsed
    }
}

/// Parses a `Retry-After` header given in seconds.
pub(crate) fn parse_retry_after(headers: &reqwest::header::HeaderMap) -> Option<u64> {
    headers
        .get(reqwest::header::RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse()
        .ok()
}
