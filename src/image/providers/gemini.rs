//! Gemini (Google) image editing client.

use crate::config::{Config, DEFAULT_BASE_URL};
use crate::error::{parse_retry_after, sanitize_error_message, EditError, Result};
use crate::image::provider::ImageEditor;
use crate::image::types::{EditRequest, EditResult, EditorKind, GeneratedImage, GenerationMetadata};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Gemini image model variants.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum GeminiModel {
    /// Nano Banana preview - Gemini 2.5 Flash Image preview.
    #[default]
    NanoBananaPreview,
    /// Nano Banana - Gemini 2.5 Flash Image.
    NanoBanana,
    /// Any other model identifier.
    Custom(String),
}

impl GeminiModel {
    /// Returns the API model identifier.
    pub fn as_str(&self) -> &str {
        match self {
            Self::NanoBananaPreview => "gemini-2.5-flash-image-preview",
            Self::NanoBanana => "gemini-2.5-flash-image",
            Self::Custom(id) => id,
        }
    }

    /// Maps a model identifier to a variant.
    pub fn from_id(id: &str) -> Self {
        match id {
            "gemini-2.5-flash-image-preview" => Self::NanoBananaPreview,
            "gemini-2.5-flash-image" => Self::NanoBanana,
            other => Self::Custom(other.to_string()),
        }
    }
}

/// Builder for GeminiEditor.
#[derive(Debug, Clone, Default)]
pub struct GeminiEditorBuilder {
    api_key: Option<String>,
    model: Option<GeminiModel>,
    base_url: Option<String>,
}

impl GeminiEditorBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the API key. Falls back to `API_KEY`, then `GOOGLE_API_KEY`.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Sets the Gemini model variant.
    pub fn model(mut self, model: GeminiModel) -> Self {
        self.model = Some(model);
        self
    }

    /// Sets the API base URL.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Applies a resolved configuration; explicit builder values win.
    pub fn config(mut self, config: Config) -> Self {
        self.api_key = self.api_key.or(Some(config.api_key));
        self.model = self.model.or(config.model.as_deref().map(GeminiModel::from_id));
        self.base_url = self.base_url.or(Some(config.base_url));
        self
    }

    /// Builds the editor, resolving missing values from the environment.
    pub fn build(self) -> Result<GeminiEditor> {
        let builder = if self.api_key.is_none() {
            let config = Config::from_env()?;
            self.config(config)
        } else {
            self
        };

        let api_key = builder
            .api_key
            .ok_or_else(|| EditError::Config("no API key provided".into()))?;
        let base_url = builder
            .base_url
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        Ok(GeminiEditor {
            client: reqwest::Client::new(),
            api_key,
            model: builder.model.unwrap_or_default(),
            base_url,
        })
    }
}

/// Gemini image editing client.
pub struct GeminiEditor {
    client: reqwest::Client,
    api_key: String,
    model: GeminiModel,
    base_url: String,
}

impl GeminiEditor {
    /// Creates a new `GeminiEditorBuilder`.
    pub fn builder() -> GeminiEditorBuilder {
        GeminiEditorBuilder::new()
    }

    /// Returns the model this editor calls.
    pub fn model(&self) -> &GeminiModel {
        &self.model
    }

    fn model_url(&self) -> String {
        format!("{}/v1beta/models/{}", self.base_url, self.model.as_str())
    }

    async fn edit_impl(&self, request: &EditRequest) -> Result<EditResult> {
        let start = Instant::now();
        let url = format!("{}:generateContent", self.model_url());
        let body = GeminiRequest::from_edit_request(request);

        tracing::debug!(
            model = self.model.as_str(),
            mime_type = %request.image().mime_type,
            prompt_len = request.prompt().len(),
            "sending Gemini edit request"
        );

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let headers = response.headers().clone();
            let text = response.text().await.unwrap_or_default();
            return Err(parse_error(status.as_u16(), &text, &headers));
        }

        let gemini_response: GeminiResponse = response.json().await?;
        let metadata = GenerationMetadata {
            model: Some(self.model.as_str().to_string()),
            duration_ms: Some(start.elapsed().as_millis() as u64),
        };

        let result = interpret_response(gemini_response, metadata)?;
        tracing::debug!(
            mime_type = %result.image.mime_type,
            has_caption = result.caption.is_some(),
            "Gemini edit complete"
        );
        Ok(result)
    }
}

/// Turns a decoded response into an edit result.
///
/// Parts of the first candidate are scanned in order; for text and for
/// inline data the last one seen wins. An image that is present is always
/// returned. Block and safety signals only pick the error when none is.
fn interpret_response(
    response: GeminiResponse,
    metadata: GenerationMetadata,
) -> Result<EditResult> {
    // Blocks are reported with HTTP 200
    let mut blocked = response.prompt_feedback.and_then(|feedback| {
        let reason = feedback.block_reason?;
        Some(
            feedback
                .block_reason_message
                .unwrap_or_else(|| format!("Prompt blocked: {}", reason)),
        )
    });

    let mut caption = None;
    let mut image = None;
    if let Some(candidate) = response.candidates.into_iter().next() {
        if let Some(ref finish_reason) = candidate.finish_reason {
            match finish_reason.as_str() {
                "SAFETY"
                | "IMAGE_SAFETY"
                | "IMAGE_PROHIBITED_CONTENT"
                | "IMAGE_RECITATION"
                | "RECITATION"
                | "PROHIBITED_CONTENT"
                | "BLOCKLIST" => {
                    blocked.get_or_insert_with(|| {
                        format!("Content blocked by Gemini safety filter: {}", finish_reason)
                    });
                }
                _ => {} // STOP, MAX_TOKENS, NO_IMAGE fall through to the image check
            }
        }

        for part in candidate.content.map(|c| c.parts).unwrap_or_default() {
            if let Some(text) = part.text.filter(|t| !t.is_empty()) {
                caption = Some(text);
            } else if let Some(inline) = part.inline_data {
                image = Some(inline);
            }
        }
    }

    let Some(inline) = image else {
        tracing::warn!(
            caption = ?caption,
            blocked = ?blocked,
            "Gemini response contained no image"
        );
        return Err(match blocked {
            Some(message) => EditError::ContentBlocked(message),
            None => EditError::NoImage { caption },
        });
    };

    if let Some(message) = blocked {
        tracing::debug!(reason = %message, "image returned despite block signal");
    }

    Ok(EditResult {
        image: GeneratedImage {
            data: inline.data,
            mime_type: inline.mime_type,
            metadata,
        },
        caption,
    })
}

fn parse_error(status: u16, text: &str, headers: &reqwest::header::HeaderMap) -> EditError {
    let text = sanitize_error_message(text);
    if status == 404 {
        return EditError::InvalidModel(text);
    }
    if status == 429 {
        let retry_after = parse_retry_after(headers).map(std::time::Duration::from_secs);
        return EditError::RateLimited { retry_after };
    }
    if status == 401 || status == 403 {
        return EditError::Auth(text);
    }
    let lower = text.to_lowercase();
    if lower.contains("safety") || lower.contains("blocked") || lower.contains("prohibited") {
        return EditError::ContentBlocked(text);
    }
    EditError::Api {
        status,
        message: text,
    }
}

#[async_trait]
impl ImageEditor for GeminiEditor {
    async fn edit(&self, request: &EditRequest) -> Result<EditResult> {
        self.edit_impl(request).await
    }

    fn kind(&self) -> EditorKind {
        EditorKind::Gemini
    }

    async fn health_check(&self) -> Result<()> {
        let response = self
            .client
            .get(self.model_url())
            .header("x-goog-api-key", &self.api_key)
            .send()
            .await?;

        match response.status().as_u16() {
            401 | 403 => Err(EditError::Auth("Invalid API key".into())),
            404 => Err(EditError::InvalidModel(format!(
                "model {} not found",
                self.model.as_str()
            ))),
            s if !(200..300).contains(&s) => Err(EditError::Api {
                status: s,
                message: "Health check failed".into(),
            }),
            _ => Ok(()),
        }
    }
}

// Request/Response types
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    generation_config: GeminiConfig,
}

#[derive(Debug, Serialize)]
struct GeminiContent {
    parts: Vec<GeminiRequestPart>,
}

/// A part in a Gemini request - either inline image data or text.
#[derive(Debug, Serialize)]
#[serde(untagged)]
enum GeminiRequestPart {
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
    Text {
        text: String,
    },
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiConfig {
    response_modalities: Vec<&'static str>,
}

impl GeminiRequest {
    fn from_edit_request(req: &EditRequest) -> Self {
        let image = req.image();
        Self {
            contents: vec![GeminiContent {
                parts: vec![
                    GeminiRequestPart::InlineData {
                        inline_data: InlineData {
                            mime_type: image.mime_type.clone(),
                            data: image.data.clone(),
                        },
                    },
                    GeminiRequestPart::Text {
                        text: req.prompt().to_string(),
                    },
                ],
            }],
            generation_config: GeminiConfig {
                response_modalities: vec!["IMAGE", "TEXT"],
            },
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    #[serde(default)]
    content: Option<GeminiContentResponse>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
    #[serde(default)]
    block_reason_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiContentResponse {
    #[serde(default)]
    parts: Vec<GeminiPartResponse>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiPartResponse {
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    inline_data: Option<InlineData>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::types::EncodedImage;

    fn request() -> EditRequest {
        EditRequest::new(
            EncodedImage {
                data: "iVBORw0KGgo=".into(),
                mime_type: "image/png".into(),
            },
            "add a birthday hat",
        )
        .unwrap()
    }

    fn interpret(json: &str) -> Result<EditResult> {
        let resp: GeminiResponse = serde_json::from_str(json).unwrap();
        interpret_response(resp, GenerationMetadata::default())
    }

    #[test]
    fn test_gemini_model_ids() {
        assert_eq!(GeminiModel::default().as_str(), "gemini-2.5-flash-image-preview");
        assert_eq!(GeminiModel::NanoBanana.as_str(), "gemini-2.5-flash-image");
        assert_eq!(
            GeminiModel::from_id("gemini-2.5-flash-image"),
            GeminiModel::NanoBanana
        );
        assert_eq!(GeminiModel::from_id("my-model").as_str(), "my-model");
    }

    #[test]
    fn test_builder_with_explicit_key() {
        let editor = GeminiEditorBuilder::new()
            .api_key("test-key")
            .model(GeminiModel::NanoBanana)
            .base_url("http://localhost:9999/")
            .build()
            .unwrap();
        assert_eq!(editor.model(), &GeminiModel::NanoBanana);
        assert_eq!(
            editor.model_url(),
            "http://localhost:9999/v1beta/models/gemini-2.5-flash-image"
        );
        assert_eq!(editor.name(), "Gemini (Google)");
    }

    #[test]
    fn test_builder_config_does_not_override_explicit_values() {
        let config = Config::from_lookup(|key| match key {
            "API_KEY" => Some("from-env".into()),
            "NANO_EDIT_MODEL" => Some("gemini-2.5-flash-image".into()),
            _ => None,
        })
        .unwrap();
        let editor = GeminiEditor::builder()
            .api_key("explicit")
            .config(config)
            .build()
            .unwrap();
        assert_eq!(editor.api_key, "explicit");
        assert_eq!(editor.model(), &GeminiModel::NanoBanana);
        assert_eq!(editor.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn test_request_body_shape() {
        let body = serde_json::to_value(GeminiRequest::from_edit_request(&request())).unwrap();
        let expected = serde_json::json!({
            "contents": [{
                "parts": [
                    {"inlineData": {"mimeType": "image/png", "data": "iVBORw0KGgo="}},
                    {"text": "add a birthday hat"}
                ]
            }],
            "generationConfig": {"responseModalities": ["IMAGE", "TEXT"]}
        });
        assert_eq!(body, expected);
    }

    #[test]
    fn test_image_and_caption() {
        let result = interpret(
            r#"{
                "candidates": [{
                    "content": {"parts": [
                        {"text": "Added a hat!"},
                        {"inlineData": {"mimeType": "image/png", "data": "AAAA"}}
                    ]},
                    "finishReason": "STOP"
                }]
            }"#,
        )
        .unwrap();
        assert_eq!(result.caption.as_deref(), Some("Added a hat!"));
        assert_eq!(result.image_url(), "data:image/png;base64,AAAA");
    }

    #[test]
    fn test_last_part_of_each_kind_wins() {
        let result = interpret(
            r#"{
                "candidates": [{
                    "content": {"parts": [
                        {"inlineData": {"mimeType": "image/png", "data": "FIRST"}},
                        {"text": "one"},
                        {"inlineData": {"mimeType": "image/jpeg", "data": "SECOND"}},
                        {"text": "two"}
                    ]}
                }]
            }"#,
        )
        .unwrap();
        assert_eq!(result.image.data, "SECOND");
        assert_eq!(result.image.mime_type, "image/jpeg");
        assert_eq!(result.caption.as_deref(), Some("two"));
    }

    #[test]
    fn test_text_only_response_is_no_image() {
        let err = interpret(
            r#"{"candidates": [{"content": {"parts": [{"text": "I cannot edit this"}]}}]}"#,
        )
        .unwrap_err();
        match err {
            EditError::NoImage { caption } => {
                assert_eq!(caption.as_deref(), Some("I cannot edit this"))
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_empty_candidates_is_no_image() {
        assert!(matches!(
            interpret(r#"{"candidates": []}"#),
            Err(EditError::NoImage { caption: None })
        ));
        assert!(matches!(
            interpret(r#"{"candidates": [{"finishReason": "NO_IMAGE"}]}"#),
            Err(EditError::NoImage { .. })
        ));
    }

    #[test]
    fn test_prompt_feedback_block() {
        let err = interpret(
            r#"{
                "candidates": [],
                "promptFeedback": {
                    "blockReason": "SAFETY",
                    "blockReasonMessage": "Prompt was blocked due to safety"
                }
            }"#,
        )
        .unwrap_err();
        let expected = "Prompt was blocked due to safety";
        assert!(matches!(err, EditError::ContentBlocked(ref m) if m == expected));
    }

    #[test]
    fn test_safety_finish_reason() {
        let err = interpret(r#"{"candidates": [{"finishReason": "IMAGE_SAFETY"}]}"#).unwrap_err();
        assert!(err.is_refusal());
        assert!(err.to_string().contains("IMAGE_SAFETY"));
    }

    #[test]
    fn test_image_wins_over_safety_finish_reason() {
        let result = interpret(
            r#"{
                "candidates": [{
                    "content": {"parts": [
                        {"inlineData": {"mimeType": "image/png", "data": "AAAA"}}
                    ]},
                    "finishReason": "IMAGE_SAFETY"
                }]
            }"#,
        )
        .unwrap();
        assert_eq!(result.image_url(), "data:image/png;base64,AAAA");
    }

    #[test]
    fn test_image_wins_over_prompt_feedback_block() {
        let result = interpret(
            r#"{
                "candidates": [{
                    "content": {"parts": [
                        {"text": "Done"},
                        {"inlineData": {"mimeType": "image/webp", "data": "BBBB"}}
                    ]}
                }],
                "promptFeedback": {"blockReason": "SAFETY"}
            }"#,
        )
        .unwrap();
        assert_eq!(result.image.data, "BBBB");
        assert_eq!(result.caption.as_deref(), Some("Done"));
    }

    #[test]
    fn test_block_without_image_keeps_feedback_message() {
        let err = interpret(
            r#"{
                "candidates": [{"content": {"parts": [{"text": "no"}]}, "finishReason": "SAFETY"}],
                "promptFeedback": {"blockReason": "OTHER"}
            }"#,
        )
        .unwrap_err();
        assert!(matches!(err, EditError::ContentBlocked(ref m) if m == "Prompt blocked: OTHER"));
    }

    #[test]
    fn test_parse_error_statuses() {
        let headers = reqwest::header::HeaderMap::new();
        assert!(matches!(
            parse_error(401, "bad key", &headers),
            EditError::Auth(_)
        ));
        assert!(matches!(
            parse_error(404, "", &headers),
            EditError::InvalidModel(_)
        ));
        assert!(matches!(
            parse_error(429, "", &headers),
            EditError::RateLimited { retry_after: None }
        ));
        assert!(matches!(
            parse_error(400, "Request blocked by safety settings", &headers),
            EditError::ContentBlocked(_)
        ));
        match parse_error(500, r#"{"error": {"message": "internal"}}"#, &headers) {
            EditError::Api { status, message } => {
                assert_eq!(status, 500);
                assert_eq!(message, "internal");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
