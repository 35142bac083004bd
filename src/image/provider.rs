//! Image editor trait.

use crate::error::Result;
use crate::image::types::{EditRequest, EditResult, EditorKind};
use async_trait::async_trait;

/// A remote service that edits an image according to a text instruction.
///
/// Implementations make exactly one attempt per call and keep no state
/// between calls.
#[async_trait]
pub trait ImageEditor: Send + Sync {
    /// Sends the image and instruction, returning the edited image.
    ///
    /// A response without an image is an error, never an empty result.
    async fn edit(&self, request: &EditRequest) -> Result<EditResult>;

    /// Returns the kind of this editor.
    fn kind(&self) -> EditorKind;

    /// Returns the name of this editor for display.
    fn name(&self) -> &str {
        match self.kind() {
            EditorKind::Gemini => "Gemini (Google)",
        }
    }

    /// Checks if the service is reachable and authenticated.
    async fn health_check(&self) -> Result<()>;
}
