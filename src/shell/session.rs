//! Session controller: sequences encode-then-request and settles state.

use crate::error::{EditError, Result};
use crate::image::{encoder, EditRequest, EditResult, ImageEditor, SelectedImage};
use crate::shell::state::{EditorState, PendingEdit};
use crate::shell::view::EditorView;
use std::sync::Arc;

impl PendingEdit {
    /// Encodes the image and sends it with the prompt. Touches no state.
    pub async fn run(self, editor: &dyn ImageEditor) -> Result<EditResult> {
        let encoded = encoder::encode(&self.image).await?;
        let request = EditRequest::new(encoded, self.prompt)?;
        editor.edit(&request).await
    }
}

/// One user's editing session against a single editor backend.
pub struct EditSession {
    state: EditorState,
    editor: Arc<dyn ImageEditor>,
}

impl EditSession {
    /// Creates an idle session.
    pub fn new(editor: Arc<dyn ImageEditor>) -> Self {
        Self::with_state(editor, EditorState::default())
    }

    /// Creates a session around existing state.
    pub fn with_state(editor: Arc<dyn ImageEditor>, state: EditorState) -> Self {
        Self { state, editor }
    }

    /// Returns the session state.
    pub fn state(&self) -> &EditorState {
        &self.state
    }

    /// Returns the editor backend.
    pub fn editor(&self) -> &Arc<dyn ImageEditor> {
        &self.editor
    }

    /// Replaces or clears the selected image.
    pub fn select_file(&mut self, image: Option<SelectedImage>) {
        self.state.select_file(image);
    }

    /// Updates the prompt. Ignored while loading.
    pub fn set_prompt(&mut self, prompt: impl Into<String>) -> bool {
        self.state.set_prompt(prompt)
    }

    /// Starts a submission, moving to `Loading`.
    pub fn begin_submit(&mut self) -> Result<PendingEdit> {
        self.state.begin_submit()
    }

    /// Settles an in-flight submission.
    pub fn finish(&mut self, outcome: Result<EditResult>) -> bool {
        self.state.finish(outcome)
    }

    /// Runs one full submission: guard, encode, request, settle.
    ///
    /// Blocked submissions return the guard error and leave state alone.
    /// Remote failures are recorded in state and also returned.
    pub async fn submit(&mut self) -> Result<&EditResult> {
        let pending = self.state.begin_submit()?;
        match pending.run(self.editor.as_ref()).await {
            Ok(result) => {
                self.state.finish(Ok(result));
                self.state
                    .result()
                    .ok_or_else(|| EditError::UnexpectedResponse("edit did not settle".into()))
            }
            Err(e) => {
                self.state.fail(&e);
                Err(e)
            }
        }
    }

    /// Builds the view model for rendering.
    pub fn view(&self) -> EditorView {
        EditorView::from_state(&self.state)
    }
}
