//! Editor state and its transitions.

use crate::error::{EditError, Result};
use crate::image::{EditResult, FileIntake, PreviewHandle, PreviewRegistry, SelectedImage};

/// Where the editor is in the submit cycle.
///
/// A result and an error message are separate variants, so they can never be
/// shown together.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Phase {
    /// Nothing submitted yet, or inputs changed since the last outcome.
    #[default]
    Idle,
    /// A request is in flight.
    Loading,
    /// The last request produced an edited image.
    Succeeded(EditResult),
    /// The last request failed with this message.
    Failed(String),
}

/// A snapshot of the inputs taken when a submission starts.
#[derive(Debug, Clone)]
pub struct PendingEdit {
    pub(crate) image: SelectedImage,
    pub(crate) prompt: String,
}

impl PendingEdit {
    /// Returns the image being edited.
    pub fn image(&self) -> &SelectedImage {
        &self.image
    }

    /// Returns the instruction being sent.
    pub fn prompt(&self) -> &str {
        &self.prompt
    }
}

/// All state of one editing session.
#[derive(Debug, Default)]
pub struct EditorState {
    intake: FileIntake,
    prompt: String,
    phase: Phase,
}

impl EditorState {
    /// Creates an idle state issuing previews from the given registry.
    pub fn new(registry: PreviewRegistry) -> Self {
        Self {
            intake: FileIntake::new(registry),
            prompt: String::new(),
            phase: Phase::Idle,
        }
    }

    /// Returns the selected image.
    pub fn image(&self) -> Option<&SelectedImage> {
        self.intake.image()
    }

    /// Returns the preview of the selected image.
    pub fn preview(&self) -> Option<&PreviewHandle> {
        self.intake.preview()
    }

    /// Returns the preview registry.
    pub fn registry(&self) -> &PreviewRegistry {
        self.intake.registry()
    }

    /// Returns the current prompt text.
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    /// Returns the current phase.
    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    /// Returns true while a request is in flight.
    pub fn is_loading(&self) -> bool {
        matches!(self.phase, Phase::Loading)
    }

    /// Returns the last successful result.
    pub fn result(&self) -> Option<&EditResult> {
        match &self.phase {
            Phase::Succeeded(result) => Some(result),
            _ => None,
        }
    }

    /// Returns the last error message.
    pub fn error(&self) -> Option<&str> {
        match &self.phase {
            Phase::Failed(message) => Some(message),
            _ => None,
        }
    }

    /// Checks whether a submission would be accepted.
    pub fn check_submit(&self) -> Result<()> {
        if self.is_loading() {
            return Err(EditError::Busy);
        }
        if self.intake.image().is_none() {
            return Err(EditError::MissingInput("no image selected"));
        }
        if self.prompt.trim().is_empty() {
            return Err(EditError::MissingInput("prompt is empty"));
        }
        Ok(())
    }

    /// Returns true if the submit control should be enabled.
    pub fn can_submit(&self) -> bool {
        self.check_submit().is_ok()
    }

    /// Replaces or clears the selected image.
    ///
    /// Clears any previous result or error. While loading, only the
    /// selection changes; the in-flight request settles normally.
    pub fn select_file(&mut self, image: Option<SelectedImage>) {
        self.intake.select(image);
        if !self.is_loading() {
            self.phase = Phase::Idle;
        }
    }

    /// Updates the prompt. Ignored while loading.
    pub fn set_prompt(&mut self, prompt: impl Into<String>) -> bool {
        if self.is_loading() {
            return false;
        }
        self.prompt = prompt.into();
        true
    }

    /// `Idle -> Loading`. Clears the previous result or error.
    ///
    /// When the guard fails, state is left untouched.
    pub fn begin_submit(&mut self) -> Result<PendingEdit> {
        self.check_submit()?;
        let image = self
            .intake
            .image()
            .cloned()
            .ok_or(EditError::MissingInput("no image selected"))?;

        self.phase = Phase::Loading;
        tracing::info!(image = image.display_name(), "edit submitted");

        Ok(PendingEdit {
            image,
            prompt: self.prompt.clone(),
        })
    }

    /// `Loading -> Succeeded | Failed`.
    ///
    /// Returns false, leaving state unchanged, if nothing was in flight.
    pub fn finish(&mut self, outcome: Result<EditResult>) -> bool {
        match outcome {
            Ok(result) => {
                if !self.is_loading() {
                    tracing::warn!("edit result arrived with no request in flight");
                    return false;
                }
                tracing::info!(has_caption = result.caption.is_some(), "edit succeeded");
                self.phase = Phase::Succeeded(result);
                true
            }
            Err(e) => self.fail(&e),
        }
    }

    /// `Loading -> Failed`, recording the error's message.
    pub fn fail(&mut self, error: &EditError) -> bool {
        if !self.is_loading() {
            tracing::warn!(error = %error, "edit failure arrived with no request in flight");
            return false;
        }
        tracing::warn!(error = %error, "edit failed");
        self.phase = Phase::Failed(error.to_string());
        true
    }
}
