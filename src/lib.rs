#![warn(missing_docs)]
//! nano-edit - edit a photo with a natural-language instruction.
//!
//! The user selects an image, types what should change, and a hosted image
//! model (Gemini) returns the edited picture, optionally with a caption.
//!
//! # Quick Start
//!
//! ```no_run
//! use nano_edit::{EditSession, GeminiEditor, SelectedImage};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> nano_edit::Result<()> {
//!     let editor = GeminiEditor::builder().build()?;
//!     let mut session = EditSession::new(Arc::new(editor));
//!
//!     session.select_file(Some(SelectedImage::from_path("dog.png")?));
//!     session.set_prompt("add a birthday hat");
//!
//!     let result = session.submit().await?;
//!     result.image.save("dog-edited.png")?;
//!     Ok(())
//! }
//! ```
//!
//! # Features
//!
//! - `gemini`: Gemini image editing client
//! - `cli`: `nano-edit` command-line interface

pub mod config;
mod error;
pub mod image;
pub mod shell;

// Re-export error types at crate root
pub use error::{EditError, ErrorCategory, Result, NO_IMAGE_MESSAGE};

pub use config::Config;
pub use image::{
    EditRequest, EditResult, EditorKind, EncodedImage, GeneratedImage, ImageEditor, ImageFormat,
    SelectedImage,
};
pub use shell::{render, EditSession, EditorState, EditorView, Phase};

#[cfg(feature = "gemini")]
pub use image::providers::{GeminiEditor, GeminiEditorBuilder, GeminiModel};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::error::{EditError, Result};
    pub use crate::image::{EditRequest, EditResult, ImageEditor, SelectedImage};
    pub use crate::shell::{EditSession, EditorView};

    #[cfg(feature = "gemini")]
    pub use crate::image::providers::GeminiEditor;
}
