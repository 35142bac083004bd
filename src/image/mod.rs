//! Image intake, encoding and the edit request client.

pub mod encoder;
pub mod intake;
mod provider;
pub mod providers;
mod types;

pub use intake::{FileIntake, PreviewHandle, PreviewRegistry};
pub use provider::ImageEditor;
pub use types::{
    EditRequest, EditResult, EditorKind, EncodedImage, GeneratedImage, GenerationMetadata,
    ImageFormat, ImageSource, SelectedImage,
};
