//! Presentation shell: session state, controller and rendering.

mod session;
mod state;
mod view;

pub use session::EditSession;
pub use state::{EditorState, PendingEdit, Phase};
pub use view::{render, EditorView};
