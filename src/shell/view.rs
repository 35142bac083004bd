//! View model and text rendering of the editor.

use crate::shell::state::EditorState;
use serde::Serialize;
use std::fmt::Write;

const PANEL_WIDTH: usize = 36;
const URL_PREVIEW_LEN: usize = 28;

/// Everything the display needs, derived from state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EditorView {
    /// Name of the selected image.
    pub original_name: Option<String>,
    /// Preview URL of the original image.
    pub original: Option<String>,
    /// Data URL of the edited image.
    pub edited: Option<String>,
    /// Caption shown beneath the edited image.
    pub caption: Option<String>,
    /// Error banner text.
    pub error: Option<String>,
    /// Current prompt text.
    pub prompt: String,
    /// True while a request is in flight.
    pub loading: bool,
    /// Whether the submit control is enabled.
    pub submit_enabled: bool,
    /// Label on the submit control.
    pub submit_label: &'static str,
}

impl EditorView {
    /// Builds the view from state.
    pub fn from_state(state: &EditorState) -> Self {
        let result = state.result();
        Self {
            original_name: state.image().map(|i| i.display_name().to_string()),
            original: state.preview().map(|p| p.url().to_string()),
            edited: result.map(|r| r.image_url()),
            caption: result.and_then(|r| r.caption.clone()),
            error: state.error().map(str::to_string),
            prompt: state.prompt().to_string(),
            loading: state.is_loading(),
            submit_enabled: state.can_submit(),
            submit_label: if state.is_loading() {
                "Generating..."
            } else {
                "Generate Edit"
            },
        }
    }
}

fn shorten(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let head: String = text.chars().take(max.saturating_sub(3)).collect();
        format!("{head}...")
    }
}

fn panel(out: &mut String, title: &str, lines: &[String]) {
    let _ = writeln!(out, "+-{:-<w$}-+", title, w = PANEL_WIDTH);
    for line in lines {
        let _ = writeln!(out, "| {:<w$} |", shorten(line, PANEL_WIDTH), w = PANEL_WIDTH);
    }
    let _ = writeln!(out, "+-{:-<w$}-+", "", w = PANEL_WIDTH);
}

/// Renders the view as plain text: original panel, edited panel with its
/// caption, prompt, submit control and the error banner.
pub fn render(view: &EditorView) -> String {
    let mut out = String::new();

    let original = match (&view.original_name, &view.original) {
        (Some(name), Some(url)) => vec![name.clone(), url.clone()],
        _ => vec!["(no image selected)".to_string()],
    };
    panel(&mut out, "Original", &original);

    let edited = if view.loading {
        vec!["generating...".to_string()]
    } else if let Some(url) = &view.edited {
        vec![shorten(url, URL_PREVIEW_LEN)]
    } else {
        vec!["(no edit yet)".to_string()]
    };
    panel(&mut out, "Edited", &edited);

    if let Some(caption) = &view.caption {
        let _ = writeln!(out, "AI: \"{caption}\"");
    }

    let prompt = if view.prompt.is_empty() {
        "(empty)"
    } else {
        view.prompt.as_str()
    };
    let _ = writeln!(out, "Prompt: {prompt}");

    let marker = if view.submit_enabled { "[x]" } else { "[ ]" };
    let _ = writeln!(out, "{marker} {}", view.submit_label);

    if let Some(error) = &view.error {
        let _ = writeln!(out, "!! {error}");
    }

    out
}
