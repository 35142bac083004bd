//! Image editing example - runs one edit through an `EditSession`.
//!
//! Run with: `cargo run --example edit_image -- <input_image.png> ["prompt"]`
//!
//! Requires `API_KEY` (or `GOOGLE_API_KEY`) environment variable.

use nano_edit::{render, EditSession, GeminiEditor, SelectedImage};
use std::sync::Arc;

#[tokio::main]
async fn main() -> nano_edit::Result<()> {
    let mut args = std::env::args().skip(1);
    let input_path = args
        .next()
        .expect("Usage: edit_image <input_image.png> [prompt]");
    let prompt = args
        .next()
        .unwrap_or_else(|| "Make the colors more vibrant and add a warm sunset glow".into());

    let editor = GeminiEditor::builder().build()?;
    let mut session = EditSession::new(Arc::new(editor));
    session.select_file(Some(SelectedImage::from_path(&input_path)?));
    session.set_prompt(prompt);

    match session.submit().await {
        Ok(result) => {
            let size = result.image.save("edited.png")?;
            println!("Edited image saved to edited.png ({size} bytes)");
        }
        Err(e) => eprintln!("Edit failed: {e}"),
    }

    print!("{}", render(&session.view()));
    Ok(())
}
