//! CLI for nano-edit - prompt-driven photo editing.

use clap::{Args, Parser, Subcommand, ValueEnum};
use nano_edit::{
    render, Config, EditSession, GeminiEditor, GeminiModel, ImageEditor, SelectedImage,
};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "nano-edit")]
#[command(about = "Edit photos with a text prompt via Gemini image models")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Model to use
    #[arg(long, value_enum, global = true)]
    model: Option<ModelArg>,

    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Edit one image and save the result
    Edit(EditArgs),

    /// Interactive editing session
    Session,

    /// Check that the API key and model are usable
    Health,
}

#[derive(Args)]
struct EditArgs {
    /// Image to edit (png, jpg, webp)
    input: PathBuf,

    /// What to change, e.g. "add a birthday hat on the dog"
    prompt: String,

    /// Output file path (extension added from the returned type if missing)
    #[arg(short, long)]
    output: PathBuf,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ModelArg {
    /// gemini-2.5-flash-image-preview
    NanoBananaPreview,
    /// gemini-2.5-flash-image
    NanoBanana,
}

impl From<ModelArg> for GeminiModel {
    fn from(arg: ModelArg) -> Self {
        match arg {
            ModelArg::NanoBananaPreview => GeminiModel::NanoBananaPreview,
            ModelArg::NanoBanana => GeminiModel::NanoBanana,
        }
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose {
        "nano_edit=debug"
    } else {
        "nano_edit=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    // Missing API key is a startup failure
    let config = Config::from_env()?;
    tracing::debug!(?config, "loaded configuration");

    let mut builder = GeminiEditor::builder().config(config);
    if let Some(model) = cli.model {
        builder = builder.model(model.into());
    }
    let editor = Arc::new(builder.build()?);

    match cli.command {
        Commands::Edit(args) => edit_once(editor, args, cli.json).await?,
        Commands::Session => run_session(editor).await?,
        Commands::Health => health(editor.as_ref(), cli.json).await?,
    }

    Ok(())
}

async fn edit_once(
    editor: Arc<GeminiEditor>,
    args: EditArgs,
    json_output: bool,
) -> anyhow::Result<()> {
    let mut session = EditSession::new(editor);
    session.select_file(Some(SelectedImage::from_path(&args.input)?));
    session.set_prompt(&args.prompt);

    let result = session.submit().await?;
    let output = if args.output.extension().is_none() {
        let ext = result.image.format().map_or("png", |f| f.extension());
        args.output.with_extension(ext)
    } else {
        args.output.clone()
    };
    let size = result.image.save(&output)?;

    if json_output {
        let out = serde_json::json!({
            "success": true,
            "output": output.display().to_string(),
            "size_bytes": size,
            "mime_type": result.image.mime_type,
            "caption": result.caption,
            "model": result.image.metadata.model,
            "duration_ms": result.image.metadata.duration_ms,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        println!("Edited image: {} ({} bytes)", output.display(), size);
        if let Some(caption) = &result.caption {
            println!("AI: \"{caption}\"");
        }
        if let Some(duration) = result.image.metadata.duration_ms {
            println!("Duration: {}ms", duration);
        }
    }

    Ok(())
}

const SESSION_HELP: &str = "\
Commands:
  open <path>     select an image (png, jpg, webp)
  clear           clear the selected image
  prompt <text>   set the edit instruction
  submit          send the image and prompt
  save <path>     write the edited image to a file
  show            redraw the editor
  help            show this help
  quit            leave the session";

async fn run_session(editor: Arc<GeminiEditor>) -> anyhow::Result<()> {
    let mut session = EditSession::new(editor);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!("{SESSION_HELP}\n");
    print!("{}", render(&session.view()));

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        let (command, rest) = line.split_once(' ').unwrap_or((line, ""));
        let rest = rest.trim();

        match command {
            "" => continue,
            "open" => match SelectedImage::from_path(rest) {
                Ok(image) => session.select_file(Some(image)),
                Err(e) => {
                    println!("{e}");
                    continue;
                }
            },
            "clear" => session.select_file(None),
            "prompt" => {
                session.set_prompt(rest);
            }
            "submit" => {
                if let Err(e) = session.state().check_submit() {
                    println!("{e}");
                    continue;
                }
                print!("{}", render(&session.view()));
                // Remote failures land in the error banner
                let _ = session.submit().await;
            }
            "save" => {
                let Some(result) = session.state().result() else {
                    println!("nothing to save yet");
                    continue;
                };
                match result.image.save(rest) {
                    Ok(size) => println!("saved {rest} ({size} bytes)"),
                    Err(e) => println!("{e}"),
                }
                continue;
            }
            "show" => {}
            "help" => {
                println!("{SESSION_HELP}");
                continue;
            }
            "quit" | "exit" => break,
            other => {
                println!("unknown command: {other} (try `help`)");
                continue;
            }
        }

        print!("{}", render(&session.view()));
    }

    Ok(())
}

async fn health(editor: &GeminiEditor, json_output: bool) -> anyhow::Result<()> {
    let outcome = editor.health_check().await;

    if json_output {
        let out = serde_json::json!({
            "provider": editor.kind().to_string(),
            "model": editor.model().as_str(),
            "ok": outcome.is_ok(),
            "error": outcome.as_ref().err().map(|e| e.to_string()),
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        match &outcome {
            Ok(()) => println!("✓ {} ({})", editor.name(), editor.model().as_str()),
            Err(e) => println!("✗ {} ({}): {e}", editor.name(), editor.model().as_str()),
        }
    }

    outcome.map_err(Into::into)
}
