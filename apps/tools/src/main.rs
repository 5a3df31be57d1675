use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use recognition::{build_engine, EngineSettings, RecognitionEngine};
use serde::Serialize;
use session_core::{
    load_settings, ImageOrigin, SessionController, SessionState, Settings, SystemClipboard,
};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "latex-snap-tools", about = "Headless image-to-LaTeX helpers")]
struct Cli {
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long, conflicts_with = "engine_command")]
    engine_url: Option<String>,
    #[arg(long)]
    engine_command: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Recognize an image file and print its LaTeX.
    Recognize {
        path: PathBuf,
        #[arg(long)]
        json: bool,
        /// Also copy the result to the clipboard.
        #[arg(long)]
        copy: bool,
    },
    /// Recognize the image currently on the clipboard.
    Paste {
        #[arg(long)]
        json: bool,
        #[arg(long)]
        copy: bool,
    },
    /// Print the resolved settings as TOML.
    Settings,
}

#[derive(Debug, Serialize)]
struct RecognitionReport<'a> {
    latex: &'a str,
    source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    size: Option<[usize; 2]>,
    copied: bool,
}

fn report(state: &SessionState, copied: bool) -> RecognitionReport<'_> {
    let source = match state.preview.as_ref().map(|preview| &preview.origin) {
        Some(ImageOrigin::File(path)) => path.display().to_string(),
        Some(ImageOrigin::Clipboard) => "clipboard".to_string(),
        None => "unrenderable image".to_string(),
    };
    debug!(source = %source, copied, "building recognition report");
    RecognitionReport {
        latex: &state.editor_text,
        source,
        size: state.preview.as_ref().map(|preview| preview.size()),
        copied,
    }
}

fn resolve_settings(cli: &Cli) -> Settings {
    let mut settings = load_settings(cli.config.as_deref());
    if let Some(engine) = cli
        .engine_command
        .as_deref()
        .and_then(EngineSettings::from_command_line)
    {
        settings.engine = engine;
    }
    if let Some(url) = &cli.engine_url {
        settings.engine = EngineSettings::http(url.clone());
    }
    settings
}

type ToolController = SessionController<Box<dyn RecognitionEngine>, SystemClipboard>;

fn build_controller(settings: Settings) -> Result<ToolController> {
    let engine = build_engine(&settings.engine).context("invalid recognition engine settings")?;
    Ok(SessionController::new(engine, SystemClipboard::new(), settings))
}

fn finish(controller: &mut ToolController, loaded: &SessionState, json: bool, copy: bool) -> Result<()> {
    info!(chars = loaded.editor_text.chars().count(), "recognized image");
    let copied = if copy {
        controller
            .copy_current_text(loaded)
            .context("failed to copy LaTeX to clipboard")?
            .is_some()
    } else {
        false
    };
    if copy {
        info!(copied, "clipboard copy finished");
    }

    if json {
        println!("{}", serde_json::to_string(&report(loaded, copied))?);
    } else {
        println!("{}", loaded.editor_text);
    }
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();
    let cli = Cli::parse();
    let settings = resolve_settings(&cli);
    debug!(engine = %settings.engine.describe(), "resolved settings");

    match cli.command {
        Command::Settings => {
            print!("{}", toml::to_string_pretty(&settings)?);
            Ok(())
        }
        Command::Recognize { path, json, copy } => {
            info!(path = %path.display(), "recognizing image file");
            let mut controller = build_controller(settings)?;
            let loaded = controller
                .load_from_path(&SessionState::new(), &path)
                .with_context(|| format!("failed to recognize {}", path.display()))?;
            finish(&mut controller, &loaded, json, copy)
        }
        Command::Paste { json, copy } => {
            let mut controller = build_controller(settings)?;
            let Some(loaded) = controller
                .load_from_clipboard(&SessionState::new())
                .context("failed to recognize clipboard image")?
            else {
                info!("paste skipped: clipboard holds no image");
                bail!("clipboard holds no image");
            };
            finish(&mut controller, &loaded, json, copy)
        }
    }
}
