use std::path::PathBuf;

mod controller;
mod ui;

use anyhow::Context;
use clap::Parser;
use eframe::egui;
use recognition::{build_engine, EngineSettings};
use session_core::{load_settings, SessionController, Settings, SystemClipboard};
use tracing_subscriber::EnvFilter;

use crate::ui::{LatexSnapApp, WINDOW_TITLE};

#[derive(Parser, Debug)]
#[command(name = "latex-snap", about = "Turn an image of an equation into LaTeX")]
struct Args {
    /// Settings file (defaults to <config dir>/latex-snap/settings.toml).
    #[arg(long)]
    config: Option<PathBuf>,
    /// Use a pix2tex-style HTTP recognition service.
    #[arg(long, conflicts_with = "engine_command")]
    engine_url: Option<String>,
    /// Recognition program; `{input}` in its arguments becomes the image path.
    #[arg(long)]
    engine_command: Option<String>,
}

fn apply_cli_overrides(settings: &mut Settings, args: &Args) {
    if let Some(engine) = args
        .engine_command
        .as_deref()
        .and_then(EngineSettings::from_command_line)
    {
        settings.engine = engine;
    }
    if let Some(url) = &args.engine_url {
        settings.engine = EngineSettings::http(url.clone());
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
    let args = Args::parse();

    let mut settings = load_settings(args.config.as_deref());
    apply_cli_overrides(&mut settings, &args);
    tracing::info!(engine = %settings.engine.describe(), "starting latex-snap");

    let engine = build_engine(&settings.engine).context("invalid recognition engine settings")?;
    let controller = SessionController::new(engine, SystemClipboard::new(), settings);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(WINDOW_TITLE)
            .with_inner_size([520.0, 560.0])
            .with_min_inner_size([360.0, 400.0]),
        ..Default::default()
    };
    eframe::run_native(
        WINDOW_TITLE,
        options,
        Box::new(|_cc| Ok(Box::new(LatexSnapApp::new(controller)))),
    )
    .map_err(|err| anyhow::anyhow!("failed to run window: {err}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_url_flag_selects_http_engine() {
        let args = Args::parse_from(["latex-snap", "--engine-url", "http://127.0.0.1:8502/predict/"]);
        let mut settings = Settings::default();
        apply_cli_overrides(&mut settings, &args);
        assert_eq!(
            settings.engine,
            EngineSettings::http("http://127.0.0.1:8502/predict/")
        );
    }

    #[test]
    fn engine_command_flag_keeps_explicit_arguments() {
        let args = Args::parse_from(["latex-snap", "--engine-command", "pix2tex --file {input}"]);
        let mut settings = Settings::default();
        apply_cli_overrides(&mut settings, &args);
        assert_eq!(
            settings.engine,
            EngineSettings::Command {
                program: "pix2tex".to_string(),
                args: vec!["--file".to_string(), "{input}".to_string()],
            }
        );
    }

    #[test]
    fn engine_flags_conflict() {
        let parsed = Args::try_parse_from([
            "latex-snap",
            "--engine-url",
            "http://localhost/",
            "--engine-command",
            "pix2tex",
        ]);
        assert!(parsed.is_err());
    }

    #[test]
    fn no_flags_leave_settings_untouched() {
        let args = Args::parse_from(["latex-snap"]);
        let mut settings = Settings::default();
        apply_cli_overrides(&mut settings, &args);
        assert_eq!(settings, Settings::default());
    }
}
