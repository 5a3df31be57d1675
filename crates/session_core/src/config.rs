use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use recognition::EngineSettings;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::preview::DEFAULT_PREVIEW_SCALE;

const SETTINGS_FILE_NAME: &str = "settings.toml";
const APP_DIR_NAME: &str = "latex-snap";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Multiplier applied to the preview label size.
    pub preview_scale: f32,
    pub preview_label_size: [f32; 2],
    /// Longest side kept when decoding a preview.
    pub preview_max_dimension: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temp_dir: Option<PathBuf>,
    pub keep_temp_images: bool,
    pub engine: EngineSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            preview_scale: DEFAULT_PREVIEW_SCALE,
            preview_label_size: [160.0, 48.0],
            preview_max_dimension: 2048,
            temp_dir: None,
            keep_temp_images: false,
            engine: EngineSettings::default(),
        }
    }
}

impl Settings {
    pub fn temp_dir(&self) -> PathBuf {
        self.temp_dir.clone().unwrap_or_else(std::env::temp_dir)
    }
}

pub fn default_settings_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR_NAME).join(SETTINGS_FILE_NAME))
}

/// Defaults, then the settings file (explicit path or the per-user default),
/// then environment overrides. A missing file is normal; an unreadable or
/// malformed one is logged and ignored.
pub fn load_settings(path: Option<&Path>) -> Settings {
    let mut settings = Settings::default();

    if let Some(path) = path.map(Path::to_path_buf).or_else(default_settings_path) {
        match fs::read_to_string(&path) {
            Ok(raw) => match toml::from_str::<Settings>(&raw) {
                Ok(file_cfg) => settings = file_cfg,
                Err(err) => {
                    warn!(path = %path.display(), error = %err, "ignoring malformed settings file")
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "no settings file; using defaults");
            }
            Err(err) => {
                warn!(path = %path.display(), error = %err, "ignoring unreadable settings file")
            }
        }
    }

    apply_env_overrides(&mut settings, |key| std::env::var(key).ok());
    settings
}

pub(crate) fn apply_env_overrides(
    settings: &mut Settings,
    lookup: impl Fn(&str) -> Option<String>,
) {
    if let Some(v) = first_of(&lookup, &["APP__ENGINE_COMMAND", "LATEX_SNAP_ENGINE_COMMAND"]) {
        if let Some(engine) = EngineSettings::from_command_line(&v) {
            settings.engine = engine;
        }
    }
    if let Some(v) = first_of(&lookup, &["APP__ENGINE_URL", "LATEX_SNAP_ENGINE_URL"]) {
        settings.engine = EngineSettings::http(v);
    }

    if let Some(v) = lookup("APP__PREVIEW_SCALE") {
        match v.parse::<f32>() {
            Ok(parsed) if parsed > 0.0 => settings.preview_scale = parsed,
            _ => warn!(value = %v, "ignoring invalid APP__PREVIEW_SCALE"),
        }
    }
    if let Some(v) = lookup("APP__PREVIEW_MAX_DIMENSION") {
        match v.parse::<u32>() {
            Ok(parsed) if parsed > 0 => settings.preview_max_dimension = parsed,
            _ => warn!(value = %v, "ignoring invalid APP__PREVIEW_MAX_DIMENSION"),
        }
    }
    if let Some(v) = lookup("APP__TEMP_DIR") {
        if !v.trim().is_empty() {
            settings.temp_dir = Some(PathBuf::from(v));
        }
    }
    if let Some(v) = lookup("APP__KEEP_TEMP_IMAGES") {
        settings.keep_temp_images = matches!(
            v.trim().to_ascii_lowercase().as_str(),
            "1" | "true" | "yes" | "on"
        );
    }
}

fn first_of(lookup: &impl Fn(&str) -> Option<String>, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| lookup(*key))
}
