//! Recognition engines: turn encoded image bytes into LaTeX source.
//!
//! The engine itself is an external collaborator. This crate only knows how to
//! hand it an image (a child process or an HTTP endpoint) and how to read the
//! answer back.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use shared::{domain::Recognition, error::EngineError};

mod command;
mod http;

pub use command::CommandEngine;
pub use http::HttpEngine;

/// Argument placeholder replaced by the path of the staged input image.
pub const INPUT_PLACEHOLDER: &str = "{input}";
pub const DEFAULT_COMMAND: &str = "rapid_latex_ocr";
const DEFAULT_HTTP_TIMEOUT_SECONDS: u64 = 60;

pub trait RecognitionEngine {
    /// Short label used in logs.
    fn name(&self) -> &str;

    fn recognize(&self, image: &[u8]) -> Result<Recognition, EngineError>;
}

impl<T: RecognitionEngine + ?Sized> RecognitionEngine for Box<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn recognize(&self, image: &[u8]) -> Result<Recognition, EngineError> {
        (**self).recognize(image)
    }
}

impl<T: RecognitionEngine + ?Sized> RecognitionEngine for &T {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn recognize(&self, image: &[u8]) -> Result<Recognition, EngineError> {
        (**self).recognize(image)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EngineSettings {
    Command {
        program: String,
        #[serde(default = "default_command_args")]
        args: Vec<String>,
    },
    Http {
        url: String,
        #[serde(default = "default_http_timeout_seconds")]
        timeout_seconds: u64,
    },
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self::Command {
            program: DEFAULT_COMMAND.to_string(),
            args: default_command_args(),
        }
    }
}

impl EngineSettings {
    pub fn http(url: impl Into<String>) -> Self {
        Self::Http {
            url: url.into(),
            timeout_seconds: DEFAULT_HTTP_TIMEOUT_SECONDS,
        }
    }

    pub fn command(program: impl Into<String>) -> Self {
        Self::Command {
            program: program.into(),
            args: default_command_args(),
        }
    }

    /// Splits a whitespace-separated command line into program and arguments.
    /// Without explicit arguments the image path is passed as the only one.
    pub fn from_command_line(command_line: &str) -> Option<Self> {
        let mut parts = command_line.split_whitespace().map(str::to_string);
        let program = parts.next()?;
        let args: Vec<String> = parts.collect();
        if args.is_empty() {
            Some(Self::command(program))
        } else {
            Some(Self::Command { program, args })
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Self::Command { program, args } if args.is_empty() => format!("command `{program}`"),
            Self::Command { program, args } => format!("command `{program} {}`", args.join(" ")),
            Self::Http { url, .. } => format!("http {url}"),
        }
    }
}

fn default_command_args() -> Vec<String> {
    vec![INPUT_PLACEHOLDER.to_string()]
}

fn default_http_timeout_seconds() -> u64 {
    DEFAULT_HTTP_TIMEOUT_SECONDS
}

pub fn build_engine(settings: &EngineSettings) -> Result<Box<dyn RecognitionEngine>, EngineError> {
    match settings {
        EngineSettings::Command { program, args } => {
            if program.trim().is_empty() {
                return Err(EngineError::Unsupported(
                    "engine command program is empty".to_string(),
                ));
            }
            Ok(Box::new(CommandEngine::new(program.clone(), args.clone())))
        }
        EngineSettings::Http {
            url,
            timeout_seconds,
        } => {
            let url = url.trim();
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(EngineError::Unsupported(format!(
                    "engine url must start with http:// or https://, got '{url}'"
                )));
            }
            let timeout = Duration::from_secs((*timeout_seconds).max(1));
            Ok(Box::new(HttpEngine::new(url, timeout)?))
        }
    }
}

/// Interprets raw engine output.
///
/// Accepts a JSON object carrying a `latex` field (the remaining fields become
/// metadata), a JSON string, or plain text, in which case the last non-empty
/// line wins so that engines printing progress before the answer still work.
pub fn parse_engine_output(raw: &str) -> Result<(String, Option<Value>), EngineError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(EngineError::EmptyOutput);
    }

    let (latex, metadata) = if trimmed.starts_with('{') {
        let mut object = match serde_json::from_str::<Value>(trimmed) {
            Ok(Value::Object(object)) => object,
            _ => {
                return Err(EngineError::InvalidResponse(format!(
                    "expected a JSON object with a `latex` field, got: {trimmed}"
                )))
            }
        };
        let latex = match object.remove("latex") {
            Some(Value::String(latex)) => latex,
            _ => {
                return Err(EngineError::InvalidResponse(
                    "JSON response has no string `latex` field".to_string(),
                ))
            }
        };
        let metadata = (!object.is_empty()).then_some(Value::Object(object));
        (latex, metadata)
    } else if trimmed.starts_with('"') {
        let latex = serde_json::from_str::<String>(trimmed)
            .map_err(|err| EngineError::InvalidResponse(err.to_string()))?;
        (latex, None)
    } else {
        let last_line = trimmed
            .lines()
            .rev()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .unwrap_or_default();
        (last_line.to_string(), None)
    };

    let latex = latex.trim().to_string();
    if latex.is_empty() {
        return Err(EngineError::EmptyOutput);
    }
    Ok((latex, metadata))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    Png,
    Jpeg,
    Bmp,
    Unknown,
}

impl ImageKind {
    pub fn sniff(bytes: &[u8]) -> Self {
        if bytes.starts_with(b"\x89PNG\r\n\x1a\n") {
            Self::Png
        } else if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
            Self::Jpeg
        } else if bytes.starts_with(b"BM") {
            Self::Bmp
        } else {
            Self::Unknown
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Png | Self::Unknown => "png",
            Self::Jpeg => "jpg",
            Self::Bmp => "bmp",
        }
    }

    pub fn mime(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::Bmp => "image/bmp",
            Self::Unknown => "application/octet-stream",
        }
    }
}

pub(crate) fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
