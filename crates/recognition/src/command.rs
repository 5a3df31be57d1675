use std::{
    io::{self, ErrorKind, Write},
    process::{Command, Output, Stdio},
    thread,
    time::Instant,
};

use shared::{domain::Recognition, error::EngineError};
use tempfile::NamedTempFile;
use tracing::{debug, warn};

use crate::{elapsed_ms, parse_engine_output, ImageKind, RecognitionEngine, INPUT_PLACEHOLDER};

/// Runs an external recognizer once per image.
///
/// When an argument mentions `{input}` the image is staged in a temporary file
/// and its path substituted; otherwise the bytes are written to the child's
/// stdin while its output is collected. The staged file is removed when the
/// call returns.
#[derive(Debug, Clone)]
pub struct CommandEngine {
    program: String,
    args: Vec<String>,
}

impl CommandEngine {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    fn takes_input_path(&self) -> bool {
        self.args.iter().any(|arg| arg.contains(INPUT_PLACEHOLDER))
    }
}

impl RecognitionEngine for CommandEngine {
    fn name(&self) -> &str {
        &self.program
    }

    fn recognize(&self, image: &[u8]) -> Result<Recognition, EngineError> {
        let started = Instant::now();
        let staged = if self.takes_input_path() {
            Some(stage_input(image)?)
        } else {
            None
        };

        let mut command = Command::new(&self.program);
        match &staged {
            Some(file) => {
                let input = file.path().to_string_lossy();
                command
                    .args(
                        self.args
                            .iter()
                            .map(|arg| arg.replace(INPUT_PLACEHOLDER, &input)),
                    )
                    .stdin(Stdio::null());
            }
            None => {
                command.args(&self.args).stdin(Stdio::piped());
            }
        }
        command.stdout(Stdio::piped()).stderr(Stdio::piped());

        debug!(program = %self.program, staged = staged.is_some(), "spawning recognition command");
        let mut child = command.spawn().map_err(|source| EngineError::Spawn {
            program: self.program.clone(),
            source,
        })?;

        // The child may fill stdout or stderr before it reads stdin, so the
        // input is written from its own thread while the output is drained.
        let output = thread::scope(|scope| -> Result<Output, EngineError> {
            let writer = child
                .stdin
                .take()
                .map(|mut stdin| scope.spawn(move || stdin.write_all(image)));
            let output = child.wait_with_output()?;
            if let Some(writer) = writer {
                match writer.join() {
                    Ok(Ok(())) => {}
                    Ok(Err(err)) if err.kind() == ErrorKind::BrokenPipe => {
                        warn!(program = %self.program, "recognition command closed stdin early");
                    }
                    Ok(Err(err)) => return Err(EngineError::Io(err)),
                    Err(_) => {
                        return Err(EngineError::Io(io::Error::other(
                            "stdin writer thread panicked",
                        )))
                    }
                }
            }
            Ok(output)
        })?;
        drop(staged);

        if !output.status.success() {
            return Err(EngineError::Failed {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let (latex, metadata) = parse_engine_output(&stdout)?;
        Ok(Recognition {
            latex,
            elapsed_ms: elapsed_ms(started),
            metadata,
        })
    }
}

fn stage_input(image: &[u8]) -> Result<NamedTempFile, EngineError> {
    let suffix = format!(".{}", ImageKind::sniff(image).extension());
    let mut file = tempfile::Builder::new()
        .prefix("latex-snap-input-")
        .suffix(&suffix)
        .tempfile()?;
    file.write_all(image)?;
    file.flush()?;
    Ok(file)
}
