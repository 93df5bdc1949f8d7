//! External command capability.
//!
//! Runs a program once per chunk. Arguments may contain `{path}` and
//! `{chunk}` placeholders; when no argument mentions `{chunk}`, the
//! chunk text is written to the program's stdin instead. For
//! summaries the trimmed stdout is the result; for embeddings stdout
//! must be a JSON array of numbers.
//!
//! ```text
//! codebrief summarize ./repo --capability command \
//!     --command ollama --arg run --arg llama3.2:1b
//! ```

use std::io::{self, Write};
use std::process::{Command, Stdio};
use std::thread;

use super::{Capability, ChunkRequest};
use crate::core::error::CapabilityError;
use crate::core::types::{path_key, ChunkResult, OutputKind};

const PATH_PLACEHOLDER: &str = "{path}";
const CHUNK_PLACEHOLDER: &str = "{chunk}";

#[derive(Debug, Clone)]
pub struct CommandCapability {
    program: String,
    args: Vec<String>,
    kind: OutputKind,
}

impl CommandCapability {
    pub fn new(program: impl Into<String>, args: Vec<String>, kind: OutputKind) -> Self {
        Self {
            program: program.into(),
            args,
            kind,
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    fn chunk_via_stdin(&self) -> bool {
        !self.args.iter().any(|a| a.contains(CHUNK_PLACEHOLDER))
    }

    fn render_args(&self, request: &ChunkRequest<'_>) -> Vec<String> {
        let path = path_key(request.path);
        self.args
            .iter()
            .map(|a| {
                a.replace(PATH_PLACEHOLDER, &path)
                    .replace(CHUNK_PLACEHOLDER, request.text)
            })
            .collect()
    }

    fn parse_output(&self, stdout: &str) -> Result<ChunkResult, CapabilityError> {
        let trimmed = stdout.trim();
        match self.kind {
            OutputKind::Summary => {
                if trimmed.is_empty() {
                    return Err(CapabilityError::MalformedResponse(
                        "empty output".to_string(),
                    ));
                }
                Ok(ChunkResult::Summary(trimmed.to_string()))
            }
            OutputKind::Embedding => serde_json::from_str::<Vec<f32>>(trimmed)
                .map(ChunkResult::Vector)
                .map_err(|e| {
                    CapabilityError::MalformedResponse(format!("expected JSON number array: {e}"))
                }),
        }
    }
}

impl Capability for CommandCapability {
    fn name(&self) -> &str {
        &self.program
    }

    fn kind(&self) -> OutputKind {
        self.kind
    }

    fn process(&self, request: &ChunkRequest<'_>) -> Result<ChunkResult, CapabilityError> {
        let via_stdin = self.chunk_via_stdin();

        let mut child = Command::new(&self.program)
            .args(self.render_args(request))
            .stdin(if via_stdin {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| CapabilityError::Unavailable(format!("{}: {e}", self.program)))?;

        // stdin is written while stdout and stderr are drained, so a
        // program echoing a large chunk never fills both pipes at once
        let stdin = if via_stdin { child.stdin.take() } else { None };
        let (output, written) = thread::scope(|scope| {
            let writer = stdin.map(|mut stdin| {
                scope.spawn(move || stdin.write_all(request.text.as_bytes()))
            });
            let output = child.wait_with_output();
            let written = writer.map(|handle| handle.join());
            (output, written)
        });

        let output = output
            .map_err(|e| CapabilityError::failed(format!("waiting for {}: {e}", self.program)))?;

        match written {
            Some(Ok(Err(e))) if e.kind() != io::ErrorKind::BrokenPipe => {
                return Err(CapabilityError::failed(format!("writing stdin: {e}")));
            }
            Some(Err(_)) => {
                return Err(CapabilityError::failed("stdin writer panicked"));
            }
            // A program that exits without reading stdin closes the pipe
            // early; its exit status is what gets reported
            _ => {}
        }

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(CapabilityError::failed(format!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                stderr.trim()
            )));
        }

        let stdout = String::from_utf8(output.stdout)
            .map_err(|e| CapabilityError::MalformedResponse(format!("non UTF-8 output: {e}")))?;
        self.parse_output(&stdout)
    }
}
