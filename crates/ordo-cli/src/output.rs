//! Shared output layer for text/JSON parity across all CLI commands.
//!
//! Every command handler receives an [`OutputMode`] and formats its output
//! accordingly: compact text for people and pipes, or stable JSON.
//! Diagnostics and logs always go to stderr so stdout stays parseable.

use std::io::{self, Write};

use clap::ValueEnum;
use ordo_core::{ErrorCode, GraphError};
use serde::Serialize;

/// The output modes supported by the CLI.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputMode {
    /// Plain text, one fact per line.
    #[default]
    Text,
    /// Machine-readable JSON (one pretty-printed document per command).
    Json,
}

impl OutputMode {
    /// Returns `true` if JSON output was requested.
    pub const fn is_json(self) -> bool {
        matches!(self, Self::Json)
    }
}

/// Render a serializable value to stdout in the requested format.
///
/// In JSON mode the value is serialized with `serde_json`; in text mode the
/// provided `text_fn` closure writes the output.
pub fn render<T: Serialize>(
    mode: OutputMode,
    value: &T,
    text_fn: impl FnOnce(&T, &mut dyn Write) -> io::Result<()>,
) -> anyhow::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    match mode {
        OutputMode::Json => {
            serde_json::to_writer_pretty(&mut out, value)?;
            writeln!(out)?;
        }
        OutputMode::Text => text_fn(value, &mut out)?,
    }
    Ok(())
}

/// Write a section heading in text output.
pub fn section(w: &mut dyn Write, heading: &str) -> io::Result<()> {
    writeln!(w, "{heading}:")
}

/// A structured error with optional suggestion and error code.
#[derive(Debug, Serialize)]
pub struct CliError {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
    /// Machine-readable error code (e.g. "E1002").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
}

impl CliError {
    /// Build from an error chain.
    ///
    /// A [`GraphError`] anywhere in the chain supplies the code and hint.
    /// Otherwise, a TOML or JSON syntax error in the chain is reported
    /// under `parse_code`.
    pub fn from_anyhow(err: &anyhow::Error, parse_code: ErrorCode) -> Self {
        let message = format!("{err:#}");
        let graph_code = err
            .chain()
            .find_map(|cause| cause.downcast_ref::<GraphError>())
            .map(GraphError::code);
        let code = graph_code.or_else(|| {
            err.chain()
                .any(|cause| cause.is::<toml::de::Error>() || cause.is::<serde_json::Error>())
                .then_some(parse_code)
        });

        Self {
            message,
            suggestion: code.and_then(ErrorCode::hint).map(str::to_string),
            error_code: code.map(|c| c.code().to_string()),
        }
    }
}

/// Render an error to stderr in the requested format.
pub fn render_error(mode: OutputMode, error: &CliError) -> anyhow::Result<()> {
    let stderr = io::stderr();
    let mut out = stderr.lock();
    match mode {
        OutputMode::Json => {
            let wrapper = serde_json::json!({
                "error": error,
            });
            serde_json::to_writer_pretty(&mut out, &wrapper)?;
            writeln!(out)?;
        }
        OutputMode::Text => {
            match &error.error_code {
                Some(code) => writeln!(out, "error[{code}]: {}", error.message)?,
                None => writeln!(out, "error: {}", error.message)?,
            }
            if let Some(suggestion) = &error.suggestion {
                writeln!(out, "  suggestion: {suggestion}")?;
            }
        }
    }
    Ok(())
}
