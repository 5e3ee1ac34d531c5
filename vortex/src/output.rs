//! Output formatting for the run report.
//!
//! Text or JSON on stdout; errors on stderr in the same format.

use anyhow::Result;
use serde::Serialize;
use std::io::{self, Write};
use vortex_core::RunReport;

/// Output format selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Writer for command output with format abstraction.
pub struct OutputWriter {
    format: OutputFormat,
    stdout: io::Stdout,
}

impl OutputWriter {
    /// Create a new OutputWriter.
    pub fn new(json: bool) -> Self {
        Self {
            format: if json {
                OutputFormat::Json
            } else {
                OutputFormat::Text
            },
            stdout: io::stdout(),
        }
    }

    /// Write output using the configured format.
    ///
    /// `text_fn` is only called in text mode.
    pub fn write<T: Serialize>(&self, data: &T, text_fn: impl FnOnce() -> String) -> Result<()> {
        match self.format {
            OutputFormat::Json => {
                let json = serde_json::to_string_pretty(data)?;
                writeln!(&self.stdout, "{}", json)?;
            }
            OutputFormat::Text => {
                let text = text_fn();
                if !text.is_empty() {
                    write!(&self.stdout, "{}", text)?;
                }
            }
        }
        Ok(())
    }

    /// Write an error message to stderr.
    pub fn write_error(&self, error: &anyhow::Error, result_code: u8) {
        match self.format {
            OutputFormat::Json => {
                let error_output = ErrorOutput {
                    success: false,
                    result_code,
                    error: format!("{:#}", error),
                };
                if let Ok(json) = serde_json::to_string_pretty(&error_output) {
                    let _ = writeln!(io::stderr(), "{}", json);
                }
            }
            OutputFormat::Text => {
                let _ = writeln!(io::stderr(), "Error: {:#}", error);
            }
        }
    }
}

/// Error output structure.
#[derive(Debug, Serialize)]
pub struct ErrorOutput {
    pub success: bool,
    pub result_code: u8,
    pub error: String,
}

/// Output for a completed run.
#[derive(Debug, Serialize)]
pub struct RunOutput {
    pub success: bool,
    pub result_code: u8,
    pub ingest: String,
    pub destination: String,
    pub algorithm: String,
    pub started_at: String,
    pub elapsed_ms: u64,
    #[serde(flatten)]
    pub report: RunReport,
}

impl RunOutput {
    /// Human-readable summary.
    pub fn to_text(&self) -> String {
        let r = &self.report;
        let mut text = format!(
            "Sorted {} into {} ({})\n",
            self.ingest, self.destination, self.algorithm
        );
        text.push_str(&format!("Indexed:            {}\n", r.indexed));
        text.push_str(&format!("Placed:             {}\n", r.placed));
        text.push_str(&format!("Duplicates deleted: {}\n", r.duplicates_deleted));
        text.push_str(&format!("Sentinels deleted:  {}\n", r.sentinels_deleted));
        text.push_str(&format!("Unknown skipped:    {}\n", r.unknown_skipped));
        if r.other_skipped > 0 {
            text.push_str(&format!("Links skipped:      {}\n", r.other_skipped));
        }
        text.push_str(&format!("Dirs pruned:        {}\n", r.directories_pruned));
        if r.hash_failures + r.errors > 0 {
            text.push_str(&format!(
                "Errors:             {} ({} unhashable)\n",
                r.hash_failures + r.errors,
                r.hash_failures
            ));
        }
        text
    }
}
