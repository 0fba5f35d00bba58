//! JSON output formatter for machine-readable results.

use super::formatter::JsonOutput;
use super::formatter::OutputFormatter;
use anyhow::Result;
use serde::Serialize;
use std::io::Write;
use std::io::{self};
use zipper_core::CompletedRun;

pub struct JsonFormatter;

#[derive(Debug, Serialize)]
struct RunOutput {
    archive_path: String,
    source: String,
    file_count: usize,
    total_original_bytes: u64,
    total_compressed_bytes: u64,
    compression_ratio: f64,
    space_saved_percentage: f64,
    elapsed_ms: u128,
    files_skipped: usize,
    warnings: Vec<String>,
}

impl From<&CompletedRun> for RunOutput {
    fn from(run: &CompletedRun) -> Self {
        let stats = &run.stats;
        Self {
            archive_path: run.archive_path.display().to_string(),
            source: run.source_name.clone(),
            file_count: stats.file_count,
            total_original_bytes: stats.total_original_bytes,
            total_compressed_bytes: stats.total_compressed_bytes,
            compression_ratio: stats.compression_ratio(),
            space_saved_percentage: stats.space_saved_percentage(),
            elapsed_ms: stats.elapsed.as_millis(),
            files_skipped: stats.files_skipped,
            warnings: stats.warnings.clone(),
        }
    }
}

impl JsonFormatter {
    fn output<T: Serialize>(value: &T) -> Result<()> {
        let json = serde_json::to_string_pretty(value)?;
        writeln!(io::stdout(), "{json}")?;
        Ok(())
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_run_result(&self, run: &CompletedRun) -> Result<()> {
        let output = JsonOutput::success("create", RunOutput::from(run));
        Self::output(&output)
    }

    fn format_error(&self, error: &anyhow::Error) {
        let output = JsonOutput::error("create", format!("{error:#}"));
        let _ = Self::output(&output);
    }

    fn format_warning(&self, _message: &str) {
        // Warnings travel inside the result payload.
    }
}
