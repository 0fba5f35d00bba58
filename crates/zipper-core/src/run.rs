//! Whole-run orchestration: discovery, then archival, then statistics.

use crate::ProgressCallback;
use crate::Result;
use crate::RunStats;
use crate::ZipConfig;
use crate::ZipperError;
use crate::archive::write_archive;
use crate::discovery::discover;
use chrono::Local;
use std::fmt;
use std::fs;
use std::path::PathBuf;
use std::time::Instant;
use tracing::info;

/// States of an archiving run.
///
/// ```text
/// Idle -> Discovering -> Archiving -> Reporting -> Done
///              |             |
///              +-> Failed <--+
/// ```
///
/// `Failed` is only reached on a fatal error; skipped files never cause it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RunPhase {
    /// Nothing started yet.
    Idle,
    /// Walking the source tree.
    Discovering,
    /// Writing entries into the archive.
    Archiving,
    /// Finalizing statistics.
    Reporting,
    /// Finished successfully.
    Done,
    /// Aborted on a fatal error.
    Failed,
}

impl fmt::Display for RunPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Discovering => "discovering",
            Self::Archiving => "archiving",
            Self::Reporting => "reporting",
            Self::Done => "done",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Outcome of a successful run.
#[derive(Debug, Clone)]
pub struct CompletedRun {
    /// Where the archive was written.
    pub archive_path: PathBuf,

    /// Display name of the source directory.
    pub source_name: String,

    /// Final statistics, including discovery warnings.
    pub stats: RunStats,
}

/// Archives `config.source` into a new ZIP file under `config.output_dir`.
///
/// Runs discovery to completion first so the archival stage knows the total
/// number of bytes, then writes the archive. Per-file problems end up in
/// `stats.warnings`; an empty source produces an empty archive.
///
/// # Errors
///
/// Returns an error if:
/// - The configuration is invalid
/// - The source root is missing, not a directory or unreadable
/// - The output directory or archive file cannot be created
/// - The archive cannot be written or finalized
///
/// # Examples
///
/// ```no_run
/// use zipper_core::NoopProgress;
/// use zipper_core::ZipConfig;
/// use zipper_core::create_archive;
///
/// let config = ZipConfig::new("./project", "./backups").with_timestamp(false);
/// let run = create_archive(&config, &mut NoopProgress)?;
/// println!(
///     "{} files -> {}",
///     run.stats.file_count,
///     run.archive_path.display()
/// );
/// # Ok::<(), zipper_core::ZipperError>(())
/// ```
pub fn create_archive(
    config: &ZipConfig,
    progress: &mut dyn ProgressCallback,
) -> Result<CompletedRun> {
    let start = Instant::now();
    progress.on_phase(RunPhase::Idle);

    let result = run_stages(config, progress, start);
    if let Err(err) = &result {
        info!(error = %err, "run failed");
        progress.on_phase(RunPhase::Failed);
    }
    result
}

fn run_stages(
    config: &ZipConfig,
    progress: &mut dyn ProgressCallback,
    start: Instant,
) -> Result<CompletedRun> {
    config.validate()?;

    enter(progress, RunPhase::Discovering);
    let found = discover(&config.source, &config.exclusions, progress)?;
    info!(
        files = found.len(),
        bytes = found.total_bytes,
        "discovery finished"
    );

    fs::create_dir_all(&config.output_dir).map_err(|source| ZipperError::OutputNotWritable {
        path: config.output_dir.clone(),
        source,
    })?;
    let archive_path = config.archive_path(Local::now());

    enter(progress, RunPhase::Archiving);
    let mut stats = write_archive(
        &archive_path,
        &found.entries,
        &config.archive_options(),
        progress,
    )?;

    enter(progress, RunPhase::Reporting);
    let mut warnings = found.warnings;
    warnings.append(&mut stats.warnings);
    stats.warnings = warnings;
    stats.elapsed = start.elapsed();

    enter(progress, RunPhase::Done);
    Ok(CompletedRun {
        archive_path,
        source_name: config.source_name(),
        stats,
    })
}

fn enter(progress: &mut dyn ProgressCallback, phase: RunPhase) {
    info!(%phase, "entering phase");
    progress.on_phase(phase);
}
