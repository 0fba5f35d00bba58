//! Archive command implementation.

use crate::cli::Cli;
use crate::error::add_run_context;
use crate::output::OutputFormatter;
use crate::progress::CliProgress;
use anyhow::Result;
use tracing::debug;
use zipper_core::NoopProgress;
use zipper_core::create_archive;

pub fn execute(cli: &Cli, formatter: &dyn OutputFormatter) -> Result<()> {
    let config = cli.to_config();
    debug!(?config, "resolved configuration");

    // Live display only on a terminal, and never in quiet or JSON mode
    let run = if cli.wants_progress() && CliProgress::should_show() {
        let mut progress = CliProgress::new();
        add_run_context(create_archive(&config, &mut progress), &config.source)?
    } else {
        let mut noop = NoopProgress;
        add_run_context(create_archive(&config, &mut noop), &config.source)?
    };

    if run.stats.file_count == 0 {
        formatter.format_warning("No files found to archive; wrote an empty archive");
    }

    formatter.format_run_result(&run)?;

    Ok(())
}
