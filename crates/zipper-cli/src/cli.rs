//! CLI argument parsing using clap.

use clap::ArgAction;
use clap::Parser;
use std::path::PathBuf;
use zipper_core::ExclusionSet;
use zipper_core::ZipConfig;

#[derive(Parser, Debug)]
#[command(name = "zipper")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Directory to compress
    #[arg(short, long, value_name = "DIR")]
    pub source: PathBuf,

    /// Directory to write the archive into (created if missing)
    #[arg(short, long, value_name = "DIR")]
    pub output: PathBuf,

    /// Custom base name for the archive (default: source directory name)
    #[arg(short, long)]
    pub name: Option<String>,

    /// Extra names to exclude (repeatable or comma-separated; `*.ext` and
    /// `prefix*` wildcards allowed)
    #[arg(
        short = 'x',
        long = "exclude",
        value_name = "PATTERN",
        value_delimiter = ','
    )]
    pub exclude: Vec<String>,

    /// Do not apply the built-in exclusion list (.git, node_modules, ...)
    #[arg(long)]
    pub no_default_excludes: bool,

    /// Leave the timestamp out of the archive file name
    #[arg(long)]
    pub no_timestamp: bool,

    /// Compression level (0 = store, 9 = smallest)
    #[arg(
        short = 'l',
        long,
        default_value = "6",
        value_parser = clap::value_parser!(u8).range(0..=9)
    )]
    pub compression_level: u8,

    /// Disable the spinner and progress bar
    #[arg(long)]
    pub no_progress: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Output results in JSON format
    #[arg(short, long)]
    pub json: bool,
}

impl Cli {
    /// Builds the run configuration from the parsed flags.
    pub fn to_config(&self) -> ZipConfig {
        let exclusions = if self.no_default_excludes {
            ExclusionSet::only(&self.exclude)
        } else {
            ExclusionSet::new(&self.exclude)
        };

        ZipConfig::new(&self.source, &self.output)
            .with_name(self.name.clone())
            .with_exclusions(exclusions)
            .with_compression_level(self.compression_level)
            .with_timestamp(!self.no_timestamp)
    }

    /// Whether the live spinner/progress bar may be drawn.
    pub const fn wants_progress(&self) -> bool {
        !(self.quiet || self.json || self.no_progress)
    }
}
