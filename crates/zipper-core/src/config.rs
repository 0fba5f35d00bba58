//! Configuration for an archiving run.

use crate::ArchiveOptions;
use crate::ExclusionSet;
use crate::Result;
use crate::ZipperError;
use chrono::DateTime;
use chrono::TimeZone;
use std::path::Path;
use std::path::PathBuf;

/// Format of the suffix appended to timestamped archive names.
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Base name used when neither a custom name nor a source directory name is
/// available (e.g. archiving `/`).
const FALLBACK_BASE_NAME: &str = "archive";

/// Configuration for one archiving run.
///
/// # Examples
///
/// ```
/// use zipper_core::ExclusionSet;
/// use zipper_core::ZipConfig;
///
/// let config = ZipConfig::new("./project", "./backups")
///     .with_name(Some("nightly".to_string()))
///     .with_exclusions(ExclusionSet::new(["target"]))
///     .with_compression_level(9)
///     .with_timestamp(false);
///
/// assert_eq!(config.archive_file_name(chrono::Local::now()), "nightly.zip");
/// ```
#[derive(Debug, Clone)]
pub struct ZipConfig {
    /// Directory tree to archive.
    pub source: PathBuf,

    /// Directory the archive is written into. Created if missing.
    pub output_dir: PathBuf,

    /// Custom archive base name. Defaults to the source directory name.
    pub name: Option<String>,

    /// Names skipped during discovery.
    ///
    /// Default: [`DEFAULT_EXCLUSIONS`](crate::DEFAULT_EXCLUSIONS).
    pub exclusions: ExclusionSet,

    /// Compression level: 0 = store, 1 (fastest) to 9 (smallest).
    ///
    /// Default: `6`.
    pub compression_level: u8,

    /// Append a `_YYYYmmdd_HHMMSS` suffix to the archive name.
    ///
    /// Default: `true`.
    pub timestamp: bool,

    /// Record Unix permission bits for each entry.
    ///
    /// Default: `true`.
    pub preserve_permissions: bool,
}

impl ZipConfig {
    /// Creates a configuration with default settings.
    pub fn new(source: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            output_dir: output_dir.into(),
            name: None,
            exclusions: ExclusionSet::default(),
            compression_level: 6,
            timestamp: true,
            preserve_permissions: true,
        }
    }

    /// Sets the custom archive base name.
    #[must_use]
    pub fn with_name(mut self, name: Option<String>) -> Self {
        self.name = name;
        self
    }

    /// Sets the exclusion set.
    #[must_use]
    pub fn with_exclusions(mut self, exclusions: ExclusionSet) -> Self {
        self.exclusions = exclusions;
        self
    }

    /// Sets the compression level. Checked by [`validate`](Self::validate).
    #[must_use]
    pub fn with_compression_level(mut self, level: u8) -> Self {
        self.compression_level = level;
        self
    }

    /// Sets whether the archive name gets a timestamp suffix.
    #[must_use]
    pub fn with_timestamp(mut self, timestamp: bool) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Sets whether Unix permissions are recorded.
    #[must_use]
    pub fn with_preserve_permissions(mut self, preserve: bool) -> Self {
        self.preserve_permissions = preserve;
        self
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the compression level is above 9.
    pub fn validate(&self) -> Result<()> {
        if self.compression_level > 9 {
            return Err(ZipperError::InvalidCompressionLevel {
                level: self.compression_level,
            });
        }
        Ok(())
    }

    /// Options passed to the archival stage.
    #[must_use]
    pub fn archive_options(&self) -> ArchiveOptions {
        ArchiveOptions {
            compression_level: self.compression_level,
            preserve_permissions: self.preserve_permissions,
        }
    }

    /// Name of the source directory as shown in reports.
    ///
    /// Resolves `.` and other relative paths so that `zipper -s .` reports
    /// the actual directory name.
    #[must_use]
    pub fn source_name(&self) -> String {
        dir_name(&self.source).unwrap_or_else(|| self.source.display().to_string())
    }

    /// Computes the archive file name for a run started at `now`.
    ///
    /// A custom name that already ends in `.zip` is not given a second
    /// extension.
    #[must_use]
    pub fn archive_file_name<Tz>(&self, now: DateTime<Tz>) -> String
    where
        Tz: TimeZone,
        Tz::Offset: std::fmt::Display,
    {
        let base = self
            .name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(|n| n.strip_suffix(".zip").unwrap_or(n).to_string())
            .or_else(|| dir_name(&self.source))
            .unwrap_or_else(|| FALLBACK_BASE_NAME.to_string());

        if self.timestamp {
            format!("{base}_{}.zip", now.format(TIMESTAMP_FORMAT))
        } else {
            format!("{base}.zip")
        }
    }

    /// Full path of the archive for a run started at `now`.
    #[must_use]
    pub fn archive_path<Tz>(&self, now: DateTime<Tz>) -> PathBuf
    where
        Tz: TimeZone,
        Tz::Offset: std::fmt::Display,
    {
        self.output_dir.join(self.archive_file_name(now))
    }
}

/// Final component of `path`, resolving relative paths like `.` first.
fn dir_name(path: &Path) -> Option<String> {
    let named = |p: &Path| {
        p.file_name()
            .and_then(|n| n.to_str())
            .map(str::to_string)
    };
    named(path).or_else(|| path.canonicalize().ok().as_deref().and_then(named))
}
