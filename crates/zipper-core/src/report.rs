//! Run statistics.

use std::time::Duration;

/// Aggregate metrics for one archiving run.
///
/// Counters only grow while entries are written; the compressed size and
/// elapsed time are filled in once the archive is finalized.
///
/// # Examples
///
/// ```
/// use zipper_core::RunStats;
///
/// let mut stats = RunStats::default();
/// stats.file_count = 10;
/// stats.total_original_bytes = 1000;
/// stats.total_compressed_bytes = 250;
///
/// assert_eq!(stats.compression_ratio(), 4.0);
/// assert_eq!(stats.space_saved_percentage(), 75.0);
/// ```
#[derive(Debug, Clone, Default)]
pub struct RunStats {
    /// Number of files written to the archive.
    pub file_count: usize,

    /// Sum of the uncompressed sizes of archived files.
    pub total_original_bytes: u64,

    /// Size of the finished archive on disk.
    pub total_compressed_bytes: u64,

    /// Wall-clock duration of the run.
    pub elapsed: Duration,

    /// Number of files left out because of per-file errors.
    pub files_skipped: usize,

    /// Human-readable descriptions of everything that was skipped or
    /// looked suspicious.
    pub warnings: Vec<String>,
}

impl RunStats {
    /// Creates empty statistics.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a warning message.
    pub fn add_warning(&mut self, msg: impl Into<String>) {
        self.warnings.push(msg.into());
    }

    /// Returns whether any warnings were recorded.
    #[must_use]
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Returns `original / compressed`.
    ///
    /// Returns 0.0 if either size is 0.
    #[must_use]
    pub fn compression_ratio(&self) -> f64 {
        if self.total_compressed_bytes == 0 || self.total_original_bytes == 0 {
            return 0.0;
        }
        self.total_original_bytes as f64 / self.total_compressed_bytes as f64
    }

    /// Returns the share of the original size saved by compression, in
    /// percent.
    ///
    /// Returns 0.0 if nothing was archived. Goes negative when the archive
    /// is larger than its contents, which happens for tiny or already
    /// compressed inputs because of per-entry headers.
    ///
    /// # Examples
    ///
    /// ```
    /// use zipper_core::RunStats;
    ///
    /// let mut stats = RunStats::new();
    /// assert_eq!(stats.space_saved_percentage(), 0.0);
    ///
    /// stats.total_original_bytes = 100;
    /// stats.total_compressed_bytes = 150;
    /// assert_eq!(stats.space_saved_percentage(), -50.0);
    /// ```
    #[must_use]
    pub fn space_saved_percentage(&self) -> f64 {
        if self.total_original_bytes == 0 {
            return 0.0;
        }
        (1.0 - self.total_compressed_bytes as f64 / self.total_original_bytes as f64) * 100.0
    }

    /// Elapsed time in fractional seconds.
    #[must_use]
    pub fn elapsed_seconds(&self) -> f64 {
        self.elapsed.as_secs_f64()
    }
}
