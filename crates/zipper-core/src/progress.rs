//! Progress reporting hooks.
//!
//! The library never writes to the console. Callers that want a spinner or a
//! progress bar implement [`ProgressCallback`] and pass it into
//! [`create_archive`](crate::create_archive) or the individual stages.
//! Callbacks are invoked synchronously between I/O steps on the calling
//! thread and take no part in control flow.

use crate::run::RunPhase;
use std::path::Path;

/// Receives progress events from discovery and archival.
///
/// Every method has an empty default body, so implementors override only the
/// events they render.
///
/// # Examples
///
/// ```
/// use zipper_core::ProgressCallback;
/// use std::path::Path;
///
/// #[derive(Default)]
/// struct Counter {
///     archived: usize,
/// }
///
/// impl ProgressCallback for Counter {
///     fn on_entry_complete(&mut self, _path: &Path) {
///         self.archived += 1;
///     }
/// }
/// ```
pub trait ProgressCallback {
    /// Called on every run state transition.
    fn on_phase(&mut self, _phase: RunPhase) {}

    /// Called after each file accepted by discovery.
    ///
    /// * `path` - Path of the file relative to the source root
    /// * `count` - Number of files found so far (1-indexed)
    fn on_file_discovered(&mut self, _path: &Path, _count: usize) {}

    /// Called once discovery has enumerated the whole tree.
    fn on_discovery_complete(&mut self, _files: usize, _total_bytes: u64) {}

    /// Called before an entry is written.
    ///
    /// * `path` - Path of the entry relative to the source root
    /// * `total` - Total number of entries to archive
    /// * `current` - Current entry number (1-indexed)
    fn on_entry_start(&mut self, _path: &Path, _total: usize, _current: usize) {}

    /// Called for each chunk of uncompressed data fed into the archive.
    fn on_bytes_written(&mut self, _bytes: u64) {}

    /// Called after an entry has been written completely.
    fn on_entry_complete(&mut self, _path: &Path) {}

    /// Called when an entry is left out because of a per-file error.
    fn on_entry_skipped(&mut self, _path: &Path, _reason: &str) {}

    /// Called once after the archive has been finalized.
    fn on_complete(&mut self) {}
}

/// Progress callback that ignores every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopProgress;

impl ProgressCallback for NoopProgress {}
