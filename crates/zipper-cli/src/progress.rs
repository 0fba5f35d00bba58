//! Live progress display for a run.

use console::Term;
use indicatif::ProgressBar;
use indicatif::ProgressStyle;
use std::path::Path;
use zipper_core::ProgressCallback;
use zipper_core::RunPhase;

/// Braille spinner frames; the last one is shown when the spinner finishes.
const SPINNER_FRAMES: &str = "⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏✓";

/// Spinner during discovery, byte-scaled bar during archival.
///
/// Implements `ProgressCallback`, so the core library drives it between I/O
/// steps. The display is cleared on drop, which covers early returns on
/// fatal errors.
pub struct CliProgress {
    bar: ProgressBar,
    bytes_written: u64,
    entry_bytes: u64,
}

impl CliProgress {
    /// Creates the discovery spinner.
    #[must_use]
    pub fn new() -> Self {
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_chars(SPINNER_FRAMES),
        );
        bar.set_message("Discovering files...");

        Self {
            bar,
            bytes_written: 0,
            entry_bytes: 0,
        }
    }

    /// Checks if we should show progress (TTY detection).
    #[must_use]
    pub fn should_show() -> bool {
        Term::stdout().is_term()
    }

    /// Switches from the spinner to a bar scaled to `total_bytes`.
    fn start_bar(&self, total_bytes: u64) {
        self.bar.set_length(total_bytes);
        self.bar.set_position(0);
        self.bar.set_style(
            ProgressStyle::with_template(
                "{spinner:.cyan} [{bar:40.green/blue}] {percent:>3}% {bytes}/{total_bytes} {wide_msg}",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .tick_chars(SPINNER_FRAMES)
            .progress_chars("━▶─"),
        );
    }
}

impl Default for CliProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for CliProgress {
    fn drop(&mut self) {
        self.bar.finish_and_clear();
    }
}

impl ProgressCallback for CliProgress {
    fn on_phase(&mut self, phase: RunPhase) {
        if phase == RunPhase::Failed {
            self.bar.finish_and_clear();
        }
    }

    fn on_file_discovered(&mut self, _path: &Path, count: usize) {
        self.bar.set_message(format!("Found {count} files"));
        self.bar.tick();
    }

    fn on_discovery_complete(&mut self, _files: usize, total_bytes: u64) {
        self.start_bar(total_bytes);
    }

    fn on_entry_start(&mut self, path: &Path, _total: usize, _current: usize) {
        self.entry_bytes = 0;
        self.bar
            .set_message(format!("Compressing: {}", path.display()));
    }

    fn on_bytes_written(&mut self, bytes: u64) {
        self.entry_bytes += bytes;
        self.bytes_written += bytes;
        self.bar.set_position(self.bytes_written);
    }

    fn on_entry_complete(&mut self, _path: &Path) {
        self.entry_bytes = 0;
    }

    // Bytes of a skipped entry were rolled back out of the archive.
    fn on_entry_skipped(&mut self, _path: &Path, _reason: &str) {
        self.bytes_written = self.bytes_written.saturating_sub(self.entry_bytes);
        self.entry_bytes = 0;
        self.bar.set_position(self.bytes_written);
    }

    fn on_complete(&mut self) {
        self.bar.finish_and_clear();
    }
}
