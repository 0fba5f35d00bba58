//! Human-readable output formatter with colors and styling.

use super::formatter::OutputFormatter;
use anyhow::Result;
use console::Term;
use console::style;
use zipper_core::CompletedRun;

/// Warnings listed before the rest are summarized, unless verbose.
const MAX_LISTED_WARNINGS: usize = 10;

pub struct HumanFormatter {
    verbose: bool,
    quiet: bool,
    use_colors: bool,
    term: Term,
    err_term: Term,
}

impl HumanFormatter {
    pub fn new(verbose: bool, quiet: bool) -> Self {
        Self {
            verbose,
            quiet,
            use_colors: console::colors_enabled(),
            term: Term::stdout(),
            err_term: Term::stderr(),
        }
    }

    fn format_size(bytes: u64) -> String {
        const KB: u64 = 1024;
        const MB: u64 = KB * 1024;
        const GB: u64 = MB * 1024;

        if bytes >= GB {
            format!("{:.1} GB", bytes as f64 / GB as f64)
        } else if bytes >= MB {
            format!("{:.1} MB", bytes as f64 / MB as f64)
        } else if bytes >= KB {
            format!("{:.1} KB", bytes as f64 / KB as f64)
        } else {
            format!("{bytes} B")
        }
    }

    fn format_number(n: usize) -> String {
        let s = n.to_string();
        let mut result = String::new();
        let mut count = 0;

        for c in s.chars().rev() {
            if count == 3 {
                result.push(',');
                count = 0;
            }
            result.push(c);
            count += 1;
        }

        result.chars().rev().collect()
    }

    /// Label/value rows of the statistics table.
    fn stats_rows(run: &CompletedRun) -> Vec<(&'static str, String)> {
        let stats = &run.stats;
        let mut rows = vec![
            ("Source Directory", run.source_name.clone()),
            ("Total Files", Self::format_number(stats.file_count)),
            ("Original Size", Self::format_size(stats.total_original_bytes)),
            (
                "Compressed Size",
                Self::format_size(stats.total_compressed_bytes),
            ),
            (
                "Compression Ratio",
                format!("{:.2}:1", stats.compression_ratio()),
            ),
            (
                "Space Saved",
                format!("{:.1}%", stats.space_saved_percentage()),
            ),
            (
                "Processing Time",
                format!("{:.2}s", stats.elapsed_seconds()),
            ),
        ];

        if stats.files_skipped > 0 {
            rows.push(("Skipped Files", Self::format_number(stats.files_skipped)));
        }

        rows
    }

    /// Right-aligns labels and values into two columns.
    fn align_rows(rows: &[(&str, String)]) -> Vec<(String, String)> {
        let label_width = rows.iter().map(|(l, _)| l.len()).max().unwrap_or(0);
        let value_width = rows
            .iter()
            .map(|(_, v)| v.chars().count())
            .max()
            .unwrap_or(0);

        rows.iter()
            .map(|(label, value)| {
                (
                    format!("{label:>label_width$}:"),
                    format!("{value:>value_width$}"),
                )
            })
            .collect()
    }

    fn write_heading(&self, text: &str) {
        if self.use_colors {
            let _ = self
                .term
                .write_line(&format!("{}", style(text).cyan().bold()));
        } else {
            let _ = self.term.write_line(text);
        }
    }

    fn write_warnings(&self, warnings: &[String]) {
        let _ = self.term.write_line("");
        if self.use_colors {
            let _ = self
                .term
                .write_line(&format!("{}", style("Warnings:").yellow().bold()));
        } else {
            let _ = self.term.write_line("Warnings:");
        }

        let shown = if self.verbose {
            warnings.len()
        } else {
            warnings.len().min(MAX_LISTED_WARNINGS)
        };
        for warning in &warnings[..shown] {
            let _ = self.term.write_line(&format!("  - {warning}"));
        }
        if shown < warnings.len() {
            let _ = self.term.write_line(&format!(
                "  ... and {} more (use -v to list all)",
                warnings.len() - shown
            ));
        }
    }
}

impl OutputFormatter for HumanFormatter {
    fn format_run_result(&self, run: &CompletedRun) -> Result<()> {
        if self.quiet {
            return Ok(());
        }

        if self.use_colors {
            let _ = self.term.write_line(&format!(
                "{} Archive created: {}",
                style("✓").green().bold(),
                style(run.archive_path.display()).bold()
            ));
        } else {
            let _ = self.term.write_line(&format!(
                "Archive created: {}",
                run.archive_path.display()
            ));
        }

        let rows = Self::align_rows(&Self::stats_rows(run));
        let width = rows
            .iter()
            .map(|(l, v)| l.chars().count() + v.chars().count() + 4)
            .max()
            .unwrap_or(0);
        let rule = "─".repeat(width);

        let _ = self.term.write_line("");
        self.write_heading("Compression Statistics");
        let _ = self.term.write_line(&rule);
        for (label, value) in &rows {
            if self.use_colors {
                let _ = self
                    .term
                    .write_line(&format!("  {label}  {}", style(value).green()));
            } else {
                let _ = self.term.write_line(&format!("  {label}  {value}"));
            }
        }
        let _ = self.term.write_line(&rule);

        if run.stats.has_warnings() {
            self.write_warnings(&run.stats.warnings);
        }

        Ok(())
    }

    fn format_error(&self, error: &anyhow::Error) {
        // Always show errors, even in quiet mode
        if self.use_colors {
            let _ = self
                .err_term
                .write_line(&format!("{} {error:?}", style("ERROR:").red().bold()));
        } else {
            let _ = self.err_term.write_line(&format!("ERROR: {error:?}"));
        }
    }

    fn format_warning(&self, message: &str) {
        if self.quiet {
            return;
        }

        if self.use_colors {
            let _ = self
                .term
                .write_line(&format!("{} {message}", style("⚠").yellow().bold()));
        } else {
            let _ = self.term.write_line(&format!("WARNING: {message}"));
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::time::Duration;
    use zipper_core::RunStats;

    fn sample_run() -> CompletedRun {
        let mut stats = RunStats::new();
        stats.file_count = 1234;
        stats.total_original_bytes = 4 * 1024 * 1024;
        stats.total_compressed_bytes = 1024 * 1024;
        stats.elapsed = Duration::from_millis(1500);
        CompletedRun {
            archive_path: PathBuf::from("/out/project_20240309_140507.zip"),
            source_name: "project".to_string(),
            stats,
        }
    }

    #[test]
    fn test_format_size_bytes() {
        assert_eq!(HumanFormatter::format_size(0), "0 B");
        assert_eq!(HumanFormatter::format_size(512), "512 B");
        assert_eq!(HumanFormatter::format_size(1023), "1023 B");
    }

    #[test]
    fn test_format_size_units() {
        assert_eq!(HumanFormatter::format_size(1536), "1.5 KB");
        assert_eq!(HumanFormatter::format_size(1536 * 1024), "1.5 MB");
        assert_eq!(HumanFormatter::format_size(2 * 1024 * 1024 * 1024), "2.0 GB");
    }

    #[test]
    fn test_format_number() {
        assert_eq!(HumanFormatter::format_number(0), "0");
        assert_eq!(HumanFormatter::format_number(999), "999");
        assert_eq!(HumanFormatter::format_number(1234), "1,234");
        assert_eq!(HumanFormatter::format_number(1_234_567), "1,234,567");
    }

    #[test]
    fn test_stats_rows() {
        let rows = HumanFormatter::stats_rows(&sample_run());
        let lookup = |key: &str| {
            rows.iter()
                .find(|(label, _)| *label == key)
                .map(|(_, v)| v.clone())
                .unwrap()
        };

        assert_eq!(lookup("Source Directory"), "project");
        assert_eq!(lookup("Total Files"), "1,234");
        assert_eq!(lookup("Original Size"), "4.0 MB");
        assert_eq!(lookup("Compressed Size"), "1.0 MB");
        assert_eq!(lookup("Compression Ratio"), "4.00:1");
        assert_eq!(lookup("Space Saved"), "75.0%");
        assert_eq!(lookup("Processing Time"), "1.50s");
        assert!(!rows.iter().any(|(label, _)| *label == "Skipped Files"));
    }

    #[test]
    fn test_stats_rows_include_skipped() {
        let mut run = sample_run();
        run.stats.files_skipped = 2;
        let rows = HumanFormatter::stats_rows(&run);
        assert!(rows.iter().any(|(label, v)| *label == "Skipped Files" && v == "2"));
    }

    #[test]
    fn test_align_rows() {
        let rows = vec![("A", "1".to_string()), ("Longer", "100".to_string())];
        let aligned = HumanFormatter::align_rows(&rows);
        assert_eq!(aligned[0], ("     A:".to_string(), "  1".to_string()));
        assert_eq!(aligned[1], ("Longer:".to_string(), "100".to_string()));
    }
}
