//! Source tree discovery.
//!
//! Enumerates every regular file under a source root that survives the
//! [`ExclusionSet`], in a deterministic order, and sums their sizes so the
//! archival stage has a progress denominator before it writes anything.

use crate::ExclusionSet;
use crate::ProgressCallback;
use crate::Result;
use crate::ZipperError;
use std::fs;
use std::path::Path;
use std::path::PathBuf;
use tracing::debug;
use tracing::warn;
use walkdir::DirEntry;
use walkdir::WalkDir;

/// A regular file selected for archiving.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    /// Path relative to the source root.
    pub relative_path: PathBuf,

    /// Full filesystem path.
    pub absolute_path: PathBuf,

    /// Size in bytes at discovery time.
    pub size: u64,
}

impl FileEntry {
    /// Returns the entry name to store in the archive.
    ///
    /// ZIP names use `/` separators on every platform. Returns `None` when the
    /// relative path is not valid UTF-8.
    ///
    /// # Examples
    ///
    /// ```
    /// use zipper_core::FileEntry;
    /// use std::path::PathBuf;
    ///
    /// let entry = FileEntry {
    ///     relative_path: PathBuf::from("src/main.rs"),
    ///     absolute_path: PathBuf::from("/work/project/src/main.rs"),
    ///     size: 42,
    /// };
    /// assert_eq!(entry.archive_name().as_deref(), Some("src/main.rs"));
    /// ```
    #[must_use]
    pub fn archive_name(&self) -> Option<String> {
        let parts: Option<Vec<&str>> = self
            .relative_path
            .components()
            .map(|c| c.as_os_str().to_str())
            .collect();
        parts.map(|parts| parts.join("/"))
    }
}

/// Result of walking a source tree.
#[derive(Debug, Clone, Default)]
pub struct Discovery {
    /// Files to archive, in traversal order.
    pub entries: Vec<FileEntry>,

    /// Sum of `size` over `entries`.
    pub total_bytes: u64,

    /// Entries skipped during traversal (symlinks, unreadable paths).
    pub warnings: Vec<String>,
}

impl Discovery {
    /// Number of files found.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no files were found.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Walks `root` and collects every file not matched by `exclusions`.
///
/// Excluded directories are pruned without being descended into. Symbolic
/// links and entries that cannot be read are skipped with a warning; only a
/// problem with `root` itself is an error.
///
/// # Errors
///
/// Returns an error if:
/// - `root` does not exist
/// - `root` is not a directory
/// - `root` cannot be listed
///
/// # Examples
///
/// ```no_run
/// use zipper_core::ExclusionSet;
/// use zipper_core::NoopProgress;
/// use zipper_core::discover;
/// use std::path::Path;
///
/// let found = discover(Path::new("./project"), &ExclusionSet::default(), &mut NoopProgress)?;
/// println!("{} files, {} bytes", found.len(), found.total_bytes);
/// # Ok::<(), zipper_core::ZipperError>(())
/// ```
pub fn discover(
    root: &Path,
    exclusions: &ExclusionSet,
    progress: &mut dyn ProgressCallback,
) -> Result<Discovery> {
    check_root(root)?;

    let mut found = Discovery::default();

    let walker = WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| entry.depth() == 0 || !is_excluded(entry, exclusions));

    for item in walker {
        let entry = match item {
            Ok(entry) => entry,
            Err(err) => {
                if err.depth() == 0 {
                    return Err(ZipperError::SourceUnreadable {
                        path: root.to_path_buf(),
                        source: err.into(),
                    });
                }
                let path = err
                    .path()
                    .map_or_else(|| root.display().to_string(), |p| p.display().to_string());
                skip(&mut found, format!("Skipped unreadable path: {path} ({err})"));
                continue;
            }
        };

        let file_type = entry.file_type();
        if file_type.is_dir() {
            continue;
        }
        if file_type.is_symlink() {
            skip(
                &mut found,
                format!("Skipped symlink: {}", entry.path().display()),
            );
            continue;
        }
        if !file_type.is_file() {
            skip(
                &mut found,
                format!("Skipped special file: {}", entry.path().display()),
            );
            continue;
        }

        let size = match entry.metadata() {
            Ok(metadata) => metadata.len(),
            Err(err) => {
                skip(
                    &mut found,
                    format!(
                        "Skipped file with unreadable metadata: {} ({err})",
                        entry.path().display()
                    ),
                );
                continue;
            }
        };

        let Ok(relative) = entry.path().strip_prefix(root) else {
            continue;
        };

        debug!(path = %relative.display(), size, "discovered file");
        found.entries.push(FileEntry {
            relative_path: relative.to_path_buf(),
            absolute_path: entry.path().to_path_buf(),
            size,
        });
        found.total_bytes = found.total_bytes.saturating_add(size);
        progress.on_file_discovered(relative, found.entries.len());
    }

    progress.on_discovery_complete(found.entries.len(), found.total_bytes);
    Ok(found)
}

/// Validates that the source root is a listable directory.
fn check_root(root: &Path) -> Result<()> {
    let metadata = match fs::metadata(root) {
        Ok(metadata) => metadata,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return Err(ZipperError::SourceNotFound {
                path: root.to_path_buf(),
            });
        }
        Err(source) => {
            return Err(ZipperError::SourceUnreadable {
                path: root.to_path_buf(),
                source,
            });
        }
    };

    if !metadata.is_dir() {
        return Err(ZipperError::SourceNotDirectory {
            path: root.to_path_buf(),
        });
    }

    fs::read_dir(root).map_err(|source| ZipperError::SourceUnreadable {
        path: root.to_path_buf(),
        source,
    })?;

    Ok(())
}

fn is_excluded(entry: &DirEntry, exclusions: &ExclusionSet) -> bool {
    entry
        .file_name()
        .to_str()
        .is_some_and(|name| exclusions.matches_name(name))
}

fn skip(found: &mut Discovery, message: String) {
    warn!("{message}");
    found.warnings.push(message);
}
