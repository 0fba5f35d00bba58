//! ZIP archive writing.
//!
//! Takes the entries produced by discovery and writes one compressed entry per
//! file. Failures confined to a single file (it vanished, cannot be read, has
//! an unrepresentable name) skip that entry and keep going; only failures of
//! the archive itself abort the run.

use crate::FileEntry;
use crate::ProgressCallback;
use crate::Result;
use crate::RunStats;
use crate::ZipperError;
use chrono::Datelike;
use chrono::Local;
use chrono::Timelike;
use std::collections::HashSet;
use std::fs;
use std::fs::File;
use std::io;
use std::io::Read;
use std::io::Seek;
use std::io::Write;
use std::path::Path;
use std::time::Instant;
use std::time::SystemTime;
use tracing::debug;
use tracing::warn;
use zip::CompressionMethod;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

/// Longest entry name the ZIP format can store (16-bit length field).
pub const MAX_ENTRY_NAME_LEN: usize = u16::MAX as usize;

/// Entries at least this large need ZIP64 extensions.
const ZIP64_THRESHOLD: u64 = u32::MAX as u64;

/// Size of the reusable copy buffer.
const COPY_BUFFER_SIZE: usize = 64 * 1024;

/// Options controlling how entries are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArchiveOptions {
    /// Compression level: 0 stores entries uncompressed, 1-9 use Deflate.
    pub compression_level: u8,

    /// Record Unix permission bits for each entry.
    pub preserve_permissions: bool,
}

impl Default for ArchiveOptions {
    fn default() -> Self {
        Self {
            compression_level: 6,
            preserve_permissions: true,
        }
    }
}

impl ArchiveOptions {
    fn base_file_options(&self) -> SimpleFileOptions {
        if self.compression_level == 0 {
            SimpleFileOptions::default().compression_method(CompressionMethod::Stored)
        } else {
            SimpleFileOptions::default()
                .compression_method(CompressionMethod::Deflated)
                .compression_level(Some(i64::from(self.compression_level)))
        }
    }
}

/// A file opened for archiving, with the metadata stored alongside it.
#[derive(Debug)]
pub struct OpenedEntry<R> {
    /// Source of the entry's bytes.
    pub reader: R,

    /// Last modification time, if known.
    pub modified: Option<SystemTime>,

    /// Unix permission bits, if known.
    pub unix_mode: Option<u32>,
}

impl<R> OpenedEntry<R> {
    /// Wraps a reader with no extra metadata.
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            modified: None,
            unix_mode: None,
        }
    }
}

/// Opens the bytes behind a [`FileEntry`].
///
/// This is the read-side boundary of archival; [`FsOpener`] reads from disk.
pub trait EntryOpener {
    /// Reader type produced for each entry.
    type Reader: Read;

    /// Opens `entry` for reading.
    ///
    /// # Errors
    ///
    /// Returns an error if the entry cannot be opened. The caller skips the
    /// entry and continues.
    fn open(&mut self, entry: &FileEntry) -> io::Result<OpenedEntry<Self::Reader>>;
}

/// Opens entries from the filesystem via their absolute path.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsOpener;

impl EntryOpener for FsOpener {
    type Reader = File;

    fn open(&mut self, entry: &FileEntry) -> io::Result<OpenedEntry<File>> {
        let file = File::open(&entry.absolute_path)?;
        let metadata = file.metadata()?;

        #[cfg(unix)]
        let unix_mode = {
            use std::os::unix::fs::PermissionsExt;
            Some(metadata.permissions().mode())
        };
        #[cfg(not(unix))]
        let unix_mode = None;

        Ok(OpenedEntry {
            reader: file,
            modified: metadata.modified().ok(),
            unix_mode,
        })
    }
}

/// Creates (or overwrites) `dest` and writes every entry into it.
///
/// The returned statistics include the final archive size and the time spent
/// writing. If the run fails after `dest` was created, the partial archive is
/// removed.
///
/// # Errors
///
/// Returns an error if:
/// - `dest` cannot be created
/// - The ZIP writer fails in a way that cannot be rolled back to the last
///   complete entry
/// - The archive cannot be finalized
///
/// # Examples
///
/// ```no_run
/// use zipper_core::ArchiveOptions;
/// use zipper_core::ExclusionSet;
/// use zipper_core::NoopProgress;
/// use zipper_core::discover;
/// use zipper_core::write_archive;
/// use std::path::Path;
///
/// let found = discover(Path::new("src"), &ExclusionSet::default(), &mut NoopProgress)?;
/// let stats = write_archive(
///     Path::new("src.zip"),
///     &found.entries,
///     &ArchiveOptions::default(),
///     &mut NoopProgress,
/// )?;
/// println!("archived {} files", stats.file_count);
/// # Ok::<(), zipper_core::ZipperError>(())
/// ```
pub fn write_archive(
    dest: &Path,
    entries: &[FileEntry],
    options: &ArchiveOptions,
    progress: &mut dyn ProgressCallback,
) -> Result<RunStats> {
    let start = Instant::now();
    let file = File::create(dest).map_err(|source| ZipperError::OutputNotWritable {
        path: dest.to_path_buf(),
        source,
    })?;

    // A stale archive with the same name may have been discovered inside the
    // source; `dest` was just truncated, so reading it would feed the archive
    // into itself.
    let (own, kept): (Vec<&FileEntry>, Vec<&FileEntry>) = entries
        .iter()
        .partition(|entry| is_same_file(&entry.absolute_path, dest));
    let kept: Vec<FileEntry> = kept.into_iter().cloned().collect();

    let result = write_entries(file, &kept, options, &mut FsOpener, progress).and_then(
        |mut stats| {
            for entry in own {
                skip_entry(&mut stats, progress, entry, "it is the archive being written");
            }
            stats.total_compressed_bytes = fs::metadata(dest)?.len();
            stats.elapsed = start.elapsed();
            Ok(stats)
        },
    );

    if result.is_err() {
        // Best effort; the original error is what the caller needs.
        let _ = fs::remove_file(dest);
    }

    result
}

/// Writes `entries` as a ZIP archive into `writer`.
///
/// Pass `&mut writer` to keep access to the finished archive.
/// `total_compressed_bytes` and `elapsed` are left at zero; [`write_archive`]
/// fills them in for on-disk archives.
///
/// # Errors
///
/// Returns an error if the ZIP writer itself fails: starting an entry,
/// rolling back a half-written entry, or finalizing the central directory.
pub fn write_entries<W, O>(
    writer: W,
    entries: &[FileEntry],
    options: &ArchiveOptions,
    opener: &mut O,
    progress: &mut dyn ProgressCallback,
) -> Result<RunStats>
where
    W: Write + Seek,
    O: EntryOpener,
{
    let mut zip = ZipWriter::new(writer);
    let mut stats = RunStats::default();
    let base = options.base_file_options();
    let total = entries.len();
    let mut seen_names: HashSet<String> = HashSet::with_capacity(total);
    let mut buffer = vec![0u8; COPY_BUFFER_SIZE];

    for (idx, entry) in entries.iter().enumerate() {
        progress.on_entry_start(&entry.relative_path, total, idx + 1);

        let Some(name) = entry.archive_name() else {
            skip_entry(&mut stats, progress, entry, "path is not valid UTF-8");
            continue;
        };
        if name.len() > MAX_ENTRY_NAME_LEN {
            skip_entry(
                &mut stats,
                progress,
                entry,
                &format!(
                    "name is {} bytes, ZIP allows at most {MAX_ENTRY_NAME_LEN}",
                    name.len()
                ),
            );
            continue;
        }

        let mut opened = match opener.open(entry) {
            Ok(opened) => opened,
            Err(err) => {
                skip_entry(&mut stats, progress, entry, &format!("cannot open: {err}"));
                continue;
            }
        };

        let mut file_options = base.large_file(entry.size >= ZIP64_THRESHOLD);
        if let Some(timestamp) = opened.modified.and_then(zip_timestamp) {
            file_options = file_options.last_modified_time(timestamp);
        }
        if options.preserve_permissions
            && let Some(mode) = opened.unix_mode
        {
            file_options = file_options.unix_permissions(mode);
        }

        zip.start_file(name.as_str(), file_options)?;

        match copy_into(&mut zip, &mut opened.reader, &mut buffer, progress) {
            Ok(bytes) => {
                if !seen_names.insert(name.to_lowercase()) {
                    stats.add_warning(format!(
                        "Entry name differs from another only by case: {name}"
                    ));
                }
                debug!(entry = %name, bytes, "archived entry");
                stats.file_count += 1;
                stats.total_original_bytes += bytes;
                progress.on_entry_complete(&entry.relative_path);
            }
            Err(err) => {
                zip.abort_file()?;
                skip_entry(
                    &mut stats,
                    progress,
                    entry,
                    &format!("failed while copying: {err}"),
                );
            }
        }
    }

    zip.finish()?;
    progress.on_complete();

    Ok(stats)
}

/// Streams `reader` into the current ZIP entry, reporting each chunk.
fn copy_into<W: Write + Seek, R: Read>(
    zip: &mut ZipWriter<W>,
    reader: &mut R,
    buffer: &mut [u8],
    progress: &mut dyn ProgressCallback,
) -> io::Result<u64> {
    let mut copied = 0u64;
    loop {
        let read = match reader.read(buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
            Err(err) => return Err(err),
        };
        zip.write_all(&buffer[..read])?;
        copied += read as u64;
        progress.on_bytes_written(read as u64);
    }
    Ok(copied)
}

fn skip_entry(
    stats: &mut RunStats,
    progress: &mut dyn ProgressCallback,
    entry: &FileEntry,
    reason: &str,
) {
    warn!(path = %entry.absolute_path.display(), "skipping entry: {reason}");
    stats.files_skipped += 1;
    stats.add_warning(format!(
        "Skipped {}: {reason}",
        entry.relative_path.display()
    ));
    progress.on_entry_skipped(&entry.relative_path, reason);
}

/// Returns `true` if `path` and `dest` resolve to the same file.
///
/// Only paths sharing `dest`'s file name are canonicalized.
fn is_same_file(path: &Path, dest: &Path) -> bool {
    if path.file_name() != dest.file_name() {
        return false;
    }
    match (fs::canonicalize(path), fs::canonicalize(dest)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// Converts a modification time into a ZIP (DOS) timestamp in local time.
///
/// Returns `None` outside the representable 1980-2107 range.
fn zip_timestamp(modified: SystemTime) -> Option<zip::DateTime> {
    let local: chrono::DateTime<Local> = modified.into();
    zip::DateTime::from_date_and_time(
        u16::try_from(local.year()).ok()?,
        u8::try_from(local.month()).ok()?,
        u8::try_from(local.day()).ok()?,
        u8::try_from(local.hour()).ok()?,
        u8::try_from(local.minute()).ok()?,
        u8::try_from(local.second()).ok()?,
    )
    .ok()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::NoopProgress;
    use std::collections::HashMap;
    use std::io::Cursor;
    use std::path::PathBuf;
    use tempfile::TempDir;
    use zip::ZipArchive;

    /// Serves entry contents from memory; listed paths fail to open.
    struct MemoryOpener {
        contents: HashMap<PathBuf, Vec<u8>>,
    }

    impl EntryOpener for MemoryOpener {
        type Reader = Cursor<Vec<u8>>;

        fn open(&mut self, entry: &FileEntry) -> io::Result<OpenedEntry<Self::Reader>> {
            self.contents
                .get(&entry.relative_path)
                .map(|bytes| OpenedEntry::new(Cursor::new(bytes.clone())))
                .ok_or_else(|| io::Error::new(io::ErrorKind::PermissionDenied, "denied"))
        }
    }

    /// Reader that yields some bytes and then fails.
    struct FailingReader {
        served: bool,
    }

    impl Read for FailingReader {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.served {
                return Err(io::Error::other("device error"));
            }
            self.served = true;
            let n = buf.len().min(4);
            buf[..n].copy_from_slice(&b"half"[..n]);
            Ok(n)
        }
    }

    struct FailingOpener;

    impl EntryOpener for FailingOpener {
        type Reader = Box<dyn Read>;

        fn open(&mut self, entry: &FileEntry) -> io::Result<OpenedEntry<Self::Reader>> {
            if entry.relative_path == Path::new("broken.bin") {
                Ok(OpenedEntry::new(Box::new(FailingReader { served: false })))
            } else {
                Ok(OpenedEntry::new(Box::new(Cursor::new(b"fine".to_vec()))))
            }
        }
    }

    fn entry(path: &str, size: u64) -> FileEntry {
        FileEntry {
            relative_path: PathBuf::from(path),
            absolute_path: PathBuf::from("/src").join(path),
            size,
        }
    }

    fn names_in(bytes: Vec<u8>) -> Vec<String> {
        let archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        let mut names: Vec<String> = archive.file_names().map(str::to_string).collect();
        names.sort();
        names
    }

    #[test]
    fn test_write_entries_preserves_relative_names() {
        let opener_contents = HashMap::from([
            (PathBuf::from("a.txt"), b"alpha".to_vec()),
            (PathBuf::from("dir/b.txt"), b"beta".to_vec()),
        ]);
        let mut opener = MemoryOpener {
            contents: opener_contents,
        };
        let entries = vec![entry("a.txt", 5), entry("dir/b.txt", 4)];
        let mut out = Cursor::new(Vec::new());

        let stats = write_entries(
            &mut out,
            &entries,
            &ArchiveOptions::default(),
            &mut opener,
            &mut NoopProgress,
        )
        .unwrap();

        assert_eq!(stats.file_count, 2);
        assert_eq!(stats.total_original_bytes, 9);
        assert_eq!(stats.files_skipped, 0);
        assert_eq!(names_in(out.into_inner()), vec!["a.txt", "dir/b.txt"]);
    }

    #[test]
    fn test_unopenable_entry_is_skipped() {
        let mut opener = MemoryOpener {
            contents: HashMap::from([
                (PathBuf::from("one"), b"1".to_vec()),
                (PathBuf::from("three"), b"333".to_vec()),
            ]),
        };
        let entries = vec![entry("one", 1), entry("two", 2), entry("three", 3)];
        let mut out = Cursor::new(Vec::new());

        let stats = write_entries(
            &mut out,
            &entries,
            &ArchiveOptions::default(),
            &mut opener,
            &mut NoopProgress,
        )
        .unwrap();

        assert_eq!(stats.file_count, 2);
        assert_eq!(stats.files_skipped, 1);
        assert_eq!(stats.warnings.len(), 1);
        assert!(stats.warnings[0].contains("two"));
        assert_eq!(names_in(out.into_inner()), vec!["one", "three"]);
    }

    #[test]
    fn test_read_failure_mid_entry_is_rolled_back() {
        let entries = vec![entry("before.txt", 4), entry("broken.bin", 8), entry("after.txt", 4)];
        let mut out = Cursor::new(Vec::new());

        let stats = write_entries(
            &mut out,
            &entries,
            &ArchiveOptions::default(),
            &mut FailingOpener,
            &mut NoopProgress,
        )
        .unwrap();

        assert_eq!(stats.file_count, 2);
        assert_eq!(stats.files_skipped, 1);
        assert_eq!(stats.total_original_bytes, 8);
        assert_eq!(
            names_in(out.into_inner()),
            vec!["after.txt", "before.txt"]
        );
    }

    #[test]
    fn test_empty_entry_list_produces_valid_archive() {
        let mut opener = MemoryOpener {
            contents: HashMap::new(),
        };
        let mut out = Cursor::new(Vec::new());

        let stats = write_entries(
            &mut out,
            &[],
            &ArchiveOptions::default(),
            &mut opener,
            &mut NoopProgress,
        )
        .unwrap();

        assert_eq!(stats.file_count, 0);
        assert!(names_in(out.into_inner()).is_empty());
    }

    #[test]
    fn test_case_collision_warns_but_keeps_both() {
        let mut opener = MemoryOpener {
            contents: HashMap::from([
                (PathBuf::from("README"), b"upper".to_vec()),
                (PathBuf::from("readme"), b"lower".to_vec()),
            ]),
        };
        let entries = vec![entry("README", 5), entry("readme", 5)];
        let mut out = Cursor::new(Vec::new());

        let stats = write_entries(
            &mut out,
            &entries,
            &ArchiveOptions::default(),
            &mut opener,
            &mut NoopProgress,
        )
        .unwrap();

        assert_eq!(stats.file_count, 2);
        assert_eq!(stats.files_skipped, 0);
        assert_eq!(stats.warnings.len(), 1);
        assert!(stats.warnings[0].contains("by case"));
    }

    #[test]
    fn test_overlong_name_is_skipped() {
        let long = "a".repeat(MAX_ENTRY_NAME_LEN + 1);
        let mut opener = MemoryOpener {
            contents: HashMap::from([(PathBuf::from(&long), b"x".to_vec())]),
        };
        let entries = vec![entry(&long, 1)];
        let mut out = Cursor::new(Vec::new());

        let stats = write_entries(
            &mut out,
            &entries,
            &ArchiveOptions::default(),
            &mut opener,
            &mut NoopProgress,
        )
        .unwrap();

        assert_eq!(stats.file_count, 0);
        assert_eq!(stats.files_skipped, 1);
    }

    #[test]
    fn test_stored_level_keeps_bytes_uncompressed() {
        let data = vec![b'z'; 4096];
        let mut opener = MemoryOpener {
            contents: HashMap::from([(PathBuf::from("z.txt"), data.clone())]),
        };
        let entries = vec![entry("z.txt", 4096)];
        let mut out = Cursor::new(Vec::new());
        let options = ArchiveOptions {
            compression_level: 0,
            ..ArchiveOptions::default()
        };

        write_entries(&mut out, &entries, &options, &mut opener, &mut NoopProgress).unwrap();

        let mut archive = ZipArchive::new(Cursor::new(out.into_inner())).unwrap();
        let file = archive.by_name("z.txt").unwrap();
        assert_eq!(file.compression(), CompressionMethod::Stored);
        assert_eq!(file.compressed_size(), 4096);
    }

    #[test]
    fn test_deflate_round_trips_contents() {
        let data = b"compressible ".repeat(200);
        let mut opener = MemoryOpener {
            contents: HashMap::from([(PathBuf::from("text.txt"), data.clone())]),
        };
        let entries = vec![entry("text.txt", data.len() as u64)];
        let mut out = Cursor::new(Vec::new());

        write_entries(
            &mut out,
            &entries,
            &ArchiveOptions::default(),
            &mut opener,
            &mut NoopProgress,
        )
        .unwrap();

        let mut archive = ZipArchive::new(Cursor::new(out.into_inner())).unwrap();
        let mut file = archive.by_name("text.txt").unwrap();
        assert_eq!(file.compression(), CompressionMethod::Deflated);
        assert!(file.compressed_size() < data.len() as u64);
        let mut restored = Vec::new();
        file.read_to_end(&mut restored).unwrap();
        assert_eq!(restored, data);
    }

    #[test]
    fn test_progress_events_per_entry() {
        #[derive(Default)]
        struct Recorder {
            started: Vec<usize>,
            bytes: u64,
            completed: usize,
            skipped: usize,
            finished: bool,
        }

        impl ProgressCallback for Recorder {
            fn on_entry_start(&mut self, _path: &Path, _total: usize, current: usize) {
                self.started.push(current);
            }

            fn on_bytes_written(&mut self, bytes: u64) {
                self.bytes += bytes;
            }

            fn on_entry_complete(&mut self, _path: &Path) {
                self.completed += 1;
            }

            fn on_entry_skipped(&mut self, _path: &Path, _reason: &str) {
                self.skipped += 1;
            }

            fn on_complete(&mut self) {
                self.finished = true;
            }
        }

        let mut opener = MemoryOpener {
            contents: HashMap::from([(PathBuf::from("ok"), b"abc".to_vec())]),
        };
        let entries = vec![entry("ok", 3), entry("missing", 1)];
        let mut recorder = Recorder::default();

        write_entries(
            Cursor::new(Vec::new()),
            &entries,
            &ArchiveOptions::default(),
            &mut opener,
            &mut recorder,
        )
        .unwrap();

        assert_eq!(recorder.started, vec![1, 2]);
        assert_eq!(recorder.bytes, 3);
        assert_eq!(recorder.completed, 1);
        assert_eq!(recorder.skipped, 1);
        assert!(recorder.finished);
    }

    #[test]
    fn test_write_archive_to_disk_reports_compressed_size() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("data.txt");
        fs::write(&source, "hello world").unwrap();
        let dest = temp.path().join("out.zip");
        let entries = vec![FileEntry {
            relative_path: PathBuf::from("data.txt"),
            absolute_path: source,
            size: 11,
        }];

        let stats = write_archive(
            &dest,
            &entries,
            &ArchiveOptions::default(),
            &mut NoopProgress,
        )
        .unwrap();

        assert_eq!(stats.file_count, 1);
        assert_eq!(stats.total_original_bytes, 11);
        assert_eq!(
            stats.total_compressed_bytes,
            fs::metadata(&dest).unwrap().len()
        );
    }

    #[test]
    fn test_write_archive_skips_its_own_destination() {
        let temp = TempDir::new().unwrap();
        let data = temp.path().join("data.txt");
        fs::write(&data, "hello").unwrap();
        let dest = temp.path().join("out.zip");
        fs::write(&dest, "stale archive").unwrap();
        let entries = vec![
            FileEntry {
                relative_path: PathBuf::from("data.txt"),
                absolute_path: data,
                size: 5,
            },
            FileEntry {
                relative_path: PathBuf::from("out.zip"),
                absolute_path: temp.path().join(".").join("out.zip"),
                size: 13,
            },
        ];

        let stats = write_archive(
            &dest,
            &entries,
            &ArchiveOptions::default(),
            &mut NoopProgress,
        )
        .unwrap();

        assert_eq!(stats.file_count, 1);
        assert_eq!(stats.files_skipped, 1);
        assert_eq!(stats.total_original_bytes, 5);
        assert_eq!(names_in(fs::read(&dest).unwrap()), vec!["data.txt"]);
    }

    #[test]
    fn test_is_same_file() {
        let temp = TempDir::new().unwrap();
        let a = temp.path().join("a.zip");
        fs::write(&a, "x").unwrap();
        fs::create_dir(temp.path().join("sub")).unwrap();
        fs::write(temp.path().join("sub/a.zip"), "y").unwrap();

        assert!(is_same_file(&temp.path().join("sub/../a.zip"), &a));
        assert!(!is_same_file(&temp.path().join("sub/a.zip"), &a));
        assert!(!is_same_file(&temp.path().join("missing.zip"), &a));
    }

    #[test]
    fn test_write_archive_unwritable_destination() {
        let temp = TempDir::new().unwrap();
        let dest = temp.path().join("missing-dir").join("out.zip");

        let result = write_archive(&dest, &[], &ArchiveOptions::default(), &mut NoopProgress);

        assert!(matches!(
            result,
            Err(ZipperError::OutputNotWritable { .. })
        ));
    }

    #[test]
    fn test_zip_timestamp_range() {
        assert!(zip_timestamp(SystemTime::now()).is_some());
        assert!(zip_timestamp(SystemTime::UNIX_EPOCH).is_none());
    }
}
