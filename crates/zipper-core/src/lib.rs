//! Directory-to-ZIP archiving library.
//!
//! `zipper-core` walks a directory tree, skips names matched by an
//! [`ExclusionSet`], and writes every remaining regular file into a ZIP
//! archive. A run has two stages: discovery enumerates the files and their
//! total size, then archival writes them, reporting progress through a
//! [`ProgressCallback`] and returning [`RunStats`].
//!
//! # Examples
//!
//! ```no_run
//! use zipper_core::ExclusionSet;
//! use zipper_core::NoopProgress;
//! use zipper_core::ZipConfig;
//! use zipper_core::create_archive;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ZipConfig::new("./project", "./backups")
//!     .with_exclusions(ExclusionSet::new(["target"]));
//! let run = create_archive(&config, &mut NoopProgress)?;
//! println!(
//!     "Archived {} files into {}",
//!     run.stats.file_count,
//!     run.archive_path.display()
//! );
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod archive;
pub mod config;
pub mod discovery;
pub mod error;
pub mod exclusion;
pub mod progress;
pub mod report;
pub mod run;

pub use archive::ArchiveOptions;
pub use archive::EntryOpener;
pub use archive::FsOpener;
pub use archive::OpenedEntry;
pub use archive::write_archive;
pub use archive::write_entries;
pub use config::ZipConfig;
pub use discovery::Discovery;
pub use discovery::FileEntry;
pub use discovery::discover;
pub use error::Result;
pub use error::ZipperError;
pub use exclusion::DEFAULT_EXCLUSIONS;
pub use exclusion::ExclusionSet;
pub use progress::NoopProgress;
pub use progress::ProgressCallback;
pub use report::RunStats;
pub use run::CompletedRun;
pub use run::RunPhase;
pub use run::create_archive;
