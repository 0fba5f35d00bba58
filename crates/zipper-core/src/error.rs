//! Error types for archiving operations.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using `ZipperError`.
pub type Result<T> = std::result::Result<T, ZipperError>;

/// Errors that abort an archiving run.
///
/// Problems with individual files never surface here: they are recorded as
/// warnings in [`RunStats`](crate::RunStats) and the run continues.
#[derive(Error, Debug)]
pub enum ZipperError {
    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Source directory does not exist.
    #[error("source not found: {path}")]
    SourceNotFound {
        /// The missing path.
        path: PathBuf,
    },

    /// Source exists but is not a directory.
    #[error("source is not a directory: {path}")]
    SourceNotDirectory {
        /// The offending path.
        path: PathBuf,
    },

    /// Source directory cannot be listed.
    #[error("cannot read source directory {path}: {source}")]
    SourceUnreadable {
        /// The source directory.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Output directory or archive file cannot be created.
    #[error("cannot write archive to {path}: {source}")]
    OutputNotWritable {
        /// The output directory or archive path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Compression level outside 0-9.
    #[error("invalid compression level {level}, expected 0-9")]
    InvalidCompressionLevel {
        /// The rejected level.
        level: u8,
    },

    /// The ZIP writer failed in a way that leaves the archive unusable.
    #[error("archive write failed: {0}")]
    Archive(String),
}

impl ZipperError {
    /// Returns `true` if the error comes from bad input configuration
    /// (source root or output location) rather than from writing the archive.
    ///
    /// # Examples
    ///
    /// ```
    /// use zipper_core::ZipperError;
    /// use std::path::PathBuf;
    ///
    /// let err = ZipperError::SourceNotFound { path: PathBuf::from("missing") };
    /// assert!(err.is_fatal_config());
    ///
    /// let err = ZipperError::Archive("disk full".into());
    /// assert!(!err.is_fatal_config());
    /// ```
    #[must_use]
    pub const fn is_fatal_config(&self) -> bool {
        matches!(
            self,
            Self::SourceNotFound { .. }
                | Self::SourceNotDirectory { .. }
                | Self::SourceUnreadable { .. }
                | Self::OutputNotWritable { .. }
                | Self::InvalidCompressionLevel { .. }
        )
    }
}

impl From<zip::result::ZipError> for ZipperError {
    fn from(err: zip::result::ZipError) -> Self {
        match err {
            zip::result::ZipError::Io(io) => Self::Io(io),
            other => Self::Archive(other.to_string()),
        }
    }
}
