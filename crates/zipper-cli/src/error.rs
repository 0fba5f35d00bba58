//! Error conversion utilities for CLI.
//!
//! Converts zipper-core's typed errors (thiserror) into user-friendly
//! contextual errors (anyhow) with actionable guidance.

use anyhow::anyhow;
use std::path::Path;
use zipper_core::ZipperError;

/// Converts `ZipperError` to user-friendly anyhow error with context
pub fn convert_run_error(err: ZipperError, source: &Path) -> anyhow::Error {
    match err {
        ZipperError::SourceNotFound { path } => {
            anyhow!(
                "Source directory '{}' does not exist\n\
                 HINT: Check the --source path for typos.",
                path.display()
            )
        }
        ZipperError::SourceNotDirectory { path } => {
            anyhow!(
                "Source '{}' is not a directory\n\
                 HINT: --source must point to the directory to compress, not a file.",
                path.display()
            )
        }
        ZipperError::SourceUnreadable { path, source } => {
            anyhow!(
                "Cannot read source directory '{}': {}\n\
                 HINT: Check that you have permission to list this directory.",
                path.display(),
                source
            )
        }
        ZipperError::OutputNotWritable { path, source } => {
            anyhow!(
                "Cannot write archive to '{}': {}\n\
                 HINT: Choose a different --output directory or check its permissions.",
                path.display(),
                source
            )
        }
        ZipperError::InvalidCompressionLevel { level } => {
            anyhow!(
                "Invalid compression level {level}\n\
                 HINT: Use a level between 0 (store) and 9 (smallest)."
            )
        }
        ZipperError::Io(io_err) => {
            anyhow!(
                "I/O error while archiving '{}': {}",
                source.display(),
                io_err
            )
        }
        ZipperError::Archive(reason) => {
            anyhow!(
                "Failed to write archive for '{}': {}\n\
                 HINT: Check free disk space in the output directory.",
                source.display(),
                reason
            )
        }
    }
}

/// Adds context to a failed run
pub fn add_run_context<T>(result: Result<T, ZipperError>, source: &Path) -> anyhow::Result<T> {
    result.map_err(|e| convert_run_error(e, source))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::path::PathBuf;

    #[test]
    fn test_convert_source_not_found() {
        let err = ZipperError::SourceNotFound {
            path: PathBuf::from("missing-dir"),
        };
        let converted = convert_run_error(err, Path::new("missing-dir"));
        let msg = format!("{converted:?}");
        assert!(msg.contains("does not exist"));
        assert!(msg.contains("missing-dir"));
        assert!(msg.contains("HINT"));
    }

    #[test]
    fn test_convert_output_not_writable() {
        let err = ZipperError::OutputNotWritable {
            path: PathBuf::from("/readonly/out"),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        };
        let converted = convert_run_error(err, Path::new("project"));
        let msg = format!("{converted:?}");
        assert!(msg.contains("/readonly/out"));
        assert!(msg.contains("--output"));
    }

    #[test]
    fn test_convert_io_error() {
        let err = ZipperError::Io(io::Error::other("disk gone"));
        let converted = convert_run_error(err, Path::new("project"));
        let msg = format!("{converted:?}");
        assert!(msg.contains("I/O error"));
        assert!(msg.contains("project"));
    }

    #[test]
    fn test_add_run_context_passes_ok_through() {
        let result: Result<u32, ZipperError> = Ok(7);
        assert_eq!(add_run_context(result, Path::new("x")).ok(), Some(7));
    }
}
