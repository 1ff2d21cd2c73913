//! Classified errors for toolchain operations.
//!
//! Every blocking step (fetch, extract, subprocess) maps its failure into one
//! of these variants so the CLI can print a readable message instead of a raw
//! I/O error. Nothing is retried: the first error aborts the whole run.

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T, E = ToolchainError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum ToolchainError {
    #[error("invalid architecture '{0}': expected ASCII letters, digits or '_'")]
    InvalidArch(String),

    #[error("unsupported toolchain command '{0}'; expected one of: download, build")]
    UnknownCommand(String),

    #[error("URL template '{template}' has unknown placeholder '{{{placeholder}}}'")]
    Template {
        template: String,
        placeholder: String,
    },

    #[error("failed to download {url}")]
    Download {
        url: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("download of {url} returned HTTP {status}")]
    HttpStatus { url: String, status: u16 },

    #[error("cannot derive an archive file name from URL '{0}'")]
    ArchiveName(String),

    #[error("unsupported archive format: {}", .0.display())]
    UnsupportedArchive(PathBuf),

    #[error("failed to extract {}: {message}", .archive.display())]
    Extract { archive: PathBuf, message: String },

    #[error("failed to start `{command}`")]
    CommandSpawn {
        command: String,
        source: std::io::Error,
    },

    #[error("`{command}` failed with exit code {code}")]
    CommandFailed { command: String, code: i32 },

    #[error("Toolchain config missing: {}", .0.display())]
    MissingConfig(PathBuf),

    #[error("missing required host tools:\n{0}")]
    MissingHostTools(String),

    #[error(
        "toolchain for {triplet} was left incomplete by an earlier run ({}); rerun with --clean",
        .marker.display()
    )]
    Incomplete { triplet: String, marker: PathBuf },

    #[error("{what} finished but {} does not exist", .path.display())]
    MissingOutput { what: String, path: PathBuf },

    #[error("toolchain root is locked by another process: {}", .0.display())]
    Locked(PathBuf),

    #[error("invalid settings file {}: {message}", .path.display())]
    Settings { path: PathBuf, message: String },

    #[error("{context}")]
    Io {
        context: String,
        source: std::io::Error,
    },
}

impl ToolchainError {
    /// Wrap an I/O error with a short description of what was being done.
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        ToolchainError::Io {
            context: context.into(),
            source,
        }
    }
}

/// Attach a description to bare `io::Result`s, in the spirit of
/// `anyhow::Context` but producing a [`ToolchainError::Io`].
pub(crate) trait IoContext<T> {
    fn io_context<F, S>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> S,
        S: Into<String>;
}

impl<T> IoContext<T> for std::io::Result<T> {
    fn io_context<F, S>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> S,
        S: Into<String>,
    {
        self.map_err(|source| ToolchainError::io(f(), source))
    }
}
