use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// Source directory is missing or holds no files for the save.
    #[error("invalid save source {path}: {reason}")]
    InvalidSource { path: PathBuf, reason: String },

    #[error("lock already exists at {path}")]
    LockCollision { path: PathBuf },

    #[error("cannot delete lock, lock is owned by {owner}")]
    LockOwnership { owner: String },

    /// Lock file exists but does not hold a readable session.
    #[error("lock file {path} is corrupt: {reason}")]
    LockIntegrity { path: PathBuf, reason: String },

    #[error("no backup available in {path}")]
    NoBackup { path: PathBuf },

    /// The transfer failed but the destination was put back the way it was.
    #[error("transfer failed and was rolled back: {source}")]
    RolledBack {
        #[source]
        source: Box<Error>,
    },

    #[error("transfer failed ({transfer}) and rollback failed too ({restore})")]
    RollbackFailed {
        transfer: Box<Error>,
        restore: Box<Error>,
    },

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },

    #[error("bad save pattern {pattern}: {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("process error: {0}")]
    Process(String),

    #[error("background task failed: {0}")]
    Task(String),
}

impl Error {
    /// Builds a `map_err` adapter that tags an io error with what was being done.
    pub fn io(context: impl Into<String>) -> impl FnOnce(io::Error) -> Error {
        let context = context.into();
        move |source| Error::Io { context, source }
    }

    pub fn invalid_source(path: &Path, reason: impl Into<String>) -> Self {
        Error::InvalidSource {
            path: path.to_path_buf(),
            reason: reason.into(),
        }
    }

    pub fn is_rolled_back(&self) -> bool {
        matches!(self, Error::RolledBack { .. })
    }

    /// The error that started a rollback, when there was one.
    pub fn original(&self) -> &Error {
        match self {
            Error::RolledBack { source } => source,
            Error::RollbackFailed { transfer, .. } => transfer,
            other => other,
        }
    }
}
