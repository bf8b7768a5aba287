//! Library error type. Input errors abort a run before any thread starts; runtime errors end it as `Failed`.

use std::path::PathBuf;
use thiserror::Error;

/// Broad class of a [`CrackError`], used to decide how a failure is reported.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad arguments or unreadable inputs. Detected before workers are launched.
    Input,
    /// Queue, thread or mid-stream read failures during a run.
    Runtime,
}

#[derive(Debug, Error)]
pub enum CrackError {
    #[error("file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid charset: resolves to an empty alphabet")]
    InvalidCharset,

    #[error("invalid maximum length {0}: must be a positive integer")]
    InvalidLength(usize),

    #[error("cannot read archive {}: {reason}", path.display())]
    Archive { path: PathBuf, reason: String },

    #[error("archive {} has no encrypted entries", .0.display())]
    NotEncrypted(PathBuf),

    #[error("combination count does not fit in 128 bits")]
    Overflow,

    #[error("{0}")]
    Runtime(String),
}

impl CrackError {
    /// Wrap an I/O error, mapping `NotFound` to [`CrackError::NotFound`].
    pub fn from_io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            CrackError::NotFound(path)
        } else {
            CrackError::Io { path, source }
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            CrackError::Runtime(_) => ErrorKind::Runtime,
            _ => ErrorKind::Input,
        }
    }
}
