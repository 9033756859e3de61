use std::path::PathBuf;

use thiserror::Error;

use crate::classfile::DecodeError;

pub type Result<T> = std::result::Result<T, Error>;

/// Hard failures while fingerprinting a class.
///
/// An unidentified version is not an error: lookups and the signature
/// matcher report that as `None`.
#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to read archive {}", path.display())]
    Archive {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },

    #[error("class entry {entry} not found in {}", path.display())]
    NotFound { path: PathBuf, entry: String },

    #[error("malformed class file")]
    Decode(#[from] DecodeError),
}

impl Error {
    pub(crate) fn archive(path: impl Into<PathBuf>, source: impl Into<zip::result::ZipError>) -> Self {
        Error::Archive {
            path: path.into(),
            source: source.into(),
        }
    }
}
