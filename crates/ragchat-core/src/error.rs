//! Error types for file selection and upload.

use std::path::PathBuf;
use thiserror::Error;

/// Rejected file selection
#[derive(Error, Debug)]
pub enum FileSelectError {
    /// The path has no final component to use as a file name (e.g. `/` or `..`)
    #[error("Path has no file name: {path:?}")]
    NoFileName { path: PathBuf },
}

/// Upload failure.
///
/// Every variant is handled the same way by the file submitter; the variants
/// only carry detail for the log.
#[derive(Error, Debug)]
pub enum UploadError {
    /// The selected file could not be read
    #[error("Failed to read {name}: {source}")]
    Read {
        name: String,
        #[source]
        source: std::io::Error,
    },

    /// The request never produced a response
    #[error("Upload request failed: {message}")]
    Transport { message: String },

    /// The endpoint answered with a non-success status
    #[error("Upload rejected with HTTP {status}")]
    Status { status: u16 },

    /// An extra form field would collide with the file part
    #[error("Form field '{name}' is reserved for the uploaded file")]
    ReservedField { name: String },
}

impl UploadError {
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }
}

pub type UploadResult<T> = Result<T, UploadError>;
