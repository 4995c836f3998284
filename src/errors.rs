use std::path::PathBuf;
use thiserror::Error;

/// Structured error types for the batch background remover.
///
/// Each variant carries the context of the step that produced it (filesystem,
/// image normalization, HTTP transport, service response), so a failed file can
/// be reported without parsing error strings.
#[derive(Error, Debug)]
pub enum BgRemoveError {
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Filesystem error: {operation} failed for {path:?}")]
    FileSystem {
        path: PathBuf,
        operation: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Image processing error: {operation} failed (file: {path})")]
    ImageProcessing {
        path: String,
        operation: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Request error: upload of {path:?} failed")]
    Request {
        path: PathBuf,
        #[source]
        source: reqwest::Error,
    },

    #[error("Service rejected the image with status {status}: {body}")]
    ServiceRejected { status: u16, body: String },
}

pub type Result<T> = std::result::Result<T, BgRemoveError>;

impl BgRemoveError {
    pub(crate) fn file_system(
        path: impl Into<PathBuf>,
        operation: &str,
        source: std::io::Error,
    ) -> Self {
        Self::FileSystem {
            path: path.into(),
            operation: operation.to_string(),
            source,
        }
    }

    pub(crate) fn image_processing(
        path: &std::path::Path,
        operation: &str,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::ImageProcessing {
            path: path.display().to_string(),
            operation: operation.to_string(),
            source: Box::new(source),
        }
    }
}

/// Convert I/O errors to filesystem errors.
///
/// Fallback for call sites without path context. Code that knows the path
/// should construct `BgRemoveError::FileSystem` directly.
impl From<std::io::Error> for BgRemoveError {
    fn from(err: std::io::Error) -> Self {
        Self::FileSystem {
            path: PathBuf::from("unknown"),
            operation: "unknown".to_string(),
            source: err,
        }
    }
}

/// Convert image crate errors to image processing errors.
impl From<image::ImageError> for BgRemoveError {
    fn from(err: image::ImageError) -> Self {
        Self::ImageProcessing {
            path: "unknown".to_string(),
            operation: "image processing".to_string(),
            source: Box::new(err),
        }
    }
}
