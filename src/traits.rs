use crate::errors::Result;
use std::borrow::Cow;
use std::path::Path;

/// Status and body returned by the background-removal service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl ServiceResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Only a plain 200 carries a cutout.
    pub const fn is_success(&self) -> bool {
        self.status == 200
    }

    pub fn body_text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }
}

/// Abstraction over the remote background-removal API
///
/// The batch depends on this trait rather than on the HTTP client so it can be
/// driven by a mock in tests.
pub trait BackgroundRemovalService {
    /// Upload one normalized JPEG.
    ///
    /// `Err` is reserved for transport failures; any HTTP status, including
    /// errors reported by the service, comes back as `Ok`.
    fn remove_background(&self, jpeg_path: &Path) -> Result<ServiceResponse>;
}

impl<S: BackgroundRemovalService + ?Sized> BackgroundRemovalService for &S {
    fn remove_background(&self, jpeg_path: &Path) -> Result<ServiceResponse> {
        (**self).remove_background(jpeg_path)
    }
}
