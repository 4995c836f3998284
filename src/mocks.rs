use crate::errors::{BgRemoveError, Result};
use crate::traits::{BackgroundRemovalService, ServiceResponse};
use parking_lot::Mutex;
use std::path::{Path, PathBuf};

type Responder = Box<dyn Fn(&Path) -> Result<ServiceResponse> + Send + Sync>;

/// Background-removal service stand-in for tests
///
/// Records every uploaded path and answers through a configurable responder.
pub struct MockRemovalService {
    responder: Responder,
    calls: Mutex<Vec<PathBuf>>,
}

impl MockRemovalService {
    pub fn new(responder: impl Fn(&Path) -> Result<ServiceResponse> + Send + Sync + 'static) -> Self {
        Self {
            responder: Box::new(responder),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Always answers 200 with the given body.
    pub fn always_ok(body: impl Into<Vec<u8>>) -> Self {
        let body = body.into();
        Self::new(move |_| Ok(ServiceResponse::new(200, body.clone())))
    }

    /// Answers 200 with the uploaded JPEG bytes, so outputs depend on input.
    pub fn echo() -> Self {
        Self::new(|path| {
            let bytes = std::fs::read(path)
                .map_err(|e| BgRemoveError::file_system(path, "mock read", e))?;
            Ok(ServiceResponse::new(200, bytes))
        })
    }

    /// Always answers with `status` and `body`.
    pub fn always_status(status: u16, body: &str) -> Self {
        let body = body.as_bytes().to_vec();
        Self::new(move |_| Ok(ServiceResponse::new(status, body.clone())))
    }

    /// Rejects uploads whose file stem is listed, accepts the rest with `body`.
    pub fn rejecting(stems: &[&str], status: u16, body: impl Into<Vec<u8>>) -> Self {
        let stems: Vec<String> = stems.iter().map(|s| s.to_string()).collect();
        let body = body.into();
        Self::new(move |path| {
            let stem = path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();
            if stems.contains(&stem) {
                Ok(ServiceResponse::new(status, b"rejected".to_vec()))
            } else {
                Ok(ServiceResponse::new(200, body.clone()))
            }
        })
    }

    /// Fails every upload the way a dropped connection would.
    pub fn unreachable() -> Self {
        Self::new(|path| {
            Err(BgRemoveError::file_system(
                path,
                "mock upload",
                std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "connection refused"),
            ))
        })
    }

    pub fn calls(&self) -> Vec<PathBuf> {
        self.calls.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }
}

impl BackgroundRemovalService for MockRemovalService {
    fn remove_background(&self, jpeg_path: &Path) -> Result<ServiceResponse> {
        self.calls.lock().push(jpeg_path.to_path_buf());
        (self.responder)(jpeg_path)
    }
}
