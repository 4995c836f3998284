use std::path::Path;

use reqwest::blocking::{multipart, Client};

use crate::config::Config;
use crate::errors::{BgRemoveError, Result};
use crate::traits::{BackgroundRemovalService, ServiceResponse};

const API_KEY_HEADER: &str = "X-Api-Key";

/// Blocking HTTP client for the remove.bg API.
pub struct RemoveBgClient {
    client: Client,
    endpoint: String,
    api_key: String,
    size: String,
}

impl RemoveBgClient {
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| BgRemoveError::Configuration {
                message: format!("failed to build HTTP client: {}", e),
            })?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            api_key: config.api_key.clone(),
            size: config.size.clone(),
        })
    }
}

impl BackgroundRemovalService for RemoveBgClient {
    fn remove_background(&self, jpeg_path: &Path) -> Result<ServiceResponse> {
        let form = multipart::Form::new()
            .text("size", self.size.clone())
            .file("image_file", jpeg_path)
            .map_err(|e| BgRemoveError::file_system(jpeg_path, "multipart file read", e))?;

        let request_error = |source: reqwest::Error| BgRemoveError::Request {
            path: jpeg_path.to_path_buf(),
            source,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .header(API_KEY_HEADER, &self.api_key)
            .multipart(form)
            .send()
            .map_err(request_error)?;

        let status = response.status().as_u16();
        let body = response.bytes().map_err(request_error)?;

        Ok(ServiceResponse::new(status, body.to_vec()))
    }
}
