//! Image storage used when items are created or updated with file uploads.
//!
//! The uploader is chosen once at startup from `ImagesConfig` and shared
//! through `AppState` as `Arc<dyn ImageUploader>`.

mod cloudflare;
mod disabled;
mod types;

use std::sync::Arc;

use async_trait::async_trait;

pub use cloudflare::CloudflareImageUploader;
pub use disabled::DisabledImageUploader;

use crate::config::{ImageProvider, ImagesConfig};
use crate::error::AppResult;

/// A file received in a multipart request, waiting to be stored
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: Option<String>,
    pub data: Vec<u8>,
}

#[async_trait]
pub trait ImageUploader: Send + Sync {
    /// Short provider name used in logs and errors
    fn provider(&self) -> &'static str;

    /// False when uploads are rejected outright
    fn is_enabled(&self) -> bool {
        true
    }

    /// Stores one image and returns the URL it is served from
    async fn upload(&self, image: ImageUpload) -> AppResult<String>;
}

/// Builds the uploader selected by `config.provider`
pub fn build_uploader(config: &ImagesConfig) -> Arc<dyn ImageUploader> {
    match config.provider {
        ImageProvider::None => Arc::new(DisabledImageUploader),
        ImageProvider::Cloudflare => Arc::new(CloudflareImageUploader::new(
            config.cloudflare.clone(),
            std::time::Duration::from_secs(config.upload_timeout),
        )),
    }
}
