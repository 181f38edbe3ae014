use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};

use super::types::{CloudflareResponse, UploadedImage};
use super::{ImageUpload, ImageUploader};
use crate::config::CloudflareImagesConfig;
use crate::error::{AppError, AppResult};
use crate::external::client::HTTP_CLIENT;

/// Uploads item images to Cloudflare Images and returns the first delivery
/// variant URL.
pub struct CloudflareImageUploader {
    config: CloudflareImagesConfig,
    timeout: Duration,
}

impl CloudflareImageUploader {
    pub fn new(config: CloudflareImagesConfig, timeout: Duration) -> Self {
        Self { config, timeout }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/accounts/{}/images/v1",
            self.config.api_base.trim_end_matches('/'),
            self.config.account_id
        )
    }

    fn make_error(message: impl Into<String>, source: Option<anyhow::Error>) -> AppError {
        AppError::ExternalApi {
            provider: "cloudflare".into(),
            message: message.into(),
            source,
        }
    }

    fn build_form(image: ImageUpload) -> AppResult<Form> {
        let mut part = Part::bytes(image.data).file_name(image.file_name);
        if let Some(content_type) = image.content_type {
            part = part.mime_str(&content_type).map_err(|e| AppError::BadRequest {
                message: format!("Invalid image content type '{}': {}", content_type, e),
            })?;
        }
        Ok(Form::new().part("file", part))
    }
}

#[async_trait]
impl ImageUploader for CloudflareImageUploader {
    fn provider(&self) -> &'static str {
        "cloudflare"
    }

    async fn upload(&self, image: ImageUpload) -> AppResult<String> {
        let form = Self::build_form(image)?;

        let resp = HTTP_CLIENT
            .post(self.endpoint())
            .bearer_auth(&self.config.api_token)
            .timeout(self.timeout)
            .multipart(form)
            .send()
            .await
            .map_err(|e| Self::make_error(format!("request failed: {}", e), Some(e.into())))?;

        let status = resp.status();
        let body: CloudflareResponse<UploadedImage> = resp.json().await.map_err(|e| {
            Self::make_error(
                format!("invalid JSON (HTTP {}): {}", status, e),
                Some(e.into()),
            )
        })?;

        if !status.is_success() || !body.success {
            return Err(Self::make_error(
                format!("upload rejected (HTTP {}): {}", status, body.error_summary()),
                None,
            ));
        }

        let uploaded = body
            .result
            .ok_or_else(|| Self::make_error("no result in response", None))?;

        uploaded.variants.into_iter().next().ok_or_else(|| {
            Self::make_error(format!("image {} has no delivery variants", uploaded.id), None)
        })
    }
}
