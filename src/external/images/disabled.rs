use async_trait::async_trait;

use super::{ImageUpload, ImageUploader};
use crate::error::{AppError, AppResult};

/// Uploader used when no image provider is configured; rejects every file
pub struct DisabledImageUploader;

#[async_trait]
impl ImageUploader for DisabledImageUploader {
    fn provider(&self) -> &'static str {
        "none"
    }

    fn is_enabled(&self) -> bool {
        false
    }

    async fn upload(&self, image: ImageUpload) -> AppResult<String> {
        Err(AppError::BadRequest {
            message: format!(
                "Image upload is not configured, cannot store '{}'",
                image.file_name
            ),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_disabled_uploader_rejects_files() {
        let result = DisabledImageUploader
            .upload(ImageUpload {
                file_name: "front.png".to_string(),
                content_type: Some("image/png".to_string()),
                data: vec![1, 2, 3],
            })
            .await;

        match result {
            Err(AppError::BadRequest { message }) => assert!(message.contains("front.png")),
            other => panic!("Expected BadRequest, got {:?}", other),
        }
    }
}
