//! Inventory service: item creation, listing and partial updates.

use std::sync::Arc;

use crate::error::{AppError, AppResult};
use crate::external::images::{ImageUpload, ImageUploader};
use crate::models::{ItemPatch, ItemWithImages, NewItem};
use crate::repositories::ItemRepository;

#[derive(Clone)]
pub struct InventoryService {
    items: ItemRepository,
    uploader: Arc<dyn ImageUploader>,
}

impl InventoryService {
    pub fn new(items: ItemRepository, uploader: Arc<dyn ImageUploader>) -> Self {
        Self { items, uploader }
    }

    /// Stores a new item, uploading any attached files first.
    ///
    /// `image_urls` are stored as given, uploaded files are appended after them.
    pub async fn add_item(
        &self,
        new_item: NewItem,
        mut image_urls: Vec<String>,
        uploads: Vec<ImageUpload>,
    ) -> AppResult<ItemWithImages> {
        image_urls.extend(self.upload_all(uploads).await?);

        let created = self.items.create(new_item, image_urls).await?;
        tracing::info!(
            item_id = created.item.id,
            images = created.images.len(),
            "Item created"
        );
        Ok(created)
    }

    /// Items ordered by id, restricted to an exact brand when given
    pub async fn list_items(&self, brand: Option<&str>) -> AppResult<Vec<ItemWithImages>> {
        self.items.list(brand).await
    }

    pub async fn get_item(&self, id: i32) -> AppResult<ItemWithImages> {
        self.items
            .find_by_id(id)
            .await?
            .ok_or_else(|| item_not_found(id))
    }

    /// Applies a partial update and appends new images.
    ///
    /// # Errors
    /// `AppError::NotFound` when no item has `id`
    pub async fn update_item(
        &self,
        id: i32,
        patch: ItemPatch,
        mut image_urls: Vec<String>,
        uploads: Vec<ImageUpload>,
    ) -> AppResult<ItemWithImages> {
        if !uploads.is_empty() {
            // Avoid storing files for an item that does not exist
            self.get_item(id).await?;
            image_urls.extend(self.upload_all(uploads).await?);
        }

        let updated = self
            .items
            .update(id, patch, image_urls)
            .await?
            .ok_or_else(|| item_not_found(id))?;

        tracing::info!(item_id = id, "Item updated");
        Ok(updated)
    }

    /// Uploads every file, skipping the ones the provider fails to store.
    ///
    /// # Errors
    /// `AppError::BadRequest` when files are sent but no provider is configured
    async fn upload_all(&self, uploads: Vec<ImageUpload>) -> AppResult<Vec<String>> {
        if uploads.is_empty() {
            return Ok(Vec::new());
        }

        if !self.uploader.is_enabled() {
            return Err(AppError::BadRequest {
                message: "Image upload is not configured on this server".to_string(),
            });
        }

        let mut urls = Vec::with_capacity(uploads.len());
        for upload in uploads {
            let file_name = upload.file_name.clone();
            match self.uploader.upload(upload).await {
                Ok(url) => urls.push(url),
                Err(e) => tracing::warn!(
                    provider = self.uploader.provider(),
                    file_name = %file_name,
                    error = %e,
                    "Image upload failed, skipping file"
                ),
            }
        }

        Ok(urls)
    }
}

fn item_not_found(id: i32) -> AppError {
    AppError::NotFound {
        entity: "item".to_string(),
        field: "id".to_string(),
        value: id.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::lazy_pool;
    use crate::external::images::DisabledImageUploader;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Fails every upload whose file name starts with "bad"
    struct FlakyUploader {
        seen: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl ImageUploader for FlakyUploader {
        fn provider(&self) -> &'static str {
            "flaky"
        }

        async fn upload(&self, image: ImageUpload) -> AppResult<String> {
            self.seen.lock().unwrap().push(image.file_name.clone());
            if image.file_name.starts_with("bad") {
                Err(AppError::ExternalApi {
                    provider: "flaky".to_string(),
                    message: "rejected".to_string(),
                    source: None,
                })
            } else {
                Ok(format!("https://img.example/{}", image.file_name))
            }
        }
    }

    fn upload(name: &str) -> ImageUpload {
        ImageUpload {
            file_name: name.to_string(),
            content_type: None,
            data: vec![1],
        }
    }

    #[tokio::test]
    async fn test_failed_uploads_are_skipped() {
        let uploader = Arc::new(FlakyUploader {
            seen: Mutex::new(Vec::new()),
        });
        let service = InventoryService::new(ItemRepository::new(lazy_pool()), uploader.clone());

        let urls = service
            .upload_all(vec![upload("a.png"), upload("bad.png"), upload("c.png")])
            .await
            .unwrap();

        assert_eq!(
            urls,
            vec!["https://img.example/a.png", "https://img.example/c.png"]
        );
        assert_eq!(uploader.seen.lock().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_files_without_provider_are_rejected() {
        let service = InventoryService::new(
            ItemRepository::new(lazy_pool()),
            Arc::new(DisabledImageUploader),
        );

        assert!(service.upload_all(Vec::new()).await.unwrap().is_empty());
        assert!(matches!(
            service.upload_all(vec![upload("a.png")]).await,
            Err(AppError::BadRequest { .. })
        ));
    }
}
