//! Item repository for async database operations.
//!
//! Items are always returned together with their images. Images are loaded
//! with one batched query per call and grouped back onto their owners.

use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};
use jiff_diesel::ToDiesel;

use crate::db::AsyncDbPool;
use crate::error::{AppError, AppResult};
use crate::models::{Item, ItemImage, ItemPatch, ItemWithImages, NewItem, NewItemImage};
use crate::schema::{item_images, items};

#[derive(Clone)]
pub struct ItemRepository {
    pool: AsyncDbPool,
}

impl ItemRepository {
    pub fn new(pool: AsyncDbPool) -> Self {
        Self { pool }
    }

    /// Inserts an item and its images in one transaction.
    ///
    /// # Returns
    /// The stored item with its generated id and images in `image_urls` order
    pub async fn create(
        &self,
        new_item: NewItem,
        image_urls: Vec<String>,
    ) -> AppResult<ItemWithImages> {
        let mut conn = self.pool.get().await?;

        conn.transaction::<_, AppError, _>(|conn| {
            async move {
                let item = diesel::insert_into(items::table)
                    .values(&new_item)
                    .returning(Item::as_returning())
                    .get_result(conn)
                    .await?;

                let images = insert_images(conn, item.id, &image_urls).await?;

                Ok(ItemWithImages { item, images })
            }
            .scope_boxed()
        })
        .await
    }

    /// Finds an item with its images.
    ///
    /// # Returns
    /// `Some(ItemWithImages)` if found, `None` otherwise
    pub async fn find_by_id(&self, item_id: i32) -> AppResult<Option<ItemWithImages>> {
        let mut conn = self.pool.get().await?;

        let item = items::table
            .find(item_id)
            .select(Item::as_select())
            .first(&mut conn)
            .await
            .optional()?;

        match item {
            Some(item) => Ok(attach_images(&mut conn, vec![item]).await?.pop()),
            None => Ok(None),
        }
    }

    /// Lists items ordered by id, optionally restricted to an exact brand.
    pub async fn list(&self, brand: Option<&str>) -> AppResult<Vec<ItemWithImages>> {
        let mut conn = self.pool.get().await?;

        let mut query = items::table
            .select(Item::as_select())
            .order(items::id.asc())
            .into_boxed();
        if let Some(brand) = brand {
            query = query.filter(items::brand.eq(brand.to_string()));
        }

        let found = query.load(&mut conn).await?;
        attach_images(&mut conn, found).await.map_err(AppError::from)
    }

    /// Applies a partial update and appends images.
    ///
    /// The row is locked for the duration of the transaction. An empty patch
    /// with no images leaves the row untouched, `updated_at` included.
    ///
    /// # Returns
    /// `None` when no item has the given id
    pub async fn update(
        &self,
        item_id: i32,
        patch: ItemPatch,
        image_urls: Vec<String>,
    ) -> AppResult<Option<ItemWithImages>> {
        let mut conn = self.pool.get().await?;

        conn.transaction::<_, AppError, _>(|conn| {
            async move {
                let current = items::table
                    .find(item_id)
                    .select(Item::as_select())
                    .for_update()
                    .first(conn)
                    .await
                    .optional()?;

                let Some(current) = current else {
                    return Ok(None);
                };

                let item = if patch.is_empty() && image_urls.is_empty() {
                    current
                } else {
                    let now = jiff::Timestamp::now().to_diesel();
                    diesel::update(items::table.find(item_id))
                        .set((&patch, items::updated_at.eq(now)))
                        .returning(Item::as_returning())
                        .get_result(conn)
                        .await?
                };

                insert_images(conn, item_id, &image_urls).await?;

                Ok(attach_images(conn, vec![item]).await?.pop())
            }
            .scope_boxed()
        })
        .await
    }
}

async fn insert_images(
    conn: &mut AsyncPgConnection,
    item_id: i32,
    urls: &[String],
) -> QueryResult<Vec<ItemImage>> {
    if urls.is_empty() {
        return Ok(Vec::new());
    }

    diesel::insert_into(item_images::table)
        .values(NewItemImage::for_item(item_id, urls))
        .returning(ItemImage::as_returning())
        .get_results(conn)
        .await
}

/// Loads images for all `items` in one query and pairs them up, keeping the
/// order of `items`.
pub(crate) async fn attach_images(
    conn: &mut AsyncPgConnection,
    items: Vec<Item>,
) -> QueryResult<Vec<ItemWithImages>> {
    if items.is_empty() {
        return Ok(Vec::new());
    }

    let images = ItemImage::belonging_to(&items)
        .select(ItemImage::as_select())
        .order(item_images::id.asc())
        .load::<ItemImage>(conn)
        .await?;

    Ok(images
        .grouped_by(&items)
        .into_iter()
        .zip(items)
        .map(|(images, item)| ItemWithImages { item, images })
        .collect())
}
