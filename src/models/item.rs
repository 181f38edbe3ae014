use diesel::prelude::*;
use jiff_diesel::Timestamp;

/// Stocked product record
#[derive(Debug, Queryable, Selectable, Identifiable, Clone)]
#[diesel(table_name = crate::schema::items)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Item {
    pub id: i32,
    pub name: String,
    pub part_number: String,
    pub brand: String,
    pub model: Option<String>,
    pub stock: i32,
    pub price: i64,
    pub wholesale_price: i64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Image attached to an item, removed together with its owner
#[derive(Debug, Queryable, Selectable, Identifiable, Associations, Clone)]
#[diesel(belongs_to(Item))]
#[diesel(table_name = crate::schema::item_images)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ItemImage {
    pub id: i32,
    pub item_id: i32,
    pub url: String,
    pub created_at: Timestamp,
}

#[derive(Debug, Insertable, Clone)]
#[diesel(table_name = crate::schema::items)]
pub struct NewItem {
    pub name: String,
    pub part_number: String,
    pub brand: String,
    pub model: Option<String>,
    pub stock: i32,
    pub price: i64,
    pub wholesale_price: i64,
}

#[derive(Debug, Insertable, Clone)]
#[diesel(table_name = crate::schema::item_images)]
pub struct NewItemImage {
    pub item_id: i32,
    pub url: String,
}

impl NewItemImage {
    /// Builds insert rows for every url, preserving their order.
    pub fn for_item(item_id: i32, urls: &[String]) -> Vec<Self> {
        urls.iter()
            .map(|url| Self {
                item_id,
                url: url.clone(),
            })
            .collect()
    }
}

/// Partial update for an item.
///
/// Only `Some` fields are written; `None` leaves the column untouched.
/// Images are not part of the changeset, they are appended separately.
#[derive(Debug, AsChangeset, Clone, Default, PartialEq, Eq)]
#[diesel(table_name = crate::schema::items)]
pub struct ItemPatch {
    pub name: Option<String>,
    pub part_number: Option<String>,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub stock: Option<i32>,
    pub price: Option<i64>,
    pub wholesale_price: Option<i64>,
}

impl ItemPatch {
    /// Returns true when the patch would not change any column.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Item together with its images in insertion order
#[derive(Debug, Clone)]
pub struct ItemWithImages {
    pub item: Item,
    pub images: Vec<ItemImage>,
}
