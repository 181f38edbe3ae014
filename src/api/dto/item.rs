//! Item DTOs.
//!
//! Create and update bodies arrive either as JSON or as multipart text
//! fields, so numeric fields accept both numbers and numeric strings.

use std::fmt::Display;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use super::rfc3339;
use crate::models::{ItemImage, ItemPatch, ItemWithImages, NewItem};

#[derive(Debug, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateItemRequest {
    #[validate(length(min = 1, max = 200, message = "Name must be between 1 and 200 characters"))]
    #[schema(example = "Front brake pad set")]
    pub name: String,
    #[validate(length(min = 1, max = 100, message = "Part number must be between 1 and 100 characters"))]
    #[schema(example = "BP-4471")]
    pub part_number: String,
    #[validate(length(min = 1, max = 100, message = "Brand must be between 1 and 100 characters"))]
    #[schema(example = "Bosch")]
    pub brand: String,
    #[serde(default)]
    #[validate(length(max = 100, message = "Model must be at most 100 characters"))]
    #[schema(example = "Golf VII")]
    pub model: Option<String>,
    #[serde(deserialize_with = "number")]
    #[validate(range(min = 0, message = "Stock cannot be negative"))]
    #[schema(example = 10, minimum = 0)]
    pub stock: i32,
    /// Unit sale price in minor currency units
    #[serde(deserialize_with = "number")]
    #[validate(range(min = 0, message = "Price cannot be negative"))]
    #[schema(example = 4500, minimum = 0)]
    pub price: i64,
    #[serde(deserialize_with = "number")]
    #[validate(range(min = 0, message = "Wholesale price cannot be negative"))]
    #[schema(example = 3200, minimum = 0)]
    pub wholesale_price: i64,
    /// Image URLs stored as given; multipart file parts are uploaded and appended
    #[serde(default)]
    pub images: Vec<String>,
}

impl CreateItemRequest {
    /// Splits the request into the row to insert and its image URLs.
    pub fn into_parts(self) -> (NewItem, Vec<String>) {
        let item = NewItem {
            name: self.name,
            part_number: self.part_number,
            brand: self.brand,
            model: self.model.filter(|m| !m.is_empty()),
            stock: self.stock,
            price: self.price,
            wholesale_price: self.wholesale_price,
        };
        (item, self.images)
    }
}

/// Partial update. Absent fields are left unchanged and unknown keys are
/// ignored.
#[derive(Debug, Default, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateItemRequest {
    #[serde(default)]
    #[validate(length(min = 1, max = 200, message = "Name must be between 1 and 200 characters"))]
    pub name: Option<String>,
    #[serde(default)]
    #[validate(length(min = 1, max = 100, message = "Part number must be between 1 and 100 characters"))]
    pub part_number: Option<String>,
    #[serde(default)]
    #[validate(length(min = 1, max = 100, message = "Brand must be between 1 and 100 characters"))]
    pub brand: Option<String>,
    #[serde(default)]
    #[validate(length(max = 100, message = "Model must be at most 100 characters"))]
    pub model: Option<String>,
    #[serde(default, deserialize_with = "optional_number")]
    #[validate(range(min = 0, message = "Stock cannot be negative"))]
    pub stock: Option<i32>,
    #[serde(default, deserialize_with = "optional_number")]
    #[validate(range(min = 0, message = "Price cannot be negative"))]
    pub price: Option<i64>,
    #[serde(default, deserialize_with = "optional_number")]
    #[validate(range(min = 0, message = "Wholesale price cannot be negative"))]
    pub wholesale_price: Option<i64>,
    /// Appended to the existing images
    #[serde(default)]
    pub images: Vec<String>,
}

impl UpdateItemRequest {
    pub fn into_parts(self) -> (ItemPatch, Vec<String>) {
        let patch = ItemPatch {
            name: self.name,
            part_number: self.part_number,
            brand: self.brand,
            model: self.model.filter(|m| !m.is_empty()),
            stock: self.stock,
            price: self.price,
            wholesale_price: self.wholesale_price,
        };
        (patch, self.images)
    }
}

#[derive(Debug, Deserialize, IntoParams, Validate)]
#[into_params(parameter_in = Query)]
pub struct BrandQuery {
    /// Exact brand to filter by, an empty value means no filter
    #[serde(default, deserialize_with = "non_empty")]
    #[validate(length(min = 1, max = 100, message = "Brand must be between 1 and 100 characters"))]
    pub brand: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ItemImageResponse {
    pub id: i32,
    #[schema(example = "https://imagedelivery.net/hash/img-1/public")]
    pub url: String,
}

impl From<ItemImage> for ItemImageResponse {
    fn from(image: ItemImage) -> Self {
        Self {
            id: image.id,
            url: image.url,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ItemResponse {
    pub id: i32,
    pub name: String,
    pub part_number: String,
    pub brand: String,
    pub model: Option<String>,
    pub stock: i32,
    pub price: i64,
    pub wholesale_price: i64,
    pub images: Vec<ItemImageResponse>,
    #[schema(value_type = String, format = DateTime)]
    pub created_at: String,
    #[schema(value_type = String, format = DateTime)]
    pub updated_at: String,
}

impl From<ItemWithImages> for ItemResponse {
    fn from(ItemWithImages { item, images }: ItemWithImages) -> Self {
        Self {
            id: item.id,
            name: item.name,
            part_number: item.part_number,
            brand: item.brand,
            model: item.model,
            stock: item.stock,
            price: item.price,
            wholesale_price: item.wholesale_price,
            images: images.into_iter().map(Into::into).collect(),
            created_at: rfc3339(item.created_at),
            updated_at: rfc3339(item.updated_at),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrText<N> {
    Number(N),
    Text(String),
}

impl<N> NumberOrText<N>
where
    N: FromStr,
    N::Err: Display,
{
    fn into_number<E: serde::de::Error>(self) -> Result<N, E> {
        match self {
            Self::Number(n) => Ok(n),
            Self::Text(text) => text
                .trim()
                .parse()
                .map_err(|e| E::custom(format!("invalid number '{}': {}", text, e))),
        }
    }
}

fn number<'de, D, N>(deserializer: D) -> Result<N, D::Error>
where
    D: Deserializer<'de>,
    N: Deserialize<'de> + FromStr,
    N::Err: Display,
{
    NumberOrText::<N>::deserialize(deserializer)?.into_number()
}

fn non_empty<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = String::deserialize(deserializer)?;
    Ok(Some(value).filter(|v| !v.is_empty()))
}

fn optional_number<'de, D, N>(deserializer: D) -> Result<Option<N>, D::Error>
where
    D: Deserializer<'de>,
    N: Deserialize<'de> + FromStr,
    N::Err: Display,
{
    Option::<NumberOrText<N>>::deserialize(deserializer)?
        .map(NumberOrText::into_number)
        .transpose()
}
