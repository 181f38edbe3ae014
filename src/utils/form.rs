use axum::Json;
use axum::extract::{FromRequest, Multipart, Request};
use axum::http::header;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::external::images::ImageUpload;

/// Multipart field carrying image files or image URLs
pub const IMAGES_FIELD: &str = "images";

/// Body extractor accepting either JSON or `multipart/form-data`.
///
/// Multipart text fields are collected into a JSON object and deserialized
/// into `T`, so numeric fields must accept numbers sent as strings. Parts
/// named `images` become uploads when they carry a file name and image URLs
/// otherwise. `validator` rules run in both cases.
#[derive(Debug)]
pub struct JsonOrMultipart<T> {
    pub data: T,
    pub uploads: Vec<ImageUpload>,
}

impl<T, S> FromRequest<S> for JsonOrMultipart<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> AppResult<Self> {
        let (data, uploads) = if is_multipart(&req) {
            let multipart = Multipart::from_request(req, state).await?;
            read_multipart(multipart).await?
        } else {
            let Json(data) = Json::<T>::from_request(req, state).await?;
            (data, Vec::new())
        };

        data.validate()?;
        Ok(Self { data, uploads })
    }
}

fn is_multipart(req: &Request) -> bool {
    req.headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("multipart/form-data"))
}

async fn read_multipart<T: DeserializeOwned>(
    mut multipart: Multipart,
) -> AppResult<(T, Vec<ImageUpload>)> {
    let mut fields = Map::new();
    let mut image_urls = Vec::new();
    let mut uploads = Vec::new();

    while let Some(field) = multipart.next_field().await? {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };

        if name == IMAGES_FIELD {
            match field.file_name().map(str::to_string) {
                Some(file_name) => {
                    let content_type = field.content_type().map(str::to_string);
                    let data = field.bytes().await?.to_vec();
                    if !data.is_empty() {
                        uploads.push(ImageUpload {
                            file_name,
                            content_type,
                            data,
                        });
                    }
                }
                None => image_urls.push(Value::String(field.text().await?)),
            }
            continue;
        }

        let text = field.text().await?;
        fields.insert(name, Value::String(text));
    }

    if !image_urls.is_empty() {
        fields.insert(IMAGES_FIELD.to_string(), Value::Array(image_urls));
    }

    let data = serde_json::from_value(Value::Object(fields)).map_err(|e| AppError::BadRequest {
        message: format!("Invalid form data: {}", e),
    })?;

    Ok((data, uploads))
}
