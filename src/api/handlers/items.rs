//! Item handlers.

use axum::{
    Extension, Json,
    extract::{Path, State},
};
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::api::doc::ITEMS_TAG;
use crate::api::dto::{
    BrandQuery, CreateItemRequest, ErrorResponse, ItemResponse, UpdateItemRequest,
};
use crate::api::middleware::AuthUser;
use crate::error::AppResult;
use crate::state::AppState;
use crate::utils::{JsonOrMultipart, ValidatedQuery};

/// Item routes, mounted at `/items`
///
/// - `GET /` - list, optionally by brand
/// - `POST /` - create from JSON or multipart
/// - `PATCH /{id}` - partial update
pub fn item_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(list_items, create_item))
        .routes(routes!(update_item))
}

/// List items ordered by id
#[utoipa::path(
    get,
    path = "/",
    tag = ITEMS_TAG,
    params(BrandQuery),
    responses(
        (status = 200, description = "Items with their images", body = Vec<ItemResponse>),
        (status = 401, description = "Not authenticated", body = ErrorResponse)
    ),
    security(("bearerAuth" = []))
)]
async fn list_items(
    State(state): State<AppState>,
    ValidatedQuery(query): ValidatedQuery<BrandQuery>,
) -> AppResult<Json<Vec<ItemResponse>>> {
    let items = state
        .services
        .inventory
        .list_items(query.brand.as_deref())
        .await?;

    Ok(Json(items.into_iter().map(Into::into).collect()))
}

/// Create an item
///
/// Accepts JSON, or multipart text fields with `images` file parts that are
/// uploaded before the item is stored.
#[utoipa::path(
    post,
    path = "/",
    tag = ITEMS_TAG,
    request_body(
        content(
            (CreateItemRequest = "application/json"),
            (CreateItemRequest = "multipart/form-data")
        )
    ),
    responses(
        (status = 200, description = "Item created", body = ItemResponse),
        (status = 400, description = "Invalid item data", body = ErrorResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 409, description = "Duplicate item", body = ErrorResponse)
    ),
    security(("bearerAuth" = []))
)]
async fn create_item(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    form: JsonOrMultipart<CreateItemRequest>,
) -> AppResult<Json<ItemResponse>> {
    let (new_item, image_urls) = form.data.into_parts();
    tracing::debug!(user_id = user.user_id, part_number = %new_item.part_number, "Creating item");

    let created = state
        .services
        .inventory
        .add_item(new_item, image_urls, form.uploads)
        .await?;

    Ok(Json(created.into()))
}

/// Partially update an item
///
/// Only supplied fields change, unknown keys are ignored and images are
/// appended.
#[utoipa::path(
    patch,
    path = "/{id}",
    tag = ITEMS_TAG,
    params(("id" = i32, Path, description = "Item id")),
    request_body(
        content(
            (UpdateItemRequest = "application/json"),
            (UpdateItemRequest = "multipart/form-data")
        )
    ),
    responses(
        (status = 200, description = "Item updated", body = ItemResponse),
        (status = 400, description = "Invalid id or item data", body = ErrorResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 404, description = "Item not found", body = ErrorResponse)
    ),
    security(("bearerAuth" = []))
)]
async fn update_item(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i32>,
    form: JsonOrMultipart<UpdateItemRequest>,
) -> AppResult<Json<ItemResponse>> {
    let (patch, image_urls) = form.data.into_parts();
    tracing::debug!(user_id = user.user_id, item_id = id, "Updating item");

    let updated = state
        .services
        .inventory
        .update_item(id, patch, image_urls, form.uploads)
        .await?;

    Ok(Json(updated.into()))
}
