//! Sale recording and sales report handlers.

use axum::{Extension, Json, extract::State};
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::api::doc::SALES_TAG;
use crate::api::dto::{BrandQuery, ErrorResponse, SaleRequest, SaleResponse, TopSellerResponse};
use crate::api::middleware::AuthUser;
use crate::error::AppResult;
use crate::models::SaleWithItem;
use crate::state::AppState;
use crate::utils::{ValidatedJson, ValidatedQuery};

/// Sale routes, merged directly under `/api`
///
/// - `POST /sale`
/// - `GET /sales[?brand=X]`
/// - `GET /sales/today`
/// - `GET /sales/top5`
pub fn sale_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(make_sale))
        .routes(routes!(list_sales))
        .routes(routes!(todays_sales))
        .routes(routes!(top_sellers))
}

/// Sell units of an item, decrementing its stock
#[utoipa::path(
    post,
    path = "/sale",
    tag = SALES_TAG,
    request_body = SaleRequest,
    responses(
        (status = 200, description = "Sale recorded", body = SaleResponse),
        (status = 400, description = "Invalid input or insufficient stock", body = ErrorResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 404, description = "Item not found", body = ErrorResponse)
    ),
    security(("bearerAuth" = []))
)]
async fn make_sale(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ValidatedJson(payload): ValidatedJson<SaleRequest>,
) -> AppResult<Json<SaleResponse>> {
    tracing::debug!(user_id = user.user_id, item_id = payload.item_id, "Recording sale");

    let recorded = state
        .services
        .sales
        .make_sale(payload.item_id, payload.quantity, payload.customer)
        .await?;

    Ok(Json(recorded.into()))
}

/// Sales newest first, optionally restricted to one item brand
#[utoipa::path(
    get,
    path = "/sales",
    tag = SALES_TAG,
    params(BrandQuery),
    responses(
        (status = 200, description = "Sales with their items", body = Vec<SaleResponse>),
        (status = 401, description = "Not authenticated", body = ErrorResponse)
    ),
    security(("bearerAuth" = []))
)]
async fn list_sales(
    State(state): State<AppState>,
    ValidatedQuery(query): ValidatedQuery<BrandQuery>,
) -> AppResult<Json<Vec<SaleResponse>>> {
    let sales = match query.brand.as_deref() {
        Some(brand) => state.services.sales.by_brand(brand).await?,
        None => state.services.sales.all().await?,
    };

    Ok(Json(to_responses(sales)))
}

/// Sales made since local midnight, newest first
#[utoipa::path(
    get,
    path = "/sales/today",
    tag = SALES_TAG,
    responses(
        (status = 200, description = "Today's sales", body = Vec<SaleResponse>),
        (status = 401, description = "Not authenticated", body = ErrorResponse)
    ),
    security(("bearerAuth" = []))
)]
async fn todays_sales(State(state): State<AppState>) -> AppResult<Json<Vec<SaleResponse>>> {
    let sales = state.services.sales.today().await?;
    Ok(Json(to_responses(sales)))
}

/// Five best selling items of the trailing seven days
#[utoipa::path(
    get,
    path = "/sales/top5",
    tag = SALES_TAG,
    responses(
        (status = 200, description = "Best sellers by units sold", body = Vec<TopSellerResponse>),
        (status = 401, description = "Not authenticated", body = ErrorResponse)
    ),
    security(("bearerAuth" = []))
)]
async fn top_sellers(State(state): State<AppState>) -> AppResult<Json<Vec<TopSellerResponse>>> {
    let top = state.services.sales.top_sellers().await?;
    Ok(Json(top.into_iter().map(Into::into).collect()))
}

fn to_responses(sales: Vec<SaleWithItem>) -> Vec<SaleResponse> {
    sales.into_iter().map(Into::into).collect()
}
