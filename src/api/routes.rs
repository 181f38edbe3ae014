//! Router assembly: routes, OpenAPI docs and the middleware stack.

use std::time::Duration;

use axum::extract::DefaultBodyLimit;
use axum::http::HeaderValue;
use axum::{Router, middleware};
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use utoipa::OpenApi;
use utoipa_axum::router::OpenApiRouter;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::doc::ApiDoc;
use crate::api::handlers;
use crate::api::middleware::{
    auth_middleware, global_error_handler, logging_middleware, request_id_middleware,
};
use crate::config::{CorsConfig, Settings};
use crate::state::AppState;

pub const SWAGGER_UI_PATH: &str = "/swagger-ui";
pub const OPENAPI_JSON_PATH: &str = "/api-docs/openapi.json";

/// Builds the application router.
///
/// # Middleware order
/// Layers run outermost first:
/// 1. request id
/// 2. logging
/// 3. error shaping
/// 4. CORS, compression, body limit
/// 5. bearer authentication, on protected routes only
pub fn create_router(state: AppState, settings: &Settings) -> Router {
    let (router, openapi) = api_router(state.clone()).split_for_parts();

    router
        .merge(SwaggerUi::new(SWAGGER_UI_PATH).url(OPENAPI_JSON_PATH, openapi))
        .layer(DefaultBodyLimit::max(settings.server.body_limit))
        .layer(CompressionLayer::new())
        .layer(cors_layer(&settings.cors))
        .layer(middleware::from_fn(global_error_handler))
        .layer(middleware::from_fn(logging_middleware))
        .layer(middleware::from_fn(request_id_middleware))
        .with_state(state)
}

/// Route tree with its OpenAPI description, before global layers
fn api_router(state: AppState) -> OpenApiRouter<AppState> {
    let protected = OpenApiRouter::new()
        .nest("/items", handlers::items::item_routes())
        .merge(handlers::sales::sale_routes())
        .route_layer(middleware::from_fn_with_state(state, auth_middleware));

    let api = OpenApiRouter::new()
        .merge(handlers::auth::auth_routes())
        .merge(protected);

    OpenApiRouter::with_openapi(ApiDoc::openapi())
        .nest("/api", api)
        .merge(handlers::health::health_routes())
}

fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods(Any)
        .allow_headers(Any)
        .max_age(Duration::from_secs(config.max_age));

    if config.allows_any_origin() {
        return layer.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin.trim()) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    layer.allow_origin(origins)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::lazy_pool;
    use crate::external::images::DisabledImageUploader;
    use crate::utils::jwt;
    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use std::sync::Arc;
    use tower::ServiceExt;

    fn settings() -> Settings {
        let mut settings = Settings::default();
        settings.jwt.secret = "router-test-secret-router-test-secret".to_string();
        settings
    }

    fn state(settings: &Settings) -> AppState {
        AppState::new(
            lazy_pool(),
            settings.jwt.clone(),
            Arc::new(DisabledImageUploader),
        )
    }

    fn app() -> Router {
        let settings = settings();
        create_router(state(&settings), &settings)
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_protected_routes_require_token() {
        for (method, uri) in [
            ("GET", "/api/items"),
            ("POST", "/api/items"),
            ("PATCH", "/api/items/1"),
            ("POST", "/api/sale"),
            ("GET", "/api/sales"),
            ("GET", "/api/sales/today"),
            ("GET", "/api/sales/top5"),
        ] {
            let response = app()
                .oneshot(Request::builder().method(method).uri(uri).body(Body::empty()).unwrap())
                .await
                .unwrap();

            assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{} {}", method, uri);
            assert!(response.headers().contains_key("x-request-id"));
            let body = body_json(response).await;
            assert_eq!(body["code"], "UNAUTHORIZED");
            assert!(body["requestId"].is_string());
        }
    }

    #[tokio::test]
    async fn test_invalid_token_is_unauthorized() {
        let response = app()
            .oneshot(
                Request::get("/api/items")
                    .header(header::AUTHORIZATION, "Bearer not-a-jwt")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_sale_validation_runs_before_database() {
        let token = jwt::generate_token(1, "clerk".to_string(), &settings().jwt.secret, 1).unwrap();

        let response = app()
            .oneshot(
                Request::post("/api/sale")
                    .header(header::AUTHORIZATION, format!("Bearer {}", token))
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"itemId":1,"quantity":0,"customer":"x"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_unparsable_item_id_is_bad_request() {
        let token = jwt::generate_token(1, "clerk".to_string(), &settings().jwt.secret, 1).unwrap();

        let response = app()
            .oneshot(
                Request::patch("/api/items/abc")
                    .header(header::AUTHORIZATION, format!("Bearer {}", token))
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from("{}"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["code"], "BAD_REQUEST");
    }

    #[tokio::test]
    async fn test_empty_brand_filter_is_not_rejected() {
        let token = jwt::generate_token(1, "clerk".to_string(), &settings().jwt.secret, 1).unwrap();

        for uri in ["/api/items?brand=", "/api/sales?brand="] {
            let response = app()
                .oneshot(
                    Request::get(uri)
                        .header(header::AUTHORIZATION, format!("Bearer {}", token))
                        .body(Body::empty())
                        .unwrap(),
                )
                .await
                .unwrap();

            // The test pool has no database, so a passing query fails later
            assert_ne!(response.status(), StatusCode::BAD_REQUEST, "{}", uri);
            let body = body_json(response).await;
            assert_ne!(body["code"], "VALIDATION_ERROR", "{}", uri);
        }
    }

    #[tokio::test]
    async fn test_register_validates_input() {
        let response = app()
            .oneshot(
                Request::post("/api/register")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"username":"ab","password":"123"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_liveness_is_public() {
        let response = app()
            .oneshot(Request::get("/health/live").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_unknown_route_is_json_not_found() {
        let response = app()
            .oneshot(Request::get("/api/nothing").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = body_json(response).await;
        assert_eq!(body["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_openapi_lists_routes_and_security() {
        let (_, doc) = api_router(state(&settings())).split_for_parts();
        let paths: Vec<&String> = doc.paths.paths.keys().collect();

        for expected in [
            "/api/register",
            "/api/login",
            "/api/sale",
            "/api/sales",
            "/api/sales/today",
            "/api/sales/top5",
            "/health",
        ] {
            assert!(
                paths.iter().any(|p| p.as_str() == expected),
                "missing {} in {:?}",
                expected,
                paths
            );
        }
        assert!(paths.iter().any(|p| p.starts_with("/api/items")));

        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("bearerAuth"));
    }
}
