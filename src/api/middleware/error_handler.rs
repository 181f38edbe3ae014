//! Error handler for converting AppError to HTTP responses.
//!
//! `AppError` renders itself as an `ErrorResponse`. The global error handler
//! middleware then stamps the request id on every error body and converts
//! plain-text error responses produced by axum itself (unknown route,
//! method not allowed) into the same JSON shape.

use axum::{
    Json,
    body::Body,
    extract::Request,
    http::{HeaderValue, StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde_json::json;

use super::RequestId;
use crate::api::dto::ErrorResponse;
use crate::error::AppError;

/// Largest plain-text error body read back when normalizing responses
const MAX_ERROR_BODY_BYTES: usize = 64 * 1024;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = error_to_status_code(&self);
        let body = error_to_body(&self);

        if status.is_server_error() {
            tracing::error!(code = %body.code, error = ?self, "Request failed");
        } else {
            tracing::debug!(code = %body.code, error = %self, "Request rejected");
        }

        let mut response = (status, Json(body.clone())).into_response();
        response.extensions_mut().insert(body);
        response
    }
}

/// Maps an AppError variant to its HTTP status code.
pub fn error_to_status_code(error: &AppError) -> StatusCode {
    match error {
        AppError::NotFound { .. } => StatusCode::NOT_FOUND,
        AppError::Duplicate { .. } => StatusCode::CONFLICT,
        AppError::Validation { .. }
        | AppError::ValidationErrors { .. }
        | AppError::InsufficientStock { .. }
        | AppError::BadRequest { .. } => StatusCode::BAD_REQUEST,
        AppError::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
        AppError::ExternalApi { .. } => StatusCode::BAD_GATEWAY,
        AppError::ConnectionPool { .. } => StatusCode::SERVICE_UNAVAILABLE,
        AppError::Database { .. } | AppError::Configuration { .. } | AppError::Internal { .. } => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

/// Builds the client-facing body. Server-side failures never expose their
/// source chain.
fn error_to_body(error: &AppError) -> ErrorResponse {
    match error {
        AppError::NotFound {
            entity,
            field,
            value,
        } => ErrorResponse::not_found_error(entity, field, value),
        AppError::Duplicate {
            entity,
            field,
            value,
        } => ErrorResponse::duplicate_error(entity, field, value),
        AppError::Validation { field, reason } => ErrorResponse::validation_error(field, reason),
        AppError::ValidationErrors { errors } => ErrorResponse::validation_errors(errors),
        AppError::InsufficientStock {
            item_id,
            requested,
            available,
        } => ErrorResponse::insufficient_stock(*item_id, *requested, *available),
        AppError::BadRequest { message } => ErrorResponse::new("BAD_REQUEST", message),
        AppError::Unauthorized { message } => ErrorResponse::new("UNAUTHORIZED", message),
        AppError::Database { .. } => {
            ErrorResponse::new("DATABASE_ERROR", "A database error occurred")
        }
        AppError::Configuration { key, .. } => {
            ErrorResponse::new("CONFIGURATION_ERROR", "Server is misconfigured")
                .with_details(json!({ "key": key }))
        }
        AppError::ConnectionPool { .. } => {
            ErrorResponse::new("SERVICE_UNAVAILABLE", "Database connection unavailable")
        }
        AppError::ExternalApi { provider, .. } => ErrorResponse::new(
            "EXTERNAL_API_ERROR",
            &format!("Upstream service '{}' failed", provider),
        ),
        AppError::Internal { .. } => {
            ErrorResponse::new("INTERNAL_ERROR", "An internal error occurred")
        }
    }
}

/// Gives every 4xx/5xx response the `ErrorResponse` JSON shape and the
/// request id of the request that produced it.
pub async fn global_error_handler(request: Request, next: Next) -> Response {
    let request_id = request.extensions().get::<RequestId>().map(|r| r.0.clone());

    let response = next.run(request).await;
    let status = response.status();
    if !status.is_client_error() && !status.is_server_error() {
        return response;
    }

    let (mut parts, body) = response.into_parts();

    let mut error_body = match parts.extensions.remove::<ErrorResponse>() {
        Some(rendered) => rendered,
        None if is_json(&parts.headers) => {
            // JSON produced elsewhere is passed through untouched
            return Response::from_parts(parts, body);
        }
        None => {
            let bytes = axum::body::to_bytes(body, MAX_ERROR_BODY_BYTES)
                .await
                .unwrap_or_default();
            let original = String::from_utf8_lossy(&bytes).trim().to_string();
            status_to_body(status, original)
        }
    };

    if let Some(id) = request_id.as_deref() {
        error_body = error_body.with_request_id(id);
    }

    let encoded = match serde_json::to_vec(&error_body) {
        Ok(encoded) => encoded,
        Err(e) => {
            tracing::error!(error = %e, "Failed to encode error response");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    parts.headers.remove(header::CONTENT_LENGTH);
    parts.headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );
    Response::from_parts(parts, Body::from(encoded))
}

fn is_json(headers: &axum::http::HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.contains("application/json"))
}

fn status_to_body(status: StatusCode, original: String) -> ErrorResponse {
    let (code, fallback) = match status {
        StatusCode::BAD_REQUEST => ("BAD_REQUEST", "Bad request"),
        StatusCode::UNAUTHORIZED => ("UNAUTHORIZED", "Authentication required"),
        StatusCode::NOT_FOUND => ("NOT_FOUND", "The requested resource was not found"),
        StatusCode::METHOD_NOT_ALLOWED => ("METHOD_NOT_ALLOWED", "Method not allowed"),
        StatusCode::UNSUPPORTED_MEDIA_TYPE => ("UNSUPPORTED_MEDIA_TYPE", "Unsupported media type"),
        StatusCode::PAYLOAD_TOO_LARGE => ("PAYLOAD_TOO_LARGE", "Request payload too large"),
        StatusCode::SERVICE_UNAVAILABLE => {
            ("SERVICE_UNAVAILABLE", "Service temporarily unavailable")
        }
        s if s.is_server_error() => {
            // Server error text may carry internals
            return ErrorResponse::new("INTERNAL_SERVER_ERROR", "An internal server error occurred");
        }
        _ => ("UNKNOWN_ERROR", "An unknown error occurred"),
    };

    if original.is_empty() {
        ErrorResponse::new(code, fallback)
    } else {
        ErrorResponse::new(code, &original)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Router, middleware, routing::get};
    use tower::ServiceExt;

    fn not_found() -> AppError {
        AppError::NotFound {
            entity: "item".to_string(),
            field: "id".to_string(),
            value: "42".to_string(),
        }
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(error_to_status_code(&not_found()), StatusCode::NOT_FOUND);
        assert_eq!(
            error_to_status_code(&AppError::InsufficientStock {
                item_id: 1,
                requested: 5,
                available: 2
            }),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            error_to_status_code(&AppError::Duplicate {
                entity: "users".to_string(),
                field: "username".to_string(),
                value: "alice".to_string()
            }),
            StatusCode::CONFLICT
        );
        assert_eq!(
            error_to_status_code(&AppError::Unauthorized {
                message: "no".to_string()
            }),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            error_to_status_code(&AppError::ExternalApi {
                provider: "cloudflare".to_string(),
                message: "down".to_string(),
                source: None
            }),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            error_to_status_code(&AppError::ConnectionPool {
                source: anyhow::anyhow!("timeout")
            }),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[tokio::test]
    async fn test_internal_errors_do_not_leak_sources() {
        let response = AppError::Database {
            operation: "insert items".to_string(),
            source: anyhow::anyhow!("password authentication failed for user admin"),
        }
        .into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(response).await;
        assert_eq!(body["code"], "DATABASE_ERROR");
        assert!(!body.to_string().contains("password authentication"));
    }

    #[tokio::test]
    async fn test_insufficient_stock_body() {
        let response = AppError::InsufficientStock {
            item_id: 3,
            requested: 5,
            available: 2,
        }
        .into_response();

        let body = body_json(response).await;
        assert_eq!(body["code"], "INSUFFICIENT_STOCK");
        assert_eq!(body["details"]["available"], 2);
    }

    fn app() -> Router {
        Router::new()
            .route("/missing", get(|| async { Err::<(), _>(not_found()) }))
            .route("/ok", get(|| async { "fine" }))
            .layer(middleware::from_fn(global_error_handler))
            .layer(middleware::from_fn(
                |mut request: Request, next: Next| async move {
                    request
                        .extensions_mut()
                        .insert(RequestId("req-123".to_string()));
                    next.run(request).await
                },
            ))
    }

    #[tokio::test]
    async fn test_app_errors_get_request_id() {
        let response = app()
            .oneshot(Request::get("/missing").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = body_json(response).await;
        assert_eq!(body["code"], "NOT_FOUND");
        assert_eq!(body["requestId"], "req-123");
    }

    #[tokio::test]
    async fn test_unknown_route_becomes_json() {
        let response = app()
            .oneshot(Request::get("/nowhere").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(is_json(response.headers()));
        let body = body_json(response).await;
        assert_eq!(body["code"], "NOT_FOUND");
        assert_eq!(body["requestId"], "req-123");
    }

    #[tokio::test]
    async fn test_success_passes_through() {
        let response = app()
            .oneshot(Request::get("/ok").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&bytes[..], b"fine");
    }
}
