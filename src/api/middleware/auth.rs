//! Bearer token authentication middleware.

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};

use crate::error::{AppError, AppResult};
use crate::state::AppState;
use crate::utils::jwt::Claims;

/// Authenticated caller, inserted into request extensions by
/// `auth_middleware` and read in handlers with `Extension<AuthUser>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub user_id: i32,
    pub username: String,
}

impl TryFrom<Claims> for AuthUser {
    type Error = AppError;

    fn try_from(claims: Claims) -> AppResult<Self> {
        Ok(Self {
            user_id: claims.user_id()?,
            username: claims.username,
        })
    }
}

/// Requires `Authorization: Bearer <token>` with a valid, unexpired token.
///
/// # Errors
/// `AppError::Unauthorized` when the header is missing, malformed or the
/// token fails validation
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer_token(&request)?;
    let claims = state.services.auth.validate_token(token)?;
    let user = AuthUser::try_from(claims)?;

    tracing::debug!(user_id = user.user_id, "Request authenticated");
    request.extensions_mut().insert(user);

    Ok(next.run(request).await)
}

fn bearer_token(request: &Request) -> AppResult<&str> {
    let header_value = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized {
            message: "Missing authorization header".to_string(),
        })?;

    header_value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| AppError::Unauthorized {
            message: "Invalid authorization header format. Expected: Bearer <token>".to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    fn request_with(auth: Option<&str>) -> Request {
        let mut builder = Request::builder().uri("/api/items");
        if let Some(value) = auth {
            builder = builder.header(header::AUTHORIZATION, value);
        }
        builder.body(Body::empty()).unwrap()
    }

    #[test]
    fn test_auth_user_from_claims() {
        let claims = Claims {
            sub: "123".to_string(),
            username: "clerk".to_string(),
            iat: 0,
            exp: 9_999_999_999,
        };

        let user = AuthUser::try_from(claims).unwrap();
        assert_eq!(user.user_id, 123);
        assert_eq!(user.username, "clerk");
    }

    #[test]
    fn test_auth_user_rejects_non_numeric_subject() {
        let claims = Claims {
            sub: "abc".to_string(),
            username: "clerk".to_string(),
            iat: 0,
            exp: 9_999_999_999,
        };

        assert!(matches!(
            AuthUser::try_from(claims),
            Err(AppError::Unauthorized { .. })
        ));
    }

    #[test]
    fn test_bearer_token_extraction() {
        let request = request_with(Some("Bearer abc.def.ghi"));
        assert_eq!(bearer_token(&request).unwrap(), "abc.def.ghi");

        for bad in [None, Some("Basic dXNlcjpwYXNz"), Some("Bearer "), Some("abc")] {
            let request = request_with(bad);
            assert!(matches!(
                bearer_token(&request),
                Err(AppError::Unauthorized { .. })
            ));
        }
    }
}
