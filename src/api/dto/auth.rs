//! Registration and login DTOs

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use super::rfc3339;
use crate::models::User;

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 3, max = 50, message = "Username must be between 3 and 50 characters"))]
    #[schema(example = "counter_clerk", min_length = 3, max_length = 50)]
    pub username: String,
    /// Plain text, hashed before storage
    #[validate(length(min = 6, max = 128, message = "Password must be between 6 and 128 characters"))]
    #[schema(example = "s3cret!", format = "password", min_length = 6, max_length = 128)]
    pub password: String,
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "Username cannot be empty"))]
    #[schema(example = "counter_clerk")]
    pub username: String,
    #[validate(length(min = 1, message = "Password cannot be empty"))]
    #[schema(example = "s3cret!", format = "password")]
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    /// HS256 bearer token
    #[schema(example = "eyJ0eXAiOiJKV1QiLCJhbGc...")]
    pub token: String,
}

/// Registered user, never carrying the password hash
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    #[schema(example = 1)]
    pub id: i32,
    #[schema(example = "counter_clerk")]
    pub username: String,
    #[schema(value_type = String, format = DateTime, example = "2025-03-10T09:15:00Z")]
    pub created_at: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            created_at: rfc3339(user.created_at),
        }
    }
}
