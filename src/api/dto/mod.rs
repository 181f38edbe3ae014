//! Data Transfer Objects for API requests and responses.
//!
//! JSON field names are camelCase and timestamps are RFC 3339 strings.

mod auth;
mod error;
mod health;
mod item;
mod sale;

pub use auth::{LoginRequest, LoginResponse, RegisterRequest, UserResponse};
pub use error::ErrorResponse;
pub use health::{ComponentHealth, HealthResponse, HealthStatus};
pub use item::{BrandQuery, CreateItemRequest, ItemImageResponse, ItemResponse, UpdateItemRequest};
pub use sale::{SaleRequest, SaleResponse, TopSellerResponse};

fn rfc3339(timestamp: jiff_diesel::Timestamp) -> String {
    timestamp.to_jiff().to_string()
}
