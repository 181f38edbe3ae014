//! Service layer for business logic operations.
//!
//! Services encapsulate business logic and coordinate between
//! repositories, external collaborators and handlers.

mod auth_service;
mod inventory_service;
pub mod sales_service;

pub use auth_service::AuthService;
pub use inventory_service::InventoryService;
pub use sales_service::SalesService;

use std::sync::Arc;

use crate::config::JwtConfig;
use crate::external::images::ImageUploader;
use crate::repositories::Repositories;

/// Aggregates all services for convenient access.
///
/// Cloning is cheap since underlying pools use `Arc` internally.
#[derive(Clone)]
pub struct Services {
    pub auth: AuthService,
    pub inventory: InventoryService,
    pub sales: SalesService,
}

impl Services {
    pub fn new(repos: Repositories, jwt: JwtConfig, uploader: Arc<dyn ImageUploader>) -> Self {
        Self {
            auth: AuthService::new(repos.users, jwt),
            inventory: InventoryService::new(repos.items, uploader),
            sales: SalesService::new(repos.sales),
        }
    }
}
