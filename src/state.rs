//! Application state for Axum web framework.
//!
//! Contains shared services and resources that are accessible
//! across all request handlers.

use std::sync::Arc;

use crate::config::JwtConfig;
use crate::db::AsyncDbPool;
use crate::external::images::ImageUploader;
use crate::repositories::Repositories;
use crate::services::Services;

/// Application state containing all shared services and resources.
///
/// Cloning is cheap since both Services and AsyncDbPool use Arc internally.
#[derive(Clone)]
pub struct AppState {
    pub services: Services,
    /// Direct pool access for health probes
    pub db_pool: AsyncDbPool,
}

impl AppState {
    /// Wires repositories and services on top of `pool`.
    ///
    /// # Example
    /// ```ignore
    /// let pool = establish_async_connection_pool(&settings.database).await?;
    /// let uploader = build_uploader(&settings.images);
    /// let state = AppState::new(pool, settings.jwt.clone(), uploader);
    /// ```
    pub fn new(pool: AsyncDbPool, jwt: JwtConfig, uploader: Arc<dyn ImageUploader>) -> Self {
        let repos = Repositories::new(pool.clone());
        let services = Services::new(repos, jwt, uploader);
        Self {
            services,
            db_pool: pool,
        }
    }
}
