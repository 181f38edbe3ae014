//! Repository layer for data access operations.

mod item_repo;
mod sale_repo;
mod user_repo;

pub use item_repo::ItemRepository;
pub use sale_repo::SaleRepository;
pub use user_repo::UserRepository;

use crate::db::AsyncDbPool;

/// Aggregates all repositories for convenient access.
///
/// Since `AsyncDbPool` uses `Arc` internally, cloning is cheap.
#[derive(Clone)]
pub struct Repositories {
    pub users: UserRepository,
    pub items: ItemRepository,
    pub sales: SaleRepository,
}

impl Repositories {
    pub fn new(pool: AsyncDbPool) -> Self {
        Self {
            users: UserRepository::new(pool.clone()),
            items: ItemRepository::new(pool.clone()),
            sales: SaleRepository::new(pool),
        }
    }
}
