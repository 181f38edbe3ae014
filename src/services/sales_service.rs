//! Sales service: recording sales and the sales reports.

use jiff::{SignedDuration, Timestamp, Zoned};

use crate::error::{AppError, AppResult};
use crate::models::{SaleWithItem, TopSeller};
use crate::repositories::SaleRepository;

/// Number of entries in the best seller report
pub const TOP_SELLERS_LIMIT: i64 = 5;

/// Length of the best seller window in days
pub const TOP_SELLERS_WINDOW_DAYS: i64 = 7;

#[derive(Clone)]
pub struct SalesService {
    sales: SaleRepository,
}

impl SalesService {
    pub fn new(sales: SaleRepository) -> Self {
        Self { sales }
    }

    /// Records a sale and decrements stock atomically.
    ///
    /// # Errors
    /// - `AppError::NotFound` for an unknown item
    /// - `AppError::InsufficientStock` when stock is lower than `quantity`
    pub async fn make_sale(
        &self,
        item_id: i32,
        quantity: i32,
        customer: String,
    ) -> AppResult<SaleWithItem> {
        let recorded = self.sales.make_sale(item_id, quantity, customer).await?;

        tracing::info!(
            sale_id = recorded.sale.id,
            item_id,
            quantity,
            total_price = recorded.sale.total_price,
            remaining_stock = recorded.item.stock,
            "Sale recorded"
        );
        Ok(recorded)
    }

    /// Sales since local midnight, newest first
    pub async fn today(&self) -> AppResult<Vec<SaleWithItem>> {
        let since = start_of_local_day(&Zoned::now())?;
        self.sales.list_since(since).await
    }

    pub async fn by_brand(&self, brand: &str) -> AppResult<Vec<SaleWithItem>> {
        self.sales.list_by_brand(brand).await
    }

    pub async fn all(&self) -> AppResult<Vec<SaleWithItem>> {
        self.sales.list_all().await
    }

    /// Best sellers of the trailing week
    pub async fn top_sellers(&self) -> AppResult<Vec<TopSeller>> {
        let since = window_start(Timestamp::now(), TOP_SELLERS_WINDOW_DAYS)?;
        self.sales.top_sellers(since, TOP_SELLERS_LIMIT).await
    }
}

/// Midnight of the day `now` falls on, in `now`'s time zone
pub fn start_of_local_day(now: &Zoned) -> AppResult<Timestamp> {
    now.start_of_day()
        .map(|midnight| midnight.timestamp())
        .map_err(time_error)
}

/// The instant exactly `days` days of 24 hours before `now`
pub fn window_start(now: Timestamp, days: i64) -> AppResult<Timestamp> {
    now.checked_sub(SignedDuration::from_hours(days * 24))
        .map_err(time_error)
}

fn time_error(error: jiff::Error) -> AppError {
    AppError::Internal {
        source: anyhow::Error::from(error),
    }
}
