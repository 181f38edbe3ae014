//! Sale repository: the stock-decrementing sale transaction and sales reports.

use diesel::dsl::sum;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};
use jiff_diesel::ToDiesel;

use crate::db::AsyncDbPool;
use crate::error::{AppError, AppResult};
use crate::models::{Item, NewSale, Sale, SaleQuote, SaleWithItem, TopSeller};
use crate::schema::{items, sales};

#[derive(Clone)]
pub struct SaleRepository {
    pool: AsyncDbPool,
}

impl SaleRepository {
    pub fn new(pool: AsyncDbPool) -> Self {
        Self { pool }
    }

    /// Sells `quantity` units of an item.
    ///
    /// Runs in one transaction: the item row is locked, the quote is checked
    /// against the locked stock, stock is decremented with a guarded update
    /// and the sale row is inserted. Any failure rolls back both writes.
    ///
    /// # Returns
    /// The new sale together with the item as it is after the sale
    ///
    /// # Errors
    /// - `AppError::NotFound` if no item has `item_id`
    /// - `AppError::InsufficientStock` if the stock is lower than `quantity`
    pub async fn make_sale(
        &self,
        item_id: i32,
        quantity: i32,
        customer: String,
    ) -> AppResult<SaleWithItem> {
        let mut conn = self.pool.get().await?;

        conn.transaction::<_, AppError, _>(|conn| {
            async move {
                let item = items::table
                    .find(item_id)
                    .select(Item::as_select())
                    .for_update()
                    .first(conn)
                    .await
                    .optional()?
                    .ok_or_else(|| AppError::NotFound {
                        entity: "item".to_string(),
                        field: "id".to_string(),
                        value: item_id.to_string(),
                    })?;

                let quote = SaleQuote::compute(item.id, item.stock, item.price, quantity)?;
                let now = jiff::Timestamp::now();

                let updated = diesel::update(
                    items::table
                        .filter(items::id.eq(item_id))
                        .filter(items::stock.ge(quote.quantity)),
                )
                .set((
                    items::stock.eq(items::stock - quote.quantity),
                    items::updated_at.eq(now.to_diesel()),
                ))
                .returning(Item::as_returning())
                .get_result(conn)
                .await
                .optional()?
                .ok_or(AppError::InsufficientStock {
                    item_id,
                    requested: quantity,
                    available: item.stock,
                })?;

                let sale = diesel::insert_into(sales::table)
                    .values(&NewSale {
                        item_id,
                        sold_at: now.to_diesel(),
                        quantity: quote.quantity,
                        total_price: quote.total_price,
                        customer,
                    })
                    .returning(Sale::as_returning())
                    .get_result(conn)
                    .await?;

                Ok(SaleWithItem {
                    sale,
                    item: updated,
                })
            }
            .scope_boxed()
        })
        .await
    }

    /// Sales at or after `since`, newest first
    pub async fn list_since(&self, since: jiff::Timestamp) -> AppResult<Vec<SaleWithItem>> {
        let mut conn = self.pool.get().await?;

        let rows = sales::table
            .inner_join(items::table)
            .filter(sales::sold_at.ge(since.to_diesel()))
            .select((Sale::as_select(), Item::as_select()))
            .order((sales::sold_at.desc(), sales::id.desc()))
            .load::<(Sale, Item)>(&mut conn)
            .await?;

        Ok(rows.into_iter().map(SaleWithItem::from).collect())
    }

    /// Sales of items with exactly `brand`, newest first
    pub async fn list_by_brand(&self, brand: &str) -> AppResult<Vec<SaleWithItem>> {
        let mut conn = self.pool.get().await?;

        let rows = sales::table
            .inner_join(items::table)
            .filter(items::brand.eq(brand))
            .select((Sale::as_select(), Item::as_select()))
            .order((sales::sold_at.desc(), sales::id.desc()))
            .load::<(Sale, Item)>(&mut conn)
            .await?;

        Ok(rows.into_iter().map(SaleWithItem::from).collect())
    }

    /// Every recorded sale, newest first
    pub async fn list_all(&self) -> AppResult<Vec<SaleWithItem>> {
        let mut conn = self.pool.get().await?;

        let rows = sales::table
            .inner_join(items::table)
            .select((Sale::as_select(), Item::as_select()))
            .order((sales::sold_at.desc(), sales::id.desc()))
            .load::<(Sale, Item)>(&mut conn)
            .await?;

        Ok(rows.into_iter().map(SaleWithItem::from).collect())
    }

    /// Items with the highest summed quantity sold at or after `since`.
    ///
    /// Ties on the summed quantity are broken by ascending item id.
    pub async fn top_sellers(
        &self,
        since: jiff::Timestamp,
        limit: i64,
    ) -> AppResult<Vec<TopSeller>> {
        let mut conn = self.pool.get().await?;

        let rows = sales::table
            .inner_join(items::table)
            .filter(sales::sold_at.ge(since.to_diesel()))
            .group_by((items::id, items::name, items::part_number))
            .select((
                items::id,
                items::name,
                items::part_number,
                sum(sales::quantity),
            ))
            .order((sum(sales::quantity).desc(), items::id.asc()))
            .limit(limit)
            .load::<(i32, String, String, Option<i64>)>(&mut conn)
            .await?;

        Ok(rows.into_iter().map(TopSeller::from).collect())
    }
}
