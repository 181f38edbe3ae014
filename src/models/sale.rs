use diesel::prelude::*;
use jiff_diesel::Timestamp;

use crate::error::{AppError, AppResult};
use crate::models::Item;

/// Immutable record of stock leaving inventory
#[derive(Debug, Queryable, Selectable, Identifiable, Associations, Clone)]
#[diesel(belongs_to(Item))]
#[diesel(table_name = crate::schema::sales)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Sale {
    pub id: i32,
    pub item_id: i32,
    pub sold_at: Timestamp,
    pub quantity: i32,
    /// Fixed at creation from the item price of that moment
    pub total_price: i64,
    pub customer: String,
}

#[derive(Debug, Insertable, Clone)]
#[diesel(table_name = crate::schema::sales)]
pub struct NewSale {
    pub item_id: i32,
    pub sold_at: Timestamp,
    pub quantity: i32,
    pub total_price: i64,
    pub customer: String,
}

/// Sale joined with the item it was made against
#[derive(Debug, Clone)]
pub struct SaleWithItem {
    pub sale: Sale,
    pub item: Item,
}

/// Aggregated quantity sold for one item over a reporting window
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopSeller {
    pub item_id: i32,
    pub name: String,
    pub part_number: String,
    pub total_sold: i64,
}

/// Outcome of checking a requested sale against the current stock level.
///
/// Computed from a locked row inside the sale transaction, before any write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaleQuote {
    pub quantity: i32,
    pub total_price: i64,
    pub remaining_stock: i32,
}

impl SaleQuote {
    /// Checks that `quantity` units can be sold from `stock` at unit `price`.
    ///
    /// # Errors
    /// - `AppError::Validation` if quantity is not positive or the total overflows
    /// - `AppError::InsufficientStock` if stock is lower than quantity
    pub fn compute(item_id: i32, stock: i32, price: i64, quantity: i32) -> AppResult<Self> {
        if quantity <= 0 {
            return Err(AppError::Validation {
                field: "quantity".to_string(),
                reason: "Quantity must be at least 1".to_string(),
            });
        }

        if stock < quantity {
            return Err(AppError::InsufficientStock {
                item_id,
                requested: quantity,
                available: stock,
            });
        }

        let total_price = price
            .checked_mul(i64::from(quantity))
            .ok_or_else(|| AppError::Validation {
                field: "quantity".to_string(),
                reason: "Total price is out of range".to_string(),
            })?;

        Ok(Self {
            quantity,
            total_price,
            remaining_stock: stock - quantity,
        })
    }
}

impl From<(Sale, Item)> for SaleWithItem {
    fn from((sale, item): (Sale, Item)) -> Self {
        Self { sale, item }
    }
}

impl From<(i32, String, String, Option<i64>)> for TopSeller {
    fn from((item_id, name, part_number, total_sold): (i32, String, String, Option<i64>)) -> Self {
        Self {
            item_id,
            name,
            part_number,
            total_sold: total_sold.unwrap_or(0),
        }
    }
}
