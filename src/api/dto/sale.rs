//! Sale and sales report DTOs

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use super::{ItemResponse, rfc3339};
use crate::models::{ItemWithImages, SaleWithItem, TopSeller};

#[derive(Debug, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SaleRequest {
    #[schema(example = 3)]
    pub item_id: i32,
    #[validate(range(min = 1, message = "Quantity must be at least 1"))]
    #[schema(example = 2, minimum = 1)]
    pub quantity: i32,
    #[serde(default)]
    #[validate(length(max = 200, message = "Customer must be at most 200 characters"))]
    #[schema(example = "Garage Meier")]
    pub customer: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SaleResponse {
    pub id: i32,
    pub item_id: i32,
    #[schema(value_type = String, format = DateTime)]
    pub sold_at: String,
    pub quantity: i32,
    /// Unit price at the time of sale times quantity
    pub total_price: i64,
    pub customer: String,
    /// The item as of the sale, without images
    pub item: ItemResponse,
}

impl From<SaleWithItem> for SaleResponse {
    fn from(SaleWithItem { sale, item }: SaleWithItem) -> Self {
        Self {
            id: sale.id,
            item_id: sale.item_id,
            sold_at: rfc3339(sale.sold_at),
            quantity: sale.quantity,
            total_price: sale.total_price,
            customer: sale.customer,
            item: ItemWithImages {
                item,
                images: Vec::new(),
            }
            .into(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TopSellerResponse {
    pub item_id: i32,
    pub name: String,
    pub part_number: String,
    /// Units sold in the trailing seven days
    pub total_sold: i64,
}

impl From<TopSeller> for TopSellerResponse {
    fn from(top: TopSeller) -> Self {
        Self {
            item_id: top.item_id,
            name: top.name,
            part_number: top.part_number,
            total_sold: top.total_sold,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_sale_request_rejects_zero_quantity() {
        let request: SaleRequest =
            serde_json::from_value(json!({"itemId": 1, "quantity": 0, "customer": "x"})).unwrap();
        let errors = request.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("quantity"));
    }

    #[test]
    fn test_sale_request_customer_defaults_to_empty() {
        let request: SaleRequest =
            serde_json::from_value(json!({"itemId": 1, "quantity": 2})).unwrap();
        assert_eq!(request.customer, "");
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_top_seller_field_names() {
        let body = serde_json::to_value(TopSellerResponse::from(TopSeller {
            item_id: 2,
            name: "Spark plug".to_string(),
            part_number: "SP-9".to_string(),
            total_sold: 41,
        }))
        .unwrap();

        assert_eq!(
            body,
            json!({"itemId": 2, "name": "Spark plug", "partNumber": "SP-9", "totalSold": 41})
        );
    }
}
