use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

pub const AUTH_TAG: &str = "Auth";
pub const ITEMS_TAG: &str = "Items";
pub const SALES_TAG: &str = "Sales";
pub const HEALTH_TAG: &str = "Health";

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Warehouse",
        description = "Inventory, sales and sales report API for a parts warehouse",
    ),
    modifiers(&SecurityAddon),
    components(schemas(crate::api::dto::ErrorResponse)),
    tags(
        (name = AUTH_TAG, description = "Registration and login"),
        (name = ITEMS_TAG, description = "Stocked items and their images"),
        (name = SALES_TAG, description = "Sales and sales reports"),
        (name = HEALTH_TAG, description = "Health check endpoints"),
    )
)]
pub struct ApiDoc;

pub struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearerAuth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("Token returned by POST /api/login"))
                        .build(),
                ),
            )
        }
    }
}
