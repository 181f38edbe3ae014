//! HTTP surface: request/response shapes, handlers, middleware and the
//! router that ties them to `AppState`.

mod doc;
pub mod dto;
pub mod handlers;
pub mod middleware;
pub mod routes;
