//! Shared helpers for credentials and request extraction.

pub mod form;
pub mod jwt;
pub mod password;
pub mod validate;

pub use form::JsonOrMultipart;
pub use validate::{ValidatedJson, ValidatedQuery};
