use diesel::prelude::*;
use jiff_diesel::Timestamp;

/// User model for reading from database
/// Derives Queryable for SELECT operations and Selectable for type-safe column selection
#[derive(Debug, Queryable, Selectable, Clone)]
#[diesel(table_name = crate::schema::users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct User {
    pub id: i32,
    pub username: String,
    /// Argon2 PHC string, never the plaintext password
    pub password: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// NewUser model for inserting new records
/// The password field must already be hashed
#[derive(Debug, Insertable, Clone)]
#[diesel(table_name = crate::schema::users)]
pub struct NewUser {
    pub username: String,
    pub password: String,
}
