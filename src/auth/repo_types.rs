use serde::Serialize;
use sqlx::FromRow;
use time::{Date, OffsetDateTime};

time::serde::format_description!(iso_date, Date, "[year]-[month]-[day]");

/// User record in the database.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct User {
    pub id: i64,                    // assigned by the store
    pub username: String,           // email, unique
    #[serde(skip_serializing)]
    pub password: String,           // Argon2 hash, not exposed in JSON
    #[serde(with = "iso_date")]
    pub date_of_birth: Date,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime, // creation timestamp
}
