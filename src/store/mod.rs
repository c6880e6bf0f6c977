//! Credential store: users and their weather history.
//!
//! Every write is a single statement. Username uniqueness and the cascade from
//! a user to its history rows live in the schema, not here.

use async_trait::async_trait;
use time::Date;

use crate::{
    auth::repo_types::User,
    weather::model::{WeatherData, WeatherRecord},
};

#[cfg(test)]
pub mod memory;
pub mod postgres;

pub use postgres::PgCredentialStore;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("record not found")]
    NotFound,
    #[error("username already taken")]
    Duplicate,
    #[error("database error: {0}")]
    Backend(#[from] sqlx::Error),
}

#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn create_user(
        &self,
        username: &str,
        password_hash: &str,
        date_of_birth: Date,
    ) -> Result<i64, StoreError>;

    async fn get_user_by_username(&self, username: &str) -> Result<User, StoreError>;

    async fn insert_weather_record(
        &self,
        data: &WeatherData,
        owner_id: i64,
    ) -> Result<i64, StoreError>;

    async fn get_weather_record(&self, id: i64) -> Result<WeatherRecord, StoreError>;

    /// Insertion order; empty when the user has no history.
    async fn list_weather_records(&self, owner_id: i64) -> Result<Vec<WeatherRecord>, StoreError>;

    /// Replaces every weather field of `record.id`, which must belong to
    /// `record.user_id`.
    async fn update_weather_record(&self, record: &WeatherRecord) -> Result<(), StoreError>;

    /// `Ok(0)` when there was nothing to delete.
    async fn delete_weather_record(&self, id: i64, owner_id: i64) -> Result<u64, StoreError>;

    async fn bulk_delete_weather_records(&self, owner_id: i64) -> Result<u64, StoreError>;

    /// Cheap liveness probe.
    async fn ping(&self) -> Result<(), StoreError>;
}
