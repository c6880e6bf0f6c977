use std::sync::Mutex;

use async_trait::async_trait;
use time::{Date, OffsetDateTime};

use super::{CredentialStore, StoreError};
use crate::{
    auth::repo_types::User,
    weather::model::{WeatherData, WeatherRecord},
};

/// In-process store mirroring the schema's constraints, used by tests.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Tables>,
}

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    history: Vec<WeatherRecord>,
    next_user_id: i64,
    next_record_id: i64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Removes a user and, like `ON DELETE CASCADE`, its history.
    pub fn delete_user(&self, user_id: i64) -> u64 {
        let mut t = self.inner.lock().unwrap();
        let before = t.users.len();
        t.users.retain(|u| u.id != user_id);
        t.history.retain(|r| r.user_id != user_id);
        (before - t.users.len()) as u64
    }
}

#[async_trait]
impl CredentialStore for MemoryStore {
    async fn create_user(
        &self,
        username: &str,
        password_hash: &str,
        date_of_birth: Date,
    ) -> Result<i64, StoreError> {
        let mut t = self.inner.lock().unwrap();
        if t.users.iter().any(|u| u.username == username) {
            return Err(StoreError::Duplicate);
        }
        t.next_user_id += 1;
        let id = t.next_user_id;
        t.users.push(User {
            id,
            username: username.to_string(),
            password: password_hash.to_string(),
            date_of_birth,
            created_at: OffsetDateTime::now_utc(),
        });
        Ok(id)
    }

    async fn get_user_by_username(&self, username: &str) -> Result<User, StoreError> {
        let t = self.inner.lock().unwrap();
        t.users
            .iter()
            .find(|u| u.username == username)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn insert_weather_record(
        &self,
        data: &WeatherData,
        owner_id: i64,
    ) -> Result<i64, StoreError> {
        let mut t = self.inner.lock().unwrap();
        if !t.users.iter().any(|u| u.id == owner_id) {
            // foreign key violation
            return Err(StoreError::Backend(sqlx::Error::RowNotFound));
        }
        t.next_record_id += 1;
        let id = t.next_record_id;
        t.history.push(WeatherRecord {
            id,
            user_id: owner_id,
            data: data.clone(),
            created_at: OffsetDateTime::now_utc(),
        });
        Ok(id)
    }

    async fn get_weather_record(&self, id: i64) -> Result<WeatherRecord, StoreError> {
        let t = self.inner.lock().unwrap();
        t.history
            .iter()
            .find(|r| r.id == id)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn list_weather_records(&self, owner_id: i64) -> Result<Vec<WeatherRecord>, StoreError> {
        let t = self.inner.lock().unwrap();
        Ok(t.history
            .iter()
            .filter(|r| r.user_id == owner_id)
            .cloned()
            .collect())
    }

    async fn update_weather_record(&self, record: &WeatherRecord) -> Result<(), StoreError> {
        let mut t = self.inner.lock().unwrap();
        let row = t
            .history
            .iter_mut()
            .find(|r| r.id == record.id && r.user_id == record.user_id)
            .ok_or(StoreError::NotFound)?;
        row.data = record.data.clone();
        Ok(())
    }

    async fn delete_weather_record(&self, id: i64, owner_id: i64) -> Result<u64, StoreError> {
        let mut t = self.inner.lock().unwrap();
        let before = t.history.len();
        t.history.retain(|r| !(r.id == id && r.user_id == owner_id));
        Ok((before - t.history.len()) as u64)
    }

    async fn bulk_delete_weather_records(&self, owner_id: i64) -> Result<u64, StoreError> {
        let mut t = self.inner.lock().unwrap();
        let before = t.history.len();
        t.history.retain(|r| r.user_id != owner_id);
        Ok((before - t.history.len()) as u64)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    fn london() -> WeatherData {
        WeatherData {
            city_name: "London".into(),
            ..Default::default()
        }
    }

    async fn store_with_user() -> (MemoryStore, i64) {
        let store = MemoryStore::new();
        let id = store
            .create_user("a@b.com", "hash", date!(2000-01-01))
            .await
            .unwrap();
        (store, id)
    }

    #[tokio::test]
    async fn duplicate_username_is_rejected() {
        let (store, _) = store_with_user().await;
        let err = store
            .create_user("a@b.com", "other", date!(1999-01-01))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Duplicate));
    }

    #[tokio::test]
    async fn unknown_user_is_not_found() {
        let store = MemoryStore::new();
        assert!(matches!(
            store.get_user_by_username("x@y.com").await,
            Err(StoreError::NotFound)
        ));
    }

    #[tokio::test]
    async fn list_is_empty_then_in_insertion_order() {
        let (store, user) = store_with_user().await;
        assert!(store.list_weather_records(user).await.unwrap().is_empty());

        let first = store.insert_weather_record(&london(), user).await.unwrap();
        let mut paris = london();
        paris.city_name = "Paris".into();
        let second = store.insert_weather_record(&paris, user).await.unwrap();

        let ids: Vec<i64> = store
            .list_weather_records(user)
            .await
            .unwrap()
            .iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(ids, vec![first, second]);
    }

    #[tokio::test]
    async fn delete_unknown_id_affects_nothing() {
        let (store, user) = store_with_user().await;
        assert_eq!(store.delete_weather_record(999, user).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn deleting_user_cascades_to_history() {
        let (store, user) = store_with_user().await;
        let id = store.insert_weather_record(&london(), user).await.unwrap();
        assert_eq!(store.delete_user(user), 1);
        assert!(matches!(
            store.get_weather_record(id).await,
            Err(StoreError::NotFound)
        ));
    }
}
