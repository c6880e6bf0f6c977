use async_trait::async_trait;
use sqlx::PgPool;
use time::Date;

use super::{CredentialStore, StoreError};
use crate::{
    auth::repo_types::User,
    weather::{
        model::{WeatherData, WeatherRecord},
        repo,
    },
};

/// SQLSTATE for unique_violation.
const UNIQUE_VIOLATION: &str = "23505";

#[derive(Clone)]
pub struct PgCredentialStore {
    db: PgPool,
}

impl PgCredentialStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

fn classify(e: sqlx::Error) -> StoreError {
    if matches!(e, sqlx::Error::RowNotFound) {
        return StoreError::NotFound;
    }
    let unique_violation = e
        .as_database_error()
        .and_then(|db| db.code())
        .is_some_and(|code| code == UNIQUE_VIOLATION);
    if unique_violation {
        StoreError::Duplicate
    } else {
        StoreError::Backend(e)
    }
}

#[async_trait]
impl CredentialStore for PgCredentialStore {
    async fn create_user(
        &self,
        username: &str,
        password_hash: &str,
        date_of_birth: Date,
    ) -> Result<i64, StoreError> {
        User::create(&self.db, username, password_hash, date_of_birth)
            .await
            .map_err(classify)
    }

    async fn get_user_by_username(&self, username: &str) -> Result<User, StoreError> {
        User::find_by_username(&self.db, username)
            .await
            .map_err(classify)?
            .ok_or(StoreError::NotFound)
    }

    async fn insert_weather_record(
        &self,
        data: &WeatherData,
        owner_id: i64,
    ) -> Result<i64, StoreError> {
        repo::insert(&self.db, data, owner_id).await.map_err(classify)
    }

    async fn get_weather_record(&self, id: i64) -> Result<WeatherRecord, StoreError> {
        repo::get(&self.db, id)
            .await
            .map_err(classify)?
            .ok_or(StoreError::NotFound)
    }

    async fn list_weather_records(&self, owner_id: i64) -> Result<Vec<WeatherRecord>, StoreError> {
        repo::list_by_user(&self.db, owner_id)
            .await
            .map_err(classify)
    }

    async fn update_weather_record(&self, record: &WeatherRecord) -> Result<(), StoreError> {
        match repo::update(&self.db, record).await.map_err(classify)? {
            0 => Err(StoreError::NotFound),
            _ => Ok(()),
        }
    }

    async fn delete_weather_record(&self, id: i64, owner_id: i64) -> Result<u64, StoreError> {
        repo::delete(&self.db, id, owner_id).await.map_err(classify)
    }

    async fn bulk_delete_weather_records(&self, owner_id: i64) -> Result<u64, StoreError> {
        repo::delete_by_user(&self.db, owner_id)
            .await
            .map_err(classify)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1")
            .execute(&self.db)
            .await
            .map_err(classify)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use time::macros::date;

    use super::*;
    use crate::weather::model::{Condition, Metrics, SysInfo};

    fn city(name: &str) -> WeatherData {
        WeatherData {
            city_name: name.into(),
            weather: Condition {
                id: 803,
                main: "Clouds".into(),
                description: "broken clouds".into(),
                icon: "04d".into(),
            },
            main: Metrics {
                temp: 288.5,
                humidity: 72,
                pressure: 1012,
                ..Default::default()
            },
            sys: SysInfo {
                kind: 2,
                country: "GB".into(),
                ..Default::default()
            },
            dt: 1_700_000_000,
            ..Default::default()
        }
    }

    async fn store_with_user(pool: PgPool, username: &str) -> (PgCredentialStore, i64) {
        let store = PgCredentialStore::new(pool);
        let id = store
            .create_user(username, "hash", date!(2000-01-01))
            .await
            .expect("create user");
        (store, id)
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn duplicate_username_maps_to_duplicate(pool: PgPool) {
        let (store, _) = store_with_user(pool, "a@b.com").await;
        let err = store
            .create_user("a@b.com", "other", date!(1990-05-15))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Duplicate));

        let user = store.get_user_by_username("a@b.com").await.unwrap();
        assert_eq!(user.password, "hash");
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn unknown_username_is_not_found(pool: PgPool) {
        let store = PgCredentialStore::new(pool);
        let err = store.get_user_by_username("ghost@b.com").await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound));
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn list_is_empty_then_in_insertion_order(pool: PgPool) {
        let (store, owner) = store_with_user(pool, "a@b.com").await;
        assert!(store.list_weather_records(owner).await.unwrap().is_empty());

        let first = store.insert_weather_record(&city("London"), owner).await.unwrap();
        let second = store.insert_weather_record(&city("Oslo"), owner).await.unwrap();

        let records = store.list_weather_records(owner).await.unwrap();
        let ids: Vec<i64> = records.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![first, second]);
        assert_eq!(records[0].data, city("London"));
        assert_eq!(records[1].user_id, owner);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn delete_unknown_id_affects_nothing(pool: PgPool) {
        let (store, owner) = store_with_user(pool, "a@b.com").await;
        assert_eq!(store.delete_weather_record(999_999, owner).await.unwrap(), 0);
        assert_eq!(store.bulk_delete_weather_records(owner).await.unwrap(), 0);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn update_and_delete_are_owner_scoped(pool: PgPool) {
        let (store, owner) = store_with_user(pool, "a@b.com").await;
        let intruder = store
            .create_user("c@d.com", "hash", date!(2000-01-01))
            .await
            .unwrap();
        let id = store.insert_weather_record(&city("London"), owner).await.unwrap();

        let mut record = store.get_weather_record(id).await.unwrap();
        record.data.city_name = "Paris".into();
        record.user_id = intruder;
        let err = store.update_weather_record(&record).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound));
        assert_eq!(store.delete_weather_record(id, intruder).await.unwrap(), 0);

        record.user_id = owner;
        store.update_weather_record(&record).await.unwrap();
        let stored = store.get_weather_record(id).await.unwrap();
        assert_eq!(stored.data.city_name, "Paris");
        assert_eq!(stored.data.sys, city("London").sys);

        assert_eq!(store.delete_weather_record(id, owner).await.unwrap(), 1);
        assert!(matches!(
            store.get_weather_record(id).await.unwrap_err(),
            StoreError::NotFound
        ));
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn deleting_user_cascades_to_history(pool: PgPool) {
        let (store, owner) = store_with_user(pool.clone(), "a@b.com").await;
        let id = store.insert_weather_record(&city("London"), owner).await.unwrap();
        store.insert_weather_record(&city("Oslo"), owner).await.unwrap();

        sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(owner)
            .execute(&pool)
            .await
            .unwrap();

        assert!(store.list_weather_records(owner).await.unwrap().is_empty());
        assert!(matches!(
            store.get_weather_record(id).await.unwrap_err(),
            StoreError::NotFound
        ));
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn ping_reaches_the_database(pool: PgPool) {
        PgCredentialStore::new(pool).ping().await.unwrap();
    }

    #[test]
    fn row_not_found_is_not_found() {
        assert!(matches!(
            classify(sqlx::Error::RowNotFound),
            StoreError::NotFound
        ));
        assert!(matches!(
            classify(sqlx::Error::PoolTimedOut),
            StoreError::Backend(_)
        ));
    }
}
