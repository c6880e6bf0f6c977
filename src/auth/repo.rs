use sqlx::PgPool;
use time::Date;

use crate::auth::repo_types::User;

impl User {
    /// Find a user by username.
    pub async fn find_by_username(db: &PgPool, username: &str) -> sqlx::Result<Option<User>> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, password, date_of_birth, created_at
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(db)
        .await
    }

    /// Insert a user with an already hashed password, returning its ID.
    pub async fn create(
        db: &PgPool,
        username: &str,
        password_hash: &str,
        date_of_birth: Date,
    ) -> sqlx::Result<i64> {
        let (id,) = sqlx::query_as::<_, (i64,)>(
            r#"
            INSERT INTO users (username, password, date_of_birth)
            VALUES ($1, $2, $3)
            RETURNING id
            "#,
        )
        .bind(username)
        .bind(password_hash)
        .bind(date_of_birth)
        .fetch_one(db)
        .await?;
        Ok(id)
    }
}
