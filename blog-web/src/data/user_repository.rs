use crate::domain::{DomainError, User};
use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create(&self, username: &str, password_hash: &str) -> Result<User, DomainError>;
    async fn find_by_username(&self, username: &str) -> Result<User, DomainError>;
    async fn find_by_id(&self, id: i64) -> Result<User, DomainError>;
}

pub struct SqliteUserRepository {
    pool: SqlitePool,
}

impl SqliteUserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn user_from_row(row: &SqliteRow) -> Result<User, sqlx::Error> {
    Ok(User {
        id: row.try_get("id")?,
        username: row.try_get("username")?,
        password_hash: row.try_get("password_hash")?,
    })
}

#[async_trait]
impl UserRepository for SqliteUserRepository {
    async fn create(&self, username: &str, password_hash: &str) -> Result<User, DomainError> {
        let row = sqlx::query(
            r#"
            INSERT INTO users (username, password_hash)
            VALUES (?, ?)
            RETURNING id, username, password_hash
            "#,
        )
        .bind(username)
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to create user: {}", e);
            match e.as_database_error() {
                Some(db_err) if db_err.is_unique_violation() => DomainError::UserAlreadyExists,
                _ => DomainError::DatabaseError(e.to_string()),
            }
        })?;

        Ok(user_from_row(&row)?)
    }

    async fn find_by_username(&self, username: &str) -> Result<User, DomainError> {
        let row = sqlx::query(
            r#"
            SELECT id, username, password_hash
            FROM users
            WHERE username = ?
            ORDER BY id
            LIMIT 1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(user_from_row(&row)?),
            None => Err(DomainError::UserNotFound),
        }
    }

    async fn find_by_id(&self, id: i64) -> Result<User, DomainError> {
        let row = sqlx::query(
            r#"
            SELECT id, username, password_hash
            FROM users
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(user_from_row(&row)?),
            None => Err(DomainError::UserNotFound),
        }
    }
}
