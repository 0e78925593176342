use crate::domain::{DomainError, Post};
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

#[async_trait]
pub trait PostRepository: Send + Sync {
    async fn create(
        &self,
        title: &str,
        body: &str,
        created_at: DateTime<FixedOffset>,
    ) -> Result<Post, DomainError>;
    async fn list(&self) -> Result<Vec<Post>, DomainError>;
    async fn find_by_id(&self, id: i64) -> Result<Post, DomainError>;
    async fn update(&self, id: i64, title: &str, body: &str) -> Result<Post, DomainError>;
    async fn delete(&self, id: i64) -> Result<(), DomainError>;
}

pub struct SqlitePostRepository {
    pool: SqlitePool,
}

impl SqlitePostRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn post_from_row(row: &SqliteRow) -> Result<Post, sqlx::Error> {
    Ok(Post {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        body: row.try_get("body")?,
        created_at: row.try_get("created_at")?,
    })
}

#[async_trait]
impl PostRepository for SqlitePostRepository {
    async fn create(
        &self,
        title: &str,
        body: &str,
        created_at: DateTime<FixedOffset>,
    ) -> Result<Post, DomainError> {
        let row = sqlx::query(
            r#"
            INSERT INTO posts (title, body, created_at)
            VALUES (?, ?, ?)
            RETURNING id, title, body, created_at
            "#,
        )
        .bind(title)
        .bind(body)
        .bind(created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to create post: {}", e);
            DomainError::DatabaseError(e.to_string())
        })?;

        Ok(post_from_row(&row)?)
    }

    async fn list(&self) -> Result<Vec<Post>, DomainError> {
        let rows = sqlx::query(
            r#"
            SELECT id, title, body, created_at
            FROM posts
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let posts = rows
            .iter()
            .map(post_from_row)
            .collect::<Result<Vec<Post>, sqlx::Error>>()?;

        Ok(posts)
    }

    async fn find_by_id(&self, id: i64) -> Result<Post, DomainError> {
        let row = sqlx::query(
            r#"
            SELECT id, title, body, created_at
            FROM posts
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(post_from_row(&row)?),
            None => Err(DomainError::PostNotFound),
        }
    }

    async fn update(&self, id: i64, title: &str, body: &str) -> Result<Post, DomainError> {
        let row = sqlx::query(
            r#"
            UPDATE posts
            SET title = ?, body = ?
            WHERE id = ?
            RETURNING id, title, body, created_at
            "#,
        )
        .bind(title)
        .bind(body)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(post_from_row(&row)?),
            None => Err(DomainError::PostNotFound),
        }
    }

    async fn delete(&self, id: i64) -> Result<(), DomainError> {
        let result = sqlx::query("DELETE FROM posts WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            Err(DomainError::PostNotFound)
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::database::memory_pool;
    use chrono::{TimeZone, Utc};

    fn tokyo_now() -> DateTime<FixedOffset> {
        let tokyo = FixedOffset::east_opt(9 * 3600).unwrap();
        tokyo.from_utc_datetime(&Utc::now().naive_utc())
    }

    #[actix_rt::test]
    async fn create_then_list_returns_the_post() {
        let repo = SqlitePostRepository::new(memory_pool().await);
        let created_at = tokyo_now();

        let post = repo.create("Hi", "World", created_at).await.unwrap();
        let posts = repo.list().await.unwrap();

        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].id, post.id);
        assert_eq!(posts[0].title, "Hi");
        assert_eq!(posts[0].body, "World");
        assert_eq!(posts[0].created_at, created_at);
        assert_eq!(posts[0].created_at.offset().local_minus_utc(), 9 * 3600);
    }

    #[actix_rt::test]
    async fn update_keeps_id_and_timestamp() {
        let repo = SqlitePostRepository::new(memory_pool().await);
        let original = repo.create("Old", "old body", tokyo_now()).await.unwrap();

        let updated = repo.update(original.id, "New", "new body").await.unwrap();

        assert_eq!(updated.id, original.id);
        assert_eq!(updated.title, "New");
        assert_eq!(updated.body, "new body");
        assert_eq!(updated.created_at, original.created_at);
    }

    #[actix_rt::test]
    async fn missing_ids_are_reported() {
        let repo = SqlitePostRepository::new(memory_pool().await);

        assert!(matches!(
            repo.find_by_id(42).await,
            Err(DomainError::PostNotFound)
        ));
        assert!(matches!(
            repo.update(42, "t", "b").await,
            Err(DomainError::PostNotFound)
        ));
        assert!(matches!(
            repo.delete(42).await,
            Err(DomainError::PostNotFound)
        ));
    }

    #[actix_rt::test]
    async fn deleted_ids_are_not_reused() {
        let repo = SqlitePostRepository::new(memory_pool().await);
        let first = repo.create("a", "a", tokyo_now()).await.unwrap();

        repo.delete(first.id).await.unwrap();
        let second = repo.create("b", "b", tokyo_now()).await.unwrap();

        assert!(repo.list().await.unwrap().iter().all(|p| p.id != first.id));
        assert!(second.id > first.id);
    }
}
