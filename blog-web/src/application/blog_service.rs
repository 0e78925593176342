use crate::data::post_repository::PostRepository;
use crate::domain::post::{PostForm, BODY_MAX_CHARS, TITLE_MAX_CHARS};
use crate::domain::{DomainError, Post};
use chrono::{FixedOffset, Utc};
use std::sync::Arc;

pub struct BlogService {
    post_repo: Arc<dyn PostRepository + Send + Sync>,
    offset: FixedOffset,
}

impl BlogService {
    /// `offset` is the fixed timezone that creation timestamps are recorded in.
    pub fn new(post_repo: Arc<dyn PostRepository + Send + Sync>, offset: FixedOffset) -> Self {
        Self { post_repo, offset }
    }

    pub async fn create_post(&self, form: &PostForm) -> Result<Post, DomainError> {
        validate(form)?;

        let created_at = Utc::now().with_timezone(&self.offset);
        let post = self
            .post_repo
            .create(&form.title, &form.body, created_at)
            .await?;

        tracing::info!("Post created: id={}", post.id);

        Ok(post)
    }

    pub async fn list_posts(&self) -> Result<Vec<Post>, DomainError> {
        self.post_repo.list().await
    }

    pub async fn get_post(&self, id: i64) -> Result<Post, DomainError> {
        self.post_repo.find_by_id(id).await
    }

    /// A missing post is reported before the form is validated.
    pub async fn update_post(&self, id: i64, form: &PostForm) -> Result<Post, DomainError> {
        self.post_repo.find_by_id(id).await?;
        validate(form)?;

        let post = self.post_repo.update(id, &form.title, &form.body).await?;

        tracing::info!("Post updated: id={}", id);

        Ok(post)
    }

    pub async fn delete_post(&self, id: i64) -> Result<(), DomainError> {
        self.post_repo.delete(id).await?;

        tracing::info!("Post deleted: id={}", id);

        Ok(())
    }
}

fn validate(form: &PostForm) -> Result<(), DomainError> {
    if form.title.trim().is_empty() {
        return Err(DomainError::ValidationError(
            "Title cannot be empty".to_string(),
        ));
    }
    if form.title.chars().count() > TITLE_MAX_CHARS {
        return Err(DomainError::ValidationError(format!(
            "Title cannot be longer than {} characters",
            TITLE_MAX_CHARS
        )));
    }
    if form.body.trim().is_empty() {
        return Err(DomainError::ValidationError(
            "Body cannot be empty".to_string(),
        ));
    }
    if form.body.chars().count() > BODY_MAX_CHARS {
        return Err(DomainError::ValidationError(format!(
            "Body cannot be longer than {} characters",
            BODY_MAX_CHARS
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::post_repository::SqlitePostRepository;
    use crate::infrastructure::database::memory_pool;

    async fn service() -> BlogService {
        let repo = Arc::new(SqlitePostRepository::new(memory_pool().await));
        BlogService::new(repo, FixedOffset::east_opt(9 * 3600).unwrap())
    }

    fn form(title: &str, body: &str) -> PostForm {
        PostForm {
            title: title.to_string(),
            body: body.to_string(),
        }
    }

    #[actix_rt::test]
    async fn created_posts_get_distinct_ids_and_fixed_offset() {
        let service = service().await;

        let first = service.create_post(&form("Hi", "World")).await.unwrap();
        let second = service.create_post(&form("Again", "More")).await.unwrap();

        assert_ne!(first.id, second.id);
        assert_eq!(first.created_at.offset().local_minus_utc(), 9 * 3600);
        let titles: Vec<_> = service
            .list_posts()
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.title)
            .collect();
        assert_eq!(titles, vec!["Hi", "Again"]);
    }

    #[actix_rt::test]
    async fn update_changes_only_title_and_body() {
        let service = service().await;
        let original = service.create_post(&form("Hi", "World")).await.unwrap();

        service
            .update_post(original.id, &form("Hello", "Everyone"))
            .await
            .unwrap();
        let stored = service.get_post(original.id).await.unwrap();

        assert_eq!(stored.id, original.id);
        assert_eq!(stored.title, "Hello");
        assert_eq!(stored.body, "Everyone");
        assert_eq!(stored.created_at, original.created_at);
    }

    #[actix_rt::test]
    async fn updating_a_missing_post_is_not_found_even_with_a_bad_form() {
        let service = service().await;

        assert!(matches!(
            service.update_post(42, &form("", "")).await,
            Err(DomainError::PostNotFound)
        ));
        assert!(matches!(
            service.update_post(42, &form("Hi", "World")).await,
            Err(DomainError::PostNotFound)
        ));
    }

    #[actix_rt::test]
    async fn deleted_post_disappears_from_listing() {
        let service = service().await;
        let post = service.create_post(&form("Hi", "World")).await.unwrap();

        service.delete_post(post.id).await.unwrap();

        assert!(service.list_posts().await.unwrap().is_empty());
        assert!(matches!(
            service.delete_post(post.id).await,
            Err(DomainError::PostNotFound)
        ));
    }

    #[actix_rt::test]
    async fn invalid_forms_are_rejected_before_storage() {
        let service = service().await;

        for bad in [
            form("", "body"),
            form("   ", "body"),
            form("title", ""),
            form(&"t".repeat(TITLE_MAX_CHARS + 1), "body"),
            form("title", &"b".repeat(BODY_MAX_CHARS + 1)),
        ] {
            assert!(matches!(
                service.create_post(&bad).await,
                Err(DomainError::ValidationError(_))
            ));
        }
        assert!(service.list_posts().await.unwrap().is_empty());
    }

    #[actix_rt::test]
    async fn limits_count_characters_not_bytes() {
        let service = service().await;
        let title = "あ".repeat(TITLE_MAX_CHARS);

        let post = service.create_post(&form(&title, "本文")).await.unwrap();

        assert_eq!(post.title, title);
    }
}
