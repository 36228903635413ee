use async_trait::async_trait;

use crate::domain::error::DomainError;
use crate::domain::post::{NewPost, Post, PostPatch};

#[async_trait]
pub(crate) trait PostRepository: Send + Sync {
    /// Whole collection, newest `created_at` first.
    async fn list_posts(&self) -> Result<Vec<Post>, DomainError>;
    async fn get_post(&self, id: &str) -> Result<Option<Post>, DomainError>;
    async fn create_post(&self, input: NewPost) -> Result<Post, DomainError>;
    async fn update_post(&self, id: &str, patch: PostPatch) -> Result<Option<Post>, DomainError>;
    async fn toggle_published(&self, id: &str) -> Result<Option<Post>, DomainError>;
    /// `Ok(false)` when no post had this id.
    async fn delete_post(&self, id: &str) -> Result<bool, DomainError>;
}
