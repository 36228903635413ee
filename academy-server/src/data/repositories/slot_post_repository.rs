use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;
use tracing::{debug, error};
use uuid::Uuid;

use crate::data::kv_store::KvStore;
use crate::data::post_repository::PostRepository;
use crate::domain::error::DomainError;
use crate::domain::post::{NewPost, Post, PostPatch, sort_newest_first};

/// Keeps the whole post collection as one JSON array under a single key.
///
/// Each mutation reads the collection, changes it in memory and overwrites the
/// slot. `write_lock` serializes those cycles inside this process; separate
/// processes sharing a backend still race and the last write wins.
pub(crate) struct SlotPostRepository {
    store: Arc<dyn KvStore>,
    key: String,
    write_lock: Mutex<()>,
}

impl SlotPostRepository {
    pub(crate) fn new(store: Arc<dyn KvStore>, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
            write_lock: Mutex::new(()),
        }
    }

    async fn load(&self) -> Result<Vec<Post>, DomainError> {
        let Some(raw) = self.store.get(&self.key).await.map_err(|err| {
            error!(slot = %self.key, error = %err, "failed to read post slot");
            DomainError::from(err)
        })?
        else {
            return Ok(Vec::new());
        };

        let mut posts = parse_posts(&raw).map_err(|err| {
            error!(slot = %self.key, error = %err, "post slot holds unreadable data");
            err
        })?;
        sort_newest_first(&mut posts);
        Ok(posts)
    }

    async fn save(&self, posts: &[Post]) -> Result<(), DomainError> {
        let raw = serde_json::to_string(posts)
            .map_err(|err| DomainError::Unexpected(format!("failed to serialize posts: {err}")))?;

        self.store.set(&self.key, &raw).await.map_err(|err| {
            error!(slot = %self.key, error = %err, "failed to write post slot");
            DomainError::from(err)
        })?;
        debug!(slot = %self.key, count = posts.len(), "post slot written");
        Ok(())
    }
}

fn parse_posts(raw: &str) -> Result<Vec<Post>, DomainError> {
    let posts = serde_json::from_str::<Vec<Post>>(raw)
        .map_err(|err| DomainError::CorruptData(err.to_string()))?;

    if let Some(post) = posts.iter().find(|post| !post.has_consistent_timestamps()) {
        return Err(DomainError::CorruptData(format!(
            "post {} has updatedAt before createdAt",
            post.id
        )));
    }
    Ok(posts)
}

#[async_trait]
impl PostRepository for SlotPostRepository {
    async fn list_posts(&self) -> Result<Vec<Post>, DomainError> {
        self.load().await
    }

    async fn get_post(&self, id: &str) -> Result<Option<Post>, DomainError> {
        Ok(self.load().await?.into_iter().find(|post| post.id == id))
    }

    async fn create_post(&self, input: NewPost) -> Result<Post, DomainError> {
        let _guard = self.write_lock.lock().await;
        let mut posts = self.load().await?;

        let post = Post::create(Uuid::new_v4().to_string(), input, Utc::now());
        posts.insert(0, post.clone());
        self.save(&posts).await?;

        Ok(post)
    }

    async fn update_post(&self, id: &str, patch: PostPatch) -> Result<Option<Post>, DomainError> {
        let _guard = self.write_lock.lock().await;
        let mut posts = self.load().await?;

        let Some(post) = posts.iter_mut().find(|post| post.id == id) else {
            return Ok(None);
        };
        post.apply(patch, Utc::now());
        let updated = post.clone();
        self.save(&posts).await?;

        Ok(Some(updated))
    }

    async fn toggle_published(&self, id: &str) -> Result<Option<Post>, DomainError> {
        let _guard = self.write_lock.lock().await;
        let mut posts = self.load().await?;

        let Some(post) = posts.iter_mut().find(|post| post.id == id) else {
            return Ok(None);
        };
        post.toggle_published(Utc::now());
        let updated = post.clone();
        self.save(&posts).await?;

        Ok(Some(updated))
    }

    async fn delete_post(&self, id: &str) -> Result<bool, DomainError> {
        let _guard = self.write_lock.lock().await;
        let mut posts = self.load().await?;

        let before = posts.len();
        posts.retain(|post| post.id != id);
        if posts.len() == before {
            return Ok(false);
        }
        self.save(&posts).await?;

        Ok(true)
    }
}
