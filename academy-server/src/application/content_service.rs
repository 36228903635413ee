use tracing::debug;

use crate::data::post_repository::PostRepository;
use crate::domain::error::DomainError;
use crate::domain::image::ImagePayload;
use crate::domain::post::{NewPost, Post, PostFilter, PostPatch};

pub(crate) struct ContentService<R: PostRepository> {
    repo: R,
}

impl<R: PostRepository> ContentService<R> {
    pub(crate) fn new(repo: R) -> Self {
        Self { repo }
    }

    pub(crate) async fn list_posts(&self) -> Result<Vec<Post>, DomainError> {
        self.repo.list_posts().await
    }

    pub(crate) async fn get_post(&self, id: &str) -> Result<Option<Post>, DomainError> {
        self.repo.get_post(id).await
    }

    /// An attached image is validated and inlined before anything is stored.
    pub(crate) async fn create_post(
        &self,
        mut input: NewPost,
        image: Option<ImagePayload>,
    ) -> Result<Post, DomainError> {
        if let Some(image) = image {
            input.image_url = image.into_data_url()?;
        }

        let post = self.repo.create_post(input).await?;
        debug!(post_id = %post.id, "post created");
        Ok(post)
    }

    /// Without a new image the stored `image_url` is kept unless the patch
    /// sets one explicitly.
    pub(crate) async fn update_post(
        &self,
        id: &str,
        mut patch: PostPatch,
        image: Option<ImagePayload>,
    ) -> Result<Option<Post>, DomainError> {
        if let Some(image) = image {
            patch.image_url = Some(image.into_data_url()?);
        }

        let updated = self.repo.update_post(id, patch).await?;
        if updated.is_some() {
            debug!(post_id = %id, "post updated");
        }
        Ok(updated)
    }

    pub(crate) async fn toggle_published(&self, id: &str) -> Result<Option<Post>, DomainError> {
        let updated = self.repo.toggle_published(id).await?;
        if let Some(post) = &updated {
            debug!(post_id = %id, published = post.published, "post publish state toggled");
        }
        Ok(updated)
    }

    /// Deleting an unknown id succeeds; the flag tells whether anything was removed.
    pub(crate) async fn delete_post(&self, id: &str) -> Result<bool, DomainError> {
        let deleted = self.repo.delete_post(id).await?;
        debug!(post_id = %id, deleted, "post delete requested");
        Ok(deleted)
    }

    pub(crate) async fn list_published(&self) -> Result<Vec<Post>, DomainError> {
        self.find_posts(&PostFilter {
            published_only: true,
            ..PostFilter::default()
        })
        .await
    }

    pub(crate) async fn posts_by_tag(&self, tag: &str) -> Result<Vec<Post>, DomainError> {
        self.find_posts(&PostFilter {
            tag: Some(tag.to_string()),
            ..PostFilter::default()
        })
        .await
    }

    pub(crate) async fn search_posts(&self, query: &str) -> Result<Vec<Post>, DomainError> {
        self.find_posts(&PostFilter {
            query: Some(query.to_string()),
            ..PostFilter::default()
        })
        .await
    }

    pub(crate) async fn find_posts(&self, filter: &PostFilter) -> Result<Vec<Post>, DomainError> {
        let mut posts = self.repo.list_posts().await?;
        posts.retain(|post| filter.matches(post));
        Ok(posts)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use chrono::Utc;

    use super::ContentService;
    use crate::data::post_repository::PostRepository;
    use crate::data::repositories::slot_post_repository::SlotPostRepository;
    use crate::data::stores::memory::MemoryKvStore;
    use crate::domain::error::DomainError;
    use crate::domain::image::{ImagePayload, MAX_IMAGE_BYTES};
    use crate::domain::post::{NewPost, Post, PostPatch};

    #[derive(Clone, Default)]
    struct FakePostRepo {
        created_input: Arc<Mutex<Option<NewPost>>>,
        update_call: Arc<Mutex<Option<(String, PostPatch)>>>,
    }

    #[async_trait]
    impl PostRepository for FakePostRepo {
        async fn list_posts(&self) -> Result<Vec<Post>, DomainError> {
            Ok(Vec::new())
        }

        async fn get_post(&self, _id: &str) -> Result<Option<Post>, DomainError> {
            Ok(None)
        }

        async fn create_post(&self, input: NewPost) -> Result<Post, DomainError> {
            *self
                .created_input
                .lock()
                .expect("created_input mutex poisoned") = Some(input.clone());
            Ok(Post::create("fake".to_string(), input, Utc::now()))
        }

        async fn update_post(
            &self,
            id: &str,
            patch: PostPatch,
        ) -> Result<Option<Post>, DomainError> {
            *self.update_call.lock().expect("update_call mutex poisoned") =
                Some((id.to_string(), patch));
            Ok(None)
        }

        async fn toggle_published(&self, _id: &str) -> Result<Option<Post>, DomainError> {
            Ok(None)
        }

        async fn delete_post(&self, _id: &str) -> Result<bool, DomainError> {
            Ok(false)
        }
    }

    fn memory_service() -> ContentService<SlotPostRepository> {
        let store = Arc::new(MemoryKvStore::new());
        ContentService::new(SlotPostRepository::new(store, "blog_posts"))
    }

    #[tokio::test]
    async fn create_inlines_image_before_repo_call() {
        let repo = FakePostRepo::default();
        let service = ContentService::new(repo.clone());

        let image = ImagePayload::new(Some("a.png".to_string()), "image/png", vec![1, 2, 3]);
        service
            .create_post(sample_input("A", &["x"]), Some(image))
            .await
            .expect("create must succeed");

        let input = repo
            .created_input
            .lock()
            .expect("created_input mutex poisoned")
            .clone()
            .expect("repo input must be captured");
        assert_eq!(input.image_url, "data:image/png;base64,AQID");
    }

    #[tokio::test]
    async fn create_with_invalid_image_never_reaches_repo() {
        let repo = FakePostRepo::default();
        let service = ContentService::new(repo.clone());

        let image = ImagePayload::new(Some("notes.txt".to_string()), "text/plain", b"hi".to_vec());
        let err = service
            .create_post(sample_input("A", &[]), Some(image))
            .await
            .expect_err("text payload must be rejected");

        assert!(matches!(err, DomainError::Validation { field: "image", .. }));
        assert!(
            repo.created_input
                .lock()
                .expect("created_input mutex poisoned")
                .is_none()
        );
    }

    #[tokio::test]
    async fn update_passes_inlined_image_in_patch() {
        let repo = FakePostRepo::default();
        let service = ContentService::new(repo.clone());

        let image = ImagePayload::new(None, "image/gif", vec![0]);
        service
            .update_post("p1", PostPatch::default(), Some(image))
            .await
            .expect("update must succeed");

        let (id, patch) = repo
            .update_call
            .lock()
            .expect("update_call mutex poisoned")
            .clone()
            .expect("update call must be captured");
        assert_eq!(id, "p1");
        assert_eq!(patch.image_url.as_deref(), Some("data:image/gif;base64,AA=="));
    }

    #[tokio::test]
    async fn create_then_get_returns_input_fields() {
        let service = memory_service();
        let input = sample_input("A", &["x", "y"]);

        let created = service
            .create_post(input.clone(), None)
            .await
            .expect("create must succeed");
        assert_eq!(created.created_at, created.updated_at);

        let fetched = service
            .get_post(&created.id)
            .await
            .expect("get must succeed")
            .expect("post must exist");
        assert_eq!(fetched, created);
        assert_eq!(fetched.title, input.title);
        assert_eq!(fetched.content, input.content);
        assert_eq!(fetched.excerpt, input.excerpt);
        assert_eq!(fetched.author, input.author);
        assert_eq!(fetched.published, input.published);
        assert_eq!(fetched.image_url, input.image_url);
        assert_eq!(fetched.tags, input.tags);
    }

    #[tokio::test]
    async fn empty_update_only_changes_updated_at() {
        let service = memory_service();
        let created = service
            .create_post(sample_input("A", &["x"]), None)
            .await
            .expect("create must succeed");

        let updated = service
            .update_post(&created.id, PostPatch::default(), None)
            .await
            .expect("update must succeed")
            .expect("post must exist");

        assert!(updated.updated_at >= created.updated_at);
        assert_eq!(
            Post {
                updated_at: created.updated_at,
                ..updated
            },
            created
        );
    }

    #[tokio::test]
    async fn update_without_image_keeps_existing_image_url() {
        let service = memory_service();
        let image = ImagePayload::new(None, "image/png", vec![9]);
        let created = service
            .create_post(sample_input("A", &[]), Some(image))
            .await
            .expect("create must succeed");

        let updated = service
            .update_post(
                &created.id,
                PostPatch {
                    title: Some("B".to_string()),
                    ..PostPatch::default()
                },
                None,
            )
            .await
            .expect("update must succeed")
            .expect("post must exist");

        assert_eq!(updated.title, "B");
        assert_eq!(updated.image_url, created.image_url);
    }

    #[tokio::test]
    async fn update_missing_post_returns_none() {
        let service = memory_service();
        let result = service
            .update_post("missing", PostPatch::default(), None)
            .await
            .expect("update must succeed");
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn rejected_update_image_leaves_post_untouched() {
        let service = memory_service();
        let created = service
            .create_post(sample_input("A", &[]), None)
            .await
            .expect("create must succeed");

        let oversized = ImagePayload::new(None, "image/png", vec![0; MAX_IMAGE_BYTES + 1]);
        let err = service
            .update_post(
                &created.id,
                PostPatch {
                    title: Some("B".to_string()),
                    ..PostPatch::default()
                },
                Some(oversized),
            )
            .await
            .expect_err("oversized image must be rejected");
        assert!(matches!(err, DomainError::Validation { .. }));

        let stored = service
            .get_post(&created.id)
            .await
            .expect("get must succeed")
            .expect("post must exist");
        assert_eq!(stored, created);
    }

    #[tokio::test]
    async fn delete_then_get_returns_none() {
        let service = memory_service();
        let created = service
            .create_post(sample_input("A", &[]), None)
            .await
            .expect("create must succeed");

        assert!(service.delete_post(&created.id).await.expect("delete"));
        assert!(service.get_post(&created.id).await.expect("get").is_none());
        assert!(!service.delete_post(&created.id).await.expect("delete again"));
    }

    #[tokio::test]
    async fn double_toggle_restores_published_flag() {
        let service = memory_service();
        let created = service
            .create_post(sample_input("A", &["x"]), None)
            .await
            .expect("create must succeed");

        let once = service
            .toggle_published(&created.id)
            .await
            .expect("toggle must succeed")
            .expect("post must exist");
        assert!(once.published);

        let twice = service
            .toggle_published(&created.id)
            .await
            .expect("toggle must succeed")
            .expect("post must exist");
        assert_eq!(twice.published, created.published);
        assert_eq!(
            Post {
                updated_at: created.updated_at,
                ..twice
            },
            created
        );
    }

    #[tokio::test]
    async fn toggle_missing_post_returns_none() {
        let service = memory_service();
        let result = service
            .toggle_published("missing")
            .await
            .expect("toggle must succeed");
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn list_stays_newest_first_across_creates_and_updates() {
        let service = memory_service();
        let first = service
            .create_post(sample_input("first", &[]), None)
            .await
            .expect("create");
        let second = service
            .create_post(sample_input("second", &[]), None)
            .await
            .expect("create");
        service
            .update_post(&first.id, PostPatch::default(), None)
            .await
            .expect("update");
        service
            .create_post(sample_input("third", &[]), None)
            .await
            .expect("create");
        service
            .toggle_published(&second.id)
            .await
            .expect("toggle");

        let posts = service.list_posts().await.expect("list must succeed");
        assert_eq!(posts.len(), 3);
        assert!(
            posts
                .windows(2)
                .all(|pair| pair[0].created_at >= pair[1].created_at)
        );
    }

    #[tokio::test]
    async fn rejected_payloads_leave_collection_unchanged() {
        let service = memory_service();
        service
            .create_post(sample_input("A", &[]), None)
            .await
            .expect("create must succeed");
        let before = service.list_posts().await.expect("list").len();

        let text = ImagePayload::new(Some("a.txt".to_string()), "text/plain", b"x".to_vec());
        assert!(
            service
                .create_post(sample_input("B", &[]), Some(text))
                .await
                .is_err()
        );

        let huge = ImagePayload::new(None, "image/jpeg", vec![0; MAX_IMAGE_BYTES + 1]);
        assert!(
            service
                .create_post(sample_input("C", &[]), Some(huge))
                .await
                .is_err()
        );

        let after = service.list_posts().await.expect("list").len();
        assert_eq!(before, after);
    }

    #[tokio::test]
    async fn search_matches_tags_and_excludes_unknown_terms() {
        let service = memory_service();
        let created = service
            .create_post(sample_input("A", &["x", "y"]), None)
            .await
            .expect("create must succeed");

        let hits = service.search_posts("x").await.expect("search");
        assert!(hits.iter().any(|post| post.id == created.id));

        let misses = service.search_posts("z").await.expect("search");
        assert!(misses.iter().all(|post| post.id != created.id));
    }

    #[tokio::test]
    async fn published_and_tag_views_filter_in_list_order() {
        let service = memory_service();
        let draft = service
            .create_post(sample_input("draft", &["Events"]), None)
            .await
            .expect("create");
        let mut live_input = sample_input("live", &["news"]);
        live_input.published = true;
        let live = service.create_post(live_input, None).await.expect("create");

        let published = service.list_published().await.expect("published view");
        assert_eq!(
            published.iter().map(|p| p.id.as_str()).collect::<Vec<_>>(),
            vec![live.id.as_str()]
        );

        let tagged = service.posts_by_tag("EVENT").await.expect("tag view");
        assert_eq!(
            tagged.iter().map(|p| p.id.as_str()).collect::<Vec<_>>(),
            vec![draft.id.as_str()]
        );
    }

    fn sample_input(title: &str, tags: &[&str]) -> NewPost {
        NewPost {
            title: title.to_string(),
            content: "Lecture schedule for the spring term".to_string(),
            excerpt: "Spring term".to_string(),
            author: "Dean's office".to_string(),
            published: false,
            image_url: String::new(),
            tags: tags.iter().map(|tag| tag.to_string()).collect(),
        }
    }
}
