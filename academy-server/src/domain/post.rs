use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Post {
    pub(crate) id: String,
    pub(crate) title: String,
    pub(crate) content: String,
    pub(crate) excerpt: String,
    pub(crate) author: String,
    pub(crate) published: bool,
    #[serde(default)]
    pub(crate) image_url: String,
    #[serde(default)]
    pub(crate) tags: Vec<String>,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct NewPost {
    pub(crate) title: String,
    pub(crate) content: String,
    pub(crate) excerpt: String,
    pub(crate) author: String,
    pub(crate) published: bool,
    pub(crate) image_url: String,
    pub(crate) tags: Vec<String>,
}

/// Partial field set for a shallow merge. `None` keeps the stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct PostPatch {
    pub(crate) title: Option<String>,
    pub(crate) content: Option<String>,
    pub(crate) excerpt: Option<String>,
    pub(crate) author: Option<String>,
    pub(crate) published: Option<bool>,
    pub(crate) image_url: Option<String>,
    pub(crate) tags: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct PostFilter {
    pub(crate) published_only: bool,
    pub(crate) tag: Option<String>,
    pub(crate) query: Option<String>,
}

impl Post {
    pub(crate) fn create(id: String, input: NewPost, now: DateTime<Utc>) -> Self {
        Self {
            id,
            title: input.title,
            content: input.content,
            excerpt: input.excerpt,
            author: input.author,
            published: input.published,
            image_url: input.image_url,
            tags: input.tags,
            created_at: now,
            updated_at: now,
        }
    }

    pub(crate) fn apply(&mut self, patch: PostPatch, now: DateTime<Utc>) {
        let PostPatch {
            title,
            content,
            excerpt,
            author,
            published,
            image_url,
            tags,
        } = patch;

        if let Some(title) = title {
            self.title = title;
        }
        if let Some(content) = content {
            self.content = content;
        }
        if let Some(excerpt) = excerpt {
            self.excerpt = excerpt;
        }
        if let Some(author) = author {
            self.author = author;
        }
        if let Some(published) = published {
            self.published = published;
        }
        if let Some(image_url) = image_url {
            self.image_url = image_url;
        }
        if let Some(tags) = tags {
            self.tags = tags;
        }
        self.touch(now);
    }

    pub(crate) fn toggle_published(&mut self, now: DateTime<Utc>) {
        self.published = !self.published;
        self.touch(now);
    }

    // a clock that moved backwards must not break updated_at >= created_at
    fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now.max(self.created_at);
    }

    pub(crate) fn has_consistent_timestamps(&self) -> bool {
        self.updated_at >= self.created_at
    }

    pub(crate) fn matches_tag(&self, tag: &str) -> bool {
        let needle = tag.to_lowercase();
        self.tags
            .iter()
            .any(|candidate| candidate.to_lowercase().contains(&needle))
    }

    pub(crate) fn matches_query(&self, query: &str) -> bool {
        let needle = query.to_lowercase();
        self.title.to_lowercase().contains(&needle)
            || self.excerpt.to_lowercase().contains(&needle)
            || self.content.to_lowercase().contains(&needle)
            || self.matches_tag(query)
    }
}

impl PostFilter {
    pub(crate) fn matches(&self, post: &Post) -> bool {
        (!self.published_only || post.published)
            && self.tag.as_deref().is_none_or(|tag| post.matches_tag(tag))
            && self
                .query
                .as_deref()
                .is_none_or(|query| post.matches_query(query))
    }
}

pub(crate) fn sort_newest_first(posts: &mut [Post]) {
    posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use super::{NewPost, Post, PostFilter, PostPatch, sort_newest_first};

    #[test]
    fn create_sets_equal_timestamps() {
        let now = Utc::now();
        let post = Post::create("p1".to_string(), sample_input(), now);

        assert_eq!(post.id, "p1");
        assert_eq!(post.created_at, post.updated_at);
        assert_eq!(post.title, "Open day");
        assert_eq!(post.tags, vec!["events".to_string(), "Admissions".to_string()]);
    }

    #[test]
    fn empty_patch_only_refreshes_updated_at() {
        let created = Utc::now();
        let mut post = Post::create("p1".to_string(), sample_input(), created);
        let before = post.clone();

        let later = created + Duration::seconds(5);
        post.apply(PostPatch::default(), later);

        assert_eq!(post.updated_at, later);
        assert_eq!(
            Post {
                updated_at: before.updated_at,
                ..post
            },
            before
        );
    }

    #[test]
    fn patch_merges_only_supplied_fields() {
        let now = Utc::now();
        let mut post = Post::create("p1".to_string(), sample_input(), now);

        post.apply(
            PostPatch {
                title: Some("Open day 2026".to_string()),
                tags: Some(vec![]),
                ..PostPatch::default()
            },
            now,
        );

        assert_eq!(post.title, "Open day 2026");
        assert!(post.tags.is_empty());
        assert_eq!(post.content, "Doors open at ten.");
        assert_eq!(post.image_url, "https://cdn.example.com/hall.jpg");
    }

    #[test]
    fn touch_never_moves_updated_at_before_created_at() {
        let created = Utc::now();
        let mut post = Post::create("p1".to_string(), sample_input(), created);

        post.toggle_published(created - Duration::seconds(30));

        assert!(post.has_consistent_timestamps());
        assert_eq!(post.updated_at, created);
    }

    #[test]
    fn tag_match_is_case_insensitive_substring() {
        let post = Post::create("p1".to_string(), sample_input(), Utc::now());

        assert!(post.matches_tag("ADMISS"));
        assert!(post.matches_tag("event"));
        assert!(!post.matches_tag("sports"));
    }

    #[test]
    fn query_matches_title_excerpt_content_and_tags() {
        let post = Post::create("p1".to_string(), sample_input(), Utc::now());

        assert!(post.matches_query("open DAY"));
        assert!(post.matches_query("campus tour"));
        assert!(post.matches_query("at ten"));
        assert!(post.matches_query("admissions"));
        assert!(!post.matches_query("graduation"));
    }

    #[test]
    fn filter_combines_published_tag_and_query() {
        let now = Utc::now();
        let mut published = Post::create("p1".to_string(), sample_input(), now);
        published.published = true;
        let draft = Post::create("p2".to_string(), sample_input(), now);

        let filter = PostFilter {
            published_only: true,
            tag: Some("events".to_string()),
            query: Some("open".to_string()),
        };

        assert!(filter.matches(&published));
        assert!(!filter.matches(&draft));
        assert!(PostFilter::default().matches(&draft));
    }

    #[test]
    fn sort_newest_first_orders_by_created_at_desc() {
        let now = Utc::now();
        let mut posts = vec![
            Post::create("old".to_string(), sample_input(), now - Duration::hours(2)),
            Post::create("new".to_string(), sample_input(), now),
            Post::create("mid".to_string(), sample_input(), now - Duration::hours(1)),
        ];

        sort_newest_first(&mut posts);

        let ids: Vec<&str> = posts.iter().map(|post| post.id.as_str()).collect();
        assert_eq!(ids, vec!["new", "mid", "old"]);
    }

    #[test]
    fn post_serializes_with_camel_case_keys() {
        let post = Post::create("p1".to_string(), sample_input(), Utc::now());
        let value = serde_json::to_value(&post).expect("post must serialize");

        assert!(value.get("imageUrl").is_some());
        assert!(value.get("createdAt").is_some());
        assert!(value.get("updatedAt").is_some());
        assert!(value.get("image_url").is_none());
    }

    fn sample_input() -> NewPost {
        NewPost {
            title: "Open day".to_string(),
            content: "Doors open at ten.".to_string(),
            excerpt: "Campus tour and talks".to_string(),
            author: "Admissions office".to_string(),
            published: false,
            image_url: "https://cdn.example.com/hall.jpg".to_string(),
            tags: vec!["events".to_string(), "Admissions".to_string()],
        }
    }
}
