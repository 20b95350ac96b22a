#![allow(dead_code)]

use std::cmp::Reverse;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use inkpost::application::pages::BlogPageService;
use inkpost::application::repos::{
    CommentsRepo, PostOrder, PostQuery, PostsRepo, RepoError, TagQuery, TagsRepo,
};
use inkpost::domain::entities::{AuthorRecord, CommentRecord, PostRecord, PostTagLink, TagRecord};
use inkpost::domain::tags::normalize_tag_title;
use time::{Duration, OffsetDateTime, macros::datetime};
use uuid::Uuid;

pub const EPOCH: OffsetDateTime = datetime!(2021-01-29 21:31 UTC);

/// In-memory blog store used to drive the page assemblers.
#[derive(Default)]
pub struct MemoryBlog {
    posts: Vec<PostRecord>,
    tags: Vec<TagRecord>,
    likes: BTreeSet<(Uuid, Uuid)>,
    post_tags: BTreeSet<(Uuid, Uuid)>,
    comments: Vec<CommentRecord>,
    failing: bool,
}

impl MemoryBlog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every read fails with a persistence error.
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    pub fn author(&self, username: &str) -> AuthorRecord {
        AuthorRecord {
            id: Uuid::new_v4(),
            username: username.to_string(),
        }
    }

    /// Adds a post published `minutes` after [`EPOCH`].
    pub fn post(&mut self, author: &AuthorRecord, slug: &str, title: &str, minutes: i64) -> Uuid {
        let id = Uuid::new_v4();
        self.posts.push(PostRecord {
            id,
            slug: slug.to_string(),
            title: title.to_string(),
            text: format!("Body of {title}"),
            image: None,
            published_at: EPOCH + Duration::minutes(minutes),
            author: author.clone(),
        });
        id
    }

    pub fn set_text(&mut self, post_id: Uuid, text: &str) {
        if let Some(post) = self.posts.iter_mut().find(|post| post.id == post_id) {
            post.text = text.to_string();
        }
    }

    pub fn set_image(&mut self, post_id: Uuid, image: &str) {
        if let Some(post) = self.posts.iter_mut().find(|post| post.id == post_id) {
            post.image = Some(image.to_string());
        }
    }

    pub fn tag(&mut self, raw_title: &str) -> TagRecord {
        let tag = TagRecord {
            id: Uuid::new_v4(),
            title: normalize_tag_title(raw_title).expect("valid tag title"),
        };
        self.tags.push(tag.clone());
        tag
    }

    pub fn tag_post(&mut self, post_id: Uuid, tag: &TagRecord) {
        self.post_tags.insert((post_id, tag.id));
    }

    pub fn like(&mut self, post_id: Uuid, user: &AuthorRecord) {
        self.likes.insert((post_id, user.id));
    }

    pub fn comment(&mut self, post_id: Uuid, author: &AuthorRecord, text: &str, minutes: i64) {
        self.comments.push(CommentRecord {
            id: Uuid::new_v4(),
            post_id,
            author: author.clone(),
            text: text.to_string(),
            published_at: EPOCH + Duration::minutes(minutes),
        });
    }

    pub fn into_service(self) -> BlogPageService {
        let store = Arc::new(self);
        BlogPageService::new(store.clone(), store.clone(), store)
    }

    fn check(&self) -> Result<(), RepoError> {
        if self.failing {
            Err(RepoError::from_persistence("store offline"))
        } else {
            Ok(())
        }
    }

    fn like_count(&self, post_id: Uuid) -> u64 {
        self.likes.iter().filter(|(post, _)| *post == post_id).count() as u64
    }

    fn tag_usage(&self, tag_id: Uuid) -> u64 {
        self.post_tags.iter().filter(|(_, tag)| *tag == tag_id).count() as u64
    }

    fn comment_count(&self, post_id: Uuid) -> u64 {
        self.comments
            .iter()
            .filter(|comment| comment.post_id == post_id)
            .count() as u64
    }
}

fn bounded<T>(mut items: Vec<T>, limit: Option<u32>) -> Vec<T> {
    if let Some(limit) = limit {
        items.truncate(limit as usize);
    }
    items
}

fn non_zero(counts: impl Iterator<Item = (Uuid, u64)>) -> HashMap<Uuid, u64> {
    counts.filter(|(_, count)| *count > 0).collect()
}

#[async_trait]
impl PostsRepo for MemoryBlog {
    async fn list_posts(&self, query: &PostQuery) -> Result<Vec<PostRecord>, RepoError> {
        self.check()?;

        let mut posts: Vec<PostRecord> = self
            .posts
            .iter()
            .filter(|post| query.slug.as_ref().is_none_or(|slug| &post.slug == slug))
            .filter(|post| {
                query
                    .tag_id
                    .is_none_or(|tag_id| self.post_tags.contains(&(post.id, tag_id)))
            })
            .cloned()
            .collect();

        posts.sort_by(|left, right| {
            right
                .published_at
                .cmp(&left.published_at)
                .then_with(|| right.id.cmp(&left.id))
        });
        if query.order == PostOrder::MostLiked {
            posts.sort_by_key(|post| Reverse(self.like_count(post.id)));
        }

        Ok(bounded(posts, query.limit))
    }

    async fn count_likes(&self, post_ids: &[Uuid]) -> Result<HashMap<Uuid, u64>, RepoError> {
        self.check()?;
        Ok(non_zero(
            post_ids.iter().map(|id| (*id, self.like_count(*id))),
        ))
    }

    async fn list_post_tags(&self, post_ids: &[Uuid]) -> Result<Vec<PostTagLink>, RepoError> {
        self.check()?;
        Ok(self
            .post_tags
            .iter()
            .filter(|(post_id, _)| post_ids.contains(post_id))
            .filter_map(|(post_id, tag_id)| {
                self.tags
                    .iter()
                    .find(|tag| tag.id == *tag_id)
                    .map(|tag| PostTagLink {
                        post_id: *post_id,
                        tag: tag.clone(),
                    })
            })
            .collect())
    }
}

#[async_trait]
impl TagsRepo for MemoryBlog {
    async fn list_tags(&self, query: &TagQuery) -> Result<Vec<TagRecord>, RepoError> {
        self.check()?;

        let mut tags = self.tags.clone();
        tags.sort_by(|left, right| left.title.cmp(&right.title));
        tags.sort_by_key(|tag| Reverse(self.tag_usage(tag.id)));

        Ok(bounded(tags, query.limit))
    }

    async fn find_by_title(&self, title: &str) -> Result<Option<TagRecord>, RepoError> {
        self.check()?;
        Ok(self.tags.iter().find(|tag| tag.title == title).cloned())
    }

    async fn count_posts(&self, tag_ids: &[Uuid]) -> Result<HashMap<Uuid, u64>, RepoError> {
        self.check()?;
        Ok(non_zero(tag_ids.iter().map(|id| (*id, self.tag_usage(*id)))))
    }
}

#[async_trait]
impl CommentsRepo for MemoryBlog {
    async fn count_for_posts(&self, post_ids: &[Uuid]) -> Result<HashMap<Uuid, u64>, RepoError> {
        self.check()?;
        Ok(non_zero(
            post_ids.iter().map(|id| (*id, self.comment_count(*id))),
        ))
    }

    async fn list_for_post(&self, post_id: Uuid) -> Result<Vec<CommentRecord>, RepoError> {
        self.check()?;
        // Insertion order; the assembler sorts by publish time.
        Ok(self
            .comments
            .iter()
            .filter(|comment| comment.post_id == post_id)
            .cloned()
            .collect())
    }
}
