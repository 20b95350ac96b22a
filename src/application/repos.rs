//! Repository traits describing persistence adapters.
//!
//! The traits only expose reads: filtered and ordered listings with a row
//! limit, plus batched "count related" queries keyed by entity id. Count
//! results may omit ids that have no related rows; callers treat a missing id
//! as zero.

use std::collections::HashMap;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::domain::entities::{CommentRecord, PostRecord, PostTagLink, TagRecord};

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("persistence error: {0}")]
    Persistence(String),
    #[error("resource not found")]
    NotFound,
    #[error("invalid input: {message}")]
    InvalidInput { message: String },
    #[error("database timeout")]
    Timeout,
}

impl RepoError {
    pub fn from_persistence(err: impl std::fmt::Display) -> Self {
        Self::Persistence(err.to_string())
    }
}

/// Ordering applied to a post listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PostOrder {
    /// Newest first, the store's natural order.
    #[default]
    Natural,
    /// Most distinct likers first; ties fall back to the natural order.
    MostLiked,
    /// Newest first by publish timestamp.
    Freshest,
}

#[derive(Debug, Clone, Default)]
pub struct PostQuery {
    pub tag_id: Option<Uuid>,
    pub slug: Option<String>,
    pub order: PostOrder,
    pub limit: Option<u32>,
}

impl PostQuery {
    pub fn ordered(order: PostOrder, limit: u32) -> Self {
        Self {
            order,
            limit: Some(limit),
            ..Self::default()
        }
    }

    pub fn tagged(tag_id: Uuid, limit: u32) -> Self {
        Self {
            tag_id: Some(tag_id),
            limit: Some(limit),
            ..Self::default()
        }
    }

    pub fn by_slug(slug: impl Into<String>) -> Self {
        Self {
            slug: Some(slug.into()),
            ..Self::default()
        }
    }
}

/// Tag listing, most referencing posts first with ties broken by title.
#[derive(Debug, Clone, Default)]
pub struct TagQuery {
    pub limit: Option<u32>,
}

#[async_trait]
pub trait PostsRepo: Send + Sync {
    async fn list_posts(&self, query: &PostQuery) -> Result<Vec<PostRecord>, RepoError>;

    /// Distinct liker count per post.
    async fn count_likes(&self, post_ids: &[Uuid]) -> Result<HashMap<Uuid, u64>, RepoError>;

    /// Tags attached to each of the given posts.
    async fn list_post_tags(&self, post_ids: &[Uuid]) -> Result<Vec<PostTagLink>, RepoError>;
}

#[async_trait]
pub trait TagsRepo: Send + Sync {
    async fn list_tags(&self, query: &TagQuery) -> Result<Vec<TagRecord>, RepoError>;

    async fn find_by_title(&self, title: &str) -> Result<Option<TagRecord>, RepoError>;

    /// Distinct referencing-post count per tag.
    async fn count_posts(&self, tag_ids: &[Uuid]) -> Result<HashMap<Uuid, u64>, RepoError>;
}

#[async_trait]
pub trait CommentsRepo: Send + Sync {
    /// Comment count per post.
    async fn count_for_posts(&self, post_ids: &[Uuid]) -> Result<HashMap<Uuid, u64>, RepoError>;

    /// Comments on a post, oldest first.
    async fn list_for_post(&self, post_id: Uuid) -> Result<Vec<CommentRecord>, RepoError>;
}
