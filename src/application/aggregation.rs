//! Derived, non-persisted metrics for posts and tags.
//!
//! Every call recomputes its counts against the repositories; nothing is
//! cached and nothing is written. The enriched types can only be built here,
//! so anything downstream that needs `total_comments` or tag popularity has to
//! receive an entity that went through this module.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use tracing::debug;
use uuid::Uuid;

use crate::application::repos::{CommentsRepo, PostsRepo, RepoError, TagsRepo};
use crate::domain::entities::{PostRecord, PostTagLink, TagRecord};

/// Popularity of one tag attached to a post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagStat {
    pub title: String,
    pub posts_with_tag: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnrichedPost {
    record: PostRecord,
    total_likes: u64,
    total_comments: u64,
    tags: Vec<TagStat>,
}

impl EnrichedPost {
    pub fn record(&self) -> &PostRecord {
        &self.record
    }

    pub fn total_likes(&self) -> u64 {
        self.total_likes
    }

    pub fn total_comments(&self) -> u64 {
        self.total_comments
    }

    /// All tags of the post, ordered by title.
    pub fn tags(&self) -> &[TagStat] {
        &self.tags
    }

    /// The single tag shown next to the post: the first one by title.
    pub fn representative_tag(&self) -> Option<&TagStat> {
        self.tags.first()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrichedTag {
    record: TagRecord,
    total_posts: u64,
}

impl EnrichedTag {
    pub fn record(&self) -> &TagRecord {
        &self.record
    }

    pub fn total_posts(&self) -> u64 {
        self.total_posts
    }
}

/// Raw counts gathered for a slice of posts.
#[derive(Debug, Clone, Default)]
pub struct PostMetrics {
    pub likes: HashMap<Uuid, u64>,
    pub comments: HashMap<Uuid, u64>,
    pub tag_links: Vec<PostTagLink>,
    pub tag_posts: HashMap<Uuid, u64>,
}

/// Combine post records with their metrics, keeping the input order.
pub fn aggregate_posts(records: Vec<PostRecord>, metrics: PostMetrics) -> Vec<EnrichedPost> {
    let PostMetrics {
        likes,
        comments,
        tag_links,
        tag_posts,
    } = metrics;

    let mut tags_by_post: HashMap<Uuid, Vec<TagRecord>> = HashMap::new();
    for link in tag_links {
        tags_by_post.entry(link.post_id).or_default().push(link.tag);
    }

    records
        .into_iter()
        .map(|record| {
            let mut tags = tags_by_post.remove(&record.id).unwrap_or_default();
            tags.sort_by(|left, right| left.title.cmp(&right.title).then(left.id.cmp(&right.id)));
            tags.dedup_by_key(|tag| tag.id);

            let tags = tags
                .into_iter()
                .map(|tag| TagStat {
                    posts_with_tag: tag_posts.get(&tag.id).copied().unwrap_or(0),
                    title: tag.title,
                })
                .collect();

            EnrichedPost {
                total_likes: likes.get(&record.id).copied().unwrap_or(0),
                total_comments: comments.get(&record.id).copied().unwrap_or(0),
                tags,
                record,
            }
        })
        .collect()
}

/// Combine tag records with their referencing-post counts, keeping the input order.
pub fn aggregate_tags(records: Vec<TagRecord>, post_counts: &HashMap<Uuid, u64>) -> Vec<EnrichedTag> {
    records
        .into_iter()
        .map(|record| EnrichedTag {
            total_posts: post_counts.get(&record.id).copied().unwrap_or(0),
            record,
        })
        .collect()
}

#[derive(Clone)]
pub struct Aggregator {
    posts: Arc<dyn PostsRepo>,
    tags: Arc<dyn TagsRepo>,
    comments: Arc<dyn CommentsRepo>,
}

impl Aggregator {
    pub fn new(
        posts: Arc<dyn PostsRepo>,
        tags: Arc<dyn TagsRepo>,
        comments: Arc<dyn CommentsRepo>,
    ) -> Self {
        Self {
            posts,
            tags,
            comments,
        }
    }

    pub async fn enrich_posts(
        &self,
        records: Vec<PostRecord>,
    ) -> Result<Vec<EnrichedPost>, RepoError> {
        if records.is_empty() {
            return Ok(Vec::new());
        }

        let post_ids: Vec<Uuid> = records.iter().map(|record| record.id).collect();
        let likes = self.posts.count_likes(&post_ids).await?;
        let comments = self.comments.count_for_posts(&post_ids).await?;
        let tag_links = self.posts.list_post_tags(&post_ids).await?;

        let mut tag_ids: Vec<Uuid> = tag_links.iter().map(|link| link.tag.id).collect();
        tag_ids.sort_unstable();
        tag_ids.dedup();
        let tag_posts = if tag_ids.is_empty() {
            HashMap::new()
        } else {
            self.tags.count_posts(&tag_ids).await?
        };

        debug!(
            target = "inkpost::aggregation",
            posts = post_ids.len(),
            tags = tag_ids.len(),
            "enriched posts"
        );

        Ok(aggregate_posts(
            records,
            PostMetrics {
                likes,
                comments,
                tag_links,
                tag_posts,
            },
        ))
    }

    pub async fn enrich_tags(&self, records: Vec<TagRecord>) -> Result<Vec<EnrichedTag>, RepoError> {
        if records.is_empty() {
            return Ok(Vec::new());
        }

        let tag_ids: Vec<Uuid> = records.iter().map(|record| record.id).collect();
        let post_counts = self.tags.count_posts(&tag_ids).await?;

        Ok(aggregate_tags(records, &post_counts))
    }
}
