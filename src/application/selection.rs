//! Bounded, ordered and enriched selections of posts and tags.

use std::sync::Arc;

use tracing::debug;

use crate::application::aggregation::{Aggregator, EnrichedPost, EnrichedTag};
use crate::application::repos::{
    CommentsRepo, PostOrder, PostQuery, PostsRepo, RepoError, TagQuery, TagsRepo,
};
use crate::domain::entities::{PostRecord, TagRecord};

/// Size of the popular/fresh post panels and the popular tag panel.
pub const SELECTION_LIMIT: u32 = 5;
/// Maximum number of posts listed for a single tag.
pub const RELATED_POSTS_LIMIT: u32 = 20;

const SOURCE: &str = "inkpost::selection";

#[derive(Clone)]
pub struct SelectionService {
    posts: Arc<dyn PostsRepo>,
    tags: Arc<dyn TagsRepo>,
    aggregator: Aggregator,
}

impl SelectionService {
    pub fn new(
        posts: Arc<dyn PostsRepo>,
        tags: Arc<dyn TagsRepo>,
        comments: Arc<dyn CommentsRepo>,
    ) -> Self {
        let aggregator = Aggregator::new(posts.clone(), tags.clone(), comments);
        Self {
            posts,
            tags,
            aggregator,
        }
    }

    pub fn aggregator(&self) -> &Aggregator {
        &self.aggregator
    }

    /// Posts with the most likes first.
    pub async fn popular_posts(&self, limit: u32) -> Result<Vec<EnrichedPost>, RepoError> {
        let records = self
            .posts
            .list_posts(&PostQuery::ordered(PostOrder::MostLiked, limit))
            .await?;
        let mut posts = self.enrich_bounded(records, limit).await?;
        // Ordered by the enriched counts; stable, so store ties keep their order.
        posts.sort_by(|left, right| right.total_likes().cmp(&left.total_likes()));
        debug!(target = SOURCE, count = posts.len(), "selected popular posts");
        Ok(posts)
    }

    /// Most recently published posts first.
    pub async fn fresh_posts(&self, limit: u32) -> Result<Vec<EnrichedPost>, RepoError> {
        let records = self
            .posts
            .list_posts(&PostQuery::ordered(PostOrder::Freshest, limit))
            .await?;
        let mut posts = self.enrich_bounded(records, limit).await?;
        posts.sort_by(|left, right| right.record().published_at.cmp(&left.record().published_at));
        debug!(target = SOURCE, count = posts.len(), "selected fresh posts");
        Ok(posts)
    }

    /// Tags referenced by the most posts first.
    pub async fn popular_tags(&self, limit: u32) -> Result<Vec<EnrichedTag>, RepoError> {
        let mut records = self
            .tags
            .list_tags(&TagQuery { limit: Some(limit) })
            .await?;
        records.truncate(limit as usize);

        let mut tags = self.aggregator.enrich_tags(records).await?;
        tags.sort_by(|left, right| right.total_posts().cmp(&left.total_posts()));
        debug!(target = SOURCE, count = tags.len(), "selected popular tags");
        Ok(tags)
    }

    /// Posts carrying `tag`, in the store's natural order.
    pub async fn posts_for_tag(
        &self,
        tag: &TagRecord,
        limit: u32,
    ) -> Result<Vec<EnrichedPost>, RepoError> {
        let records = self
            .posts
            .list_posts(&PostQuery::tagged(tag.id, limit))
            .await?;
        let posts = self.enrich_bounded(records, limit).await?;
        debug!(
            target = SOURCE,
            tag = %tag.title,
            count = posts.len(),
            "selected posts for tag"
        );
        Ok(posts)
    }

    async fn enrich_bounded(
        &self,
        mut records: Vec<PostRecord>,
        limit: u32,
    ) -> Result<Vec<EnrichedPost>, RepoError> {
        records.truncate(limit as usize);
        self.aggregator.enrich_posts(records).await
    }
}
