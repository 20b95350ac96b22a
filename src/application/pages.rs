//! Page assemblers: one read-only operation per public page.

use std::sync::Arc;

use metrics::counter;
use thiserror::Error;
use tracing::{debug, warn};

use crate::application::aggregation::{EnrichedPost, EnrichedTag};
use crate::application::repos::{CommentsRepo, PostQuery, PostsRepo, RepoError, TagsRepo};
use crate::application::selection::{RELATED_POSTS_LIMIT, SELECTION_LIMIT, SelectionService};
use crate::domain::entities::{PostRecord, TagRecord};
use crate::presentation::serializers::{
    PostSummary, TagView, serialize_post_detail, serialize_post_summary, serialize_tag,
};
use crate::presentation::views::{
    ContactsPage, HomePage, PageContext, PostDetailPage, TagFilterPage,
};

const SOURCE: &str = "inkpost::pages";

#[derive(Debug, Error)]
pub enum PageError {
    #[error("{entity} not found")]
    NotFound { entity: &'static str },
    #[error("slug `{slug}` matches {matches} posts")]
    AmbiguousMatch { slug: String, matches: usize },
    #[error("page data could not be loaded")]
    Repo(#[from] RepoError),
}

#[derive(Clone)]
pub struct BlogPageService {
    selection: SelectionService,
    posts: Arc<dyn PostsRepo>,
    tags: Arc<dyn TagsRepo>,
    comments: Arc<dyn CommentsRepo>,
}

impl BlogPageService {
    pub fn new(
        posts: Arc<dyn PostsRepo>,
        tags: Arc<dyn TagsRepo>,
        comments: Arc<dyn CommentsRepo>,
    ) -> Self {
        let selection = SelectionService::new(posts.clone(), tags.clone(), comments.clone());
        Self {
            selection,
            posts,
            tags,
            comments,
        }
    }

    pub async fn home_page(&self) -> Result<HomePage, PageError> {
        let (popular, fresh, tags) = tokio::try_join!(
            self.selection.popular_posts(SELECTION_LIMIT),
            self.selection.fresh_posts(SELECTION_LIMIT),
            self.selection.popular_tags(SELECTION_LIMIT),
        )?;

        Ok(assembled(HomePage {
            most_popular_posts: summaries(&popular),
            page_posts: summaries(&fresh),
            popular_tags: tag_views(&tags),
        }))
    }

    pub async fn post_detail_page(&self, slug: &str) -> Result<PostDetailPage, PageError> {
        let record = self.find_post_by_slug(slug).await?;
        let post_id = record.id;

        let (mut enriched, mut comments, popular, tags) = tokio::try_join!(
            self.selection.aggregator().enrich_posts(vec![record]),
            self.comments.list_for_post(post_id),
            self.selection.popular_posts(SELECTION_LIMIT),
            self.selection.popular_tags(SELECTION_LIMIT),
        )?;

        let post = enriched
            .pop()
            .ok_or(PageError::NotFound { entity: "post" })?;
        comments.sort_by(|left, right| left.published_at.cmp(&right.published_at));

        Ok(assembled(PostDetailPage {
            post: serialize_post_detail(&post, &comments),
            most_popular_posts: summaries(&popular),
            popular_tags: tag_views(&tags),
        }))
    }

    pub async fn tag_filter_page(&self, tag_title: &str) -> Result<TagFilterPage, PageError> {
        let tag = self.find_tag_by_title(tag_title).await?;

        let (related, popular, tags) = tokio::try_join!(
            self.selection.posts_for_tag(&tag, RELATED_POSTS_LIMIT),
            self.selection.popular_posts(SELECTION_LIMIT),
            self.selection.popular_tags(SELECTION_LIMIT),
        )?;

        Ok(assembled(TagFilterPage {
            tag: tag.title,
            posts: summaries(&related),
            most_popular_posts: summaries(&popular),
            popular_tags: tag_views(&tags),
        }))
    }

    pub fn contacts_page(&self) -> ContactsPage {
        assembled(ContactsPage {})
    }

    async fn find_post_by_slug(&self, slug: &str) -> Result<PostRecord, PageError> {
        let mut matches = self.posts.list_posts(&PostQuery::by_slug(slug)).await?;

        match matches.len() {
            0 => Err(PageError::NotFound { entity: "post" }),
            1 => matches.pop().ok_or(PageError::NotFound { entity: "post" }),
            count => {
                warn!(
                    target = SOURCE,
                    slug = %slug,
                    matches = count,
                    "slug is shared by several posts"
                );
                Err(PageError::AmbiguousMatch {
                    slug: slug.to_string(),
                    matches: count,
                })
            }
        }
    }

    async fn find_tag_by_title(&self, title: &str) -> Result<TagRecord, PageError> {
        self.tags
            .find_by_title(title)
            .await?
            .ok_or(PageError::NotFound { entity: "tag" })
    }
}

fn summaries(posts: &[EnrichedPost]) -> Vec<PostSummary> {
    posts.iter().map(serialize_post_summary).collect()
}

fn tag_views(tags: &[EnrichedTag]) -> Vec<TagView> {
    tags.iter().map(serialize_tag).collect()
}

fn assembled<C: PageContext>(context: C) -> C {
    counter!("inkpost_page_assembled_total", "page" => C::TEMPLATE_NAME).increment(1);
    debug!(target = SOURCE, page = C::TEMPLATE_NAME, "assembled page context");
    context
}
