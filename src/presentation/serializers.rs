//! Flat, template-ready records built from enriched entities.
//!
//! These functions do no I/O. They only accept the enriched types produced by
//! [`crate::application::aggregation`], so counts are always present.

use serde::Serialize;
use time::{OffsetDateTime, format_description::well_known::Rfc3339, macros::format_description};
use url::{Url, form_urlencoded};

use crate::application::aggregation::{EnrichedPost, EnrichedTag, TagStat};
use crate::domain::entities::CommentRecord;

/// Number of characters of a post body shown in listings.
pub const TEASER_CHARS: usize = 200;
/// Prefix joined onto stored relative image paths.
pub const MEDIA_URL_PREFIX: &str = "/media/";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagView {
    pub title: String,
    pub posts_with_tag: u64,
}

impl TagView {
    pub fn path(&self) -> String {
        tag_path(&self.title)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PostSummary {
    pub title: String,
    pub teaser_text: String,
    pub author: String,
    pub comments_amount: u64,
    pub image_url: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub published_at: OffsetDateTime,
    pub slug: String,
    pub tags: Option<TagView>,
    pub first_tag_title: Option<String>,
}

impl PostSummary {
    pub fn path(&self) -> String {
        post_path(&self.slug)
    }

    pub fn published_label(&self) -> String {
        format_published(self.published_at)
    }

    /// RFC 3339 timestamp for `datetime` attributes.
    pub fn published_iso(&self) -> String {
        format_machine(self.published_at)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommentView {
    pub text: String,
    #[serde(with = "time::serde::rfc3339")]
    pub published_at: OffsetDateTime,
    pub author: String,
}

impl CommentView {
    pub fn published_label(&self) -> String {
        format_published(self.published_at)
    }

    /// RFC 3339 timestamp for `datetime` attributes.
    pub fn published_iso(&self) -> String {
        format_machine(self.published_at)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PostDetail {
    pub title: String,
    pub text: String,
    pub author: String,
    pub comments: Vec<CommentView>,
    pub likes_amount: u64,
    pub image_url: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub published_at: OffsetDateTime,
    pub slug: String,
    pub tags: Option<TagView>,
}

impl PostDetail {
    pub fn published_label(&self) -> String {
        format_published(self.published_at)
    }

    /// RFC 3339 timestamp for `datetime` attributes.
    pub fn published_iso(&self) -> String {
        format_machine(self.published_at)
    }
}

pub fn serialize_post_summary(post: &EnrichedPost) -> PostSummary {
    let record = post.record();
    let tags = post.representative_tag().map(tag_stat_view);

    PostSummary {
        title: record.title.clone(),
        teaser_text: teaser(&record.text),
        author: record.author.username.clone(),
        comments_amount: post.total_comments(),
        image_url: media_url(record.image.as_deref()),
        published_at: record.published_at,
        slug: record.slug.clone(),
        first_tag_title: tags.as_ref().map(|tag| tag.title.clone()),
        tags,
    }
}

/// Full post view; `comments` are embedded in the order given.
pub fn serialize_post_detail(post: &EnrichedPost, comments: &[CommentRecord]) -> PostDetail {
    let record = post.record();

    PostDetail {
        title: record.title.clone(),
        text: record.text.clone(),
        author: record.author.username.clone(),
        comments: comments.iter().map(serialize_comment).collect(),
        likes_amount: post.total_likes(),
        image_url: media_url(record.image.as_deref()),
        published_at: record.published_at,
        slug: record.slug.clone(),
        tags: post.representative_tag().map(tag_stat_view),
    }
}

pub fn serialize_comment(comment: &CommentRecord) -> CommentView {
    CommentView {
        text: comment.text.clone(),
        published_at: comment.published_at,
        author: comment.author.username.clone(),
    }
}

pub fn serialize_tag(tag: &EnrichedTag) -> TagView {
    TagView {
        title: tag.record().title.clone(),
        posts_with_tag: tag.total_posts(),
    }
}

/// First [`TEASER_CHARS`] characters of `text`.
pub fn teaser(text: &str) -> String {
    text.chars().take(TEASER_CHARS).collect()
}

/// Public URL for a stored image reference; `None` when nothing is attached.
pub fn media_url(image: Option<&str>) -> Option<String> {
    let path = image.map(str::trim).filter(|path| !path.is_empty())?;

    if path.starts_with('/') || Url::parse(path).is_ok() {
        return Some(path.to_string());
    }

    Some(format!("{MEDIA_URL_PREFIX}{path}"))
}

pub fn post_path(slug: &str) -> String {
    format!("/posts/{}", encode_segment(slug))
}

pub fn tag_path(title: &str) -> String {
    format!("/tags/{}", encode_segment(title))
}

/// Percent-encode one path segment. `byte_serialize` writes spaces as `+`
/// and a literal `+` as `%2B`, so every `+` left in its output was a space.
fn encode_segment(segment: &str) -> String {
    form_urlencoded::byte_serialize(segment.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}

fn tag_stat_view(stat: &TagStat) -> TagView {
    TagView {
        title: stat.title.clone(),
        posts_with_tag: stat.posts_with_tag,
    }
}

fn format_machine(at: OffsetDateTime) -> String {
    at.format(&Rfc3339).unwrap_or_else(|_| at.to_string())
}

fn format_published(at: OffsetDateTime) -> String {
    let format = format_description!("[day].[month].[year] [hour]:[minute]");
    at.format(format).unwrap_or_else(|_| at.to_string())
}
