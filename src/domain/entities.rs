//! Domain entities mirrored from persistent storage.

use std::fmt;

use serde::Serialize;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthorRecord {
    pub id: Uuid,
    pub username: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PostRecord {
    pub id: Uuid,
    pub slug: String,
    pub title: String,
    pub text: String,
    /// Stored image path relative to the media root, or an absolute URL.
    pub image: Option<String>,
    pub published_at: OffsetDateTime,
    pub author: AuthorRecord,
}

impl fmt::Display for PostRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.title)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagRecord {
    pub id: Uuid,
    pub title: String,
}

impl fmt::Display for TagRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.title)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommentRecord {
    pub id: Uuid,
    pub post_id: Uuid,
    pub author: AuthorRecord,
    pub text: String,
    pub published_at: OffsetDateTime,
}

/// Association between a post and one of its tags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostTagLink {
    pub post_id: Uuid,
    pub tag: TagRecord,
}
