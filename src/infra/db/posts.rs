use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::{Postgres, QueryBuilder};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{
    application::repos::{PostOrder, PostQuery, PostsRepo, RepoError},
    domain::entities::{AuthorRecord, PostRecord, PostTagLink, TagRecord},
};

use super::{
    PostgresRepositories,
    util::{CountRow, collect_counts, map_sqlx_error},
};

const POST_COLUMNS: &str = "SELECT p.id, p.slug, p.title, p.text, p.image, p.published_at, \
    u.id AS author_id, u.username AS author_username \
    FROM posts p INNER JOIN users u ON u.id = p.author_id WHERE 1=1";

const LIKES_EXPR: &str =
    "(SELECT COUNT(DISTINCT pl.user_id) FROM post_likes pl WHERE pl.post_id = p.id)";

#[derive(sqlx::FromRow)]
struct PostRow {
    id: Uuid,
    slug: String,
    title: String,
    text: String,
    image: Option<String>,
    published_at: OffsetDateTime,
    author_id: Uuid,
    author_username: String,
}

impl From<PostRow> for PostRecord {
    fn from(row: PostRow) -> Self {
        Self {
            id: row.id,
            slug: row.slug,
            title: row.title,
            text: row.text,
            image: row.image,
            published_at: row.published_at,
            author: AuthorRecord {
                id: row.author_id,
                username: row.author_username,
            },
        }
    }
}

#[derive(sqlx::FromRow)]
struct PostTagRow {
    post_id: Uuid,
    tag_id: Uuid,
    tag_title: String,
}

impl From<PostTagRow> for PostTagLink {
    fn from(row: PostTagRow) -> Self {
        Self {
            post_id: row.post_id,
            tag: TagRecord {
                id: row.tag_id,
                title: row.tag_title,
            },
        }
    }
}

impl PostgresRepositories {
    fn build_post_query(query: &PostQuery) -> QueryBuilder<'static, Postgres> {
        let mut qb = QueryBuilder::new(POST_COLUMNS);

        if let Some(slug) = query.slug.as_ref() {
            qb.push(" AND p.slug = ");
            qb.push_bind(slug.clone());
        }

        if let Some(tag_id) = query.tag_id {
            qb.push(
                " AND EXISTS (SELECT 1 FROM post_tags pt WHERE pt.post_id = p.id AND pt.tag_id = ",
            );
            qb.push_bind(tag_id);
            qb.push(")");
        }

        match query.order {
            PostOrder::MostLiked => {
                qb.push(" ORDER BY ");
                qb.push(LIKES_EXPR);
                qb.push(" DESC, p.published_at DESC, p.id DESC");
            }
            PostOrder::Natural | PostOrder::Freshest => {
                qb.push(" ORDER BY p.published_at DESC, p.id DESC");
            }
        }

        if let Some(limit) = query.limit {
            qb.push(" LIMIT ");
            qb.push_bind(i64::from(limit));
        }

        qb
    }
}

#[async_trait]
impl PostsRepo for PostgresRepositories {
    async fn list_posts(&self, query: &PostQuery) -> Result<Vec<PostRecord>, RepoError> {
        let mut qb = Self::build_post_query(query);
        let rows = qb
            .build_query_as::<PostRow>()
            .fetch_all(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(PostRecord::from).collect())
    }

    async fn count_likes(&self, post_ids: &[Uuid]) -> Result<HashMap<Uuid, u64>, RepoError> {
        if post_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = sqlx::query_as::<_, CountRow>(
            r#"
            SELECT post_id AS id, COUNT(DISTINCT user_id) AS total
            FROM post_likes
            WHERE post_id = ANY($1)
            GROUP BY post_id
            "#,
        )
        .bind(post_ids)
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        collect_counts(rows)
    }

    async fn list_post_tags(&self, post_ids: &[Uuid]) -> Result<Vec<PostTagLink>, RepoError> {
        if post_ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query_as::<_, PostTagRow>(
            r#"
            SELECT pt.post_id, t.id AS tag_id, t.title AS tag_title
            FROM post_tags pt
            INNER JOIN tags t ON t.id = pt.tag_id
            WHERE pt.post_id = ANY($1)
            ORDER BY pt.post_id, t.title, t.id
            "#,
        )
        .bind(post_ids)
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(PostTagLink::from).collect())
    }
}
