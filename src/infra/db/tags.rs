use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::{Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    application::repos::{RepoError, TagQuery, TagsRepo},
    domain::entities::TagRecord,
};

use super::{
    PostgresRepositories,
    util::{CountRow, collect_counts, map_sqlx_error},
};

#[derive(sqlx::FromRow)]
struct TagRow {
    id: Uuid,
    title: String,
}

impl From<TagRow> for TagRecord {
    fn from(row: TagRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
        }
    }
}

impl PostgresRepositories {
    fn build_tag_query(query: &TagQuery) -> QueryBuilder<'static, Postgres> {
        let mut qb = QueryBuilder::new(
            "SELECT t.id, t.title FROM tags t \
             LEFT JOIN post_tags pt ON pt.tag_id = t.id \
             GROUP BY t.id, t.title \
             ORDER BY COUNT(DISTINCT pt.post_id) DESC, t.title ASC",
        );

        if let Some(limit) = query.limit {
            qb.push(" LIMIT ");
            qb.push_bind(i64::from(limit));
        }

        qb
    }
}

#[async_trait]
impl TagsRepo for PostgresRepositories {
    async fn list_tags(&self, query: &TagQuery) -> Result<Vec<TagRecord>, RepoError> {
        let mut qb = Self::build_tag_query(query);
        let rows = qb
            .build_query_as::<TagRow>()
            .fetch_all(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(TagRecord::from).collect())
    }

    async fn find_by_title(&self, title: &str) -> Result<Option<TagRecord>, RepoError> {
        let row = sqlx::query_as::<_, TagRow>("SELECT id, title FROM tags WHERE title = $1")
            .bind(title)
            .fetch_optional(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(row.map(TagRecord::from))
    }

    async fn count_posts(&self, tag_ids: &[Uuid]) -> Result<HashMap<Uuid, u64>, RepoError> {
        if tag_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = sqlx::query_as::<_, CountRow>(
            r#"
            SELECT tag_id AS id, COUNT(DISTINCT post_id) AS total
            FROM post_tags
            WHERE tag_id = ANY($1)
            GROUP BY tag_id
            "#,
        )
        .bind(tag_ids)
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        collect_counts(rows)
    }
}
