use std::collections::HashMap;

use uuid::Uuid;

use crate::application::repos::RepoError;

pub fn map_sqlx_error(err: sqlx::Error) -> RepoError {
    match err {
        sqlx::Error::RowNotFound => RepoError::NotFound,
        sqlx::Error::PoolTimedOut => RepoError::Timeout,
        sqlx::Error::Database(db) if db.message().contains("invalid input syntax") => {
            RepoError::InvalidInput {
                message: db.message().to_string(),
            }
        }
        sqlx::Error::Database(db)
            if db
                .message()
                .contains("canceling statement due to user request")
                || db.message().contains("statement timeout") =>
        {
            RepoError::Timeout
        }
        other => RepoError::from_persistence(other),
    }
}

pub(super) fn convert_count(value: i64) -> Result<u64, RepoError> {
    value
        .try_into()
        .map_err(|_| RepoError::from_persistence("count exceeds supported range"))
}

pub(super) fn collect_counts(rows: Vec<CountRow>) -> Result<HashMap<Uuid, u64>, RepoError> {
    rows.into_iter()
        .map(|row| convert_count(row.total).map(|total| (row.id, total)))
        .collect()
}

#[derive(sqlx::FromRow)]
pub(super) struct CountRow {
    pub id: Uuid,
    pub total: i64,
}
