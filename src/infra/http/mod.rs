mod middleware;
mod public;

pub use middleware::RequestContext;
pub use public::{HttpState, build_router};

use crate::application::error::ErrorReport;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use sqlx::Error as SqlxError;

fn db_health_response(result: Result<(), SqlxError>) -> Response {
    match result {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => {
            let mut response = StatusCode::SERVICE_UNAVAILABLE.into_response();
            ErrorReport::from_error(
                "infra::http::db_health",
                StatusCode::SERVICE_UNAVAILABLE,
                &err,
            )
            .attach(&mut response);
            response
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn healthy_database_answers_no_content() {
        assert_eq!(db_health_response(Ok(())).status(), StatusCode::NO_CONTENT);
    }

    #[test]
    fn failed_health_check_attaches_a_report() {
        let response = db_health_response(Err(SqlxError::PoolTimedOut));
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        let report = response.extensions().get::<ErrorReport>().unwrap();
        assert_eq!(report.source, "infra::http::db_health");
    }
}
