use std::error::Error as StdError;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::{
    application::{pages::PageError, repos::RepoError},
    infra::error::InfraError,
};

/// Diagnostic attached to error responses and consumed by the response logger.
#[derive(Debug, Clone)]
pub struct ErrorReport {
    pub source: &'static str,
    pub status: StatusCode,
    pub messages: Vec<String>,
}

impl ErrorReport {
    pub fn from_error(source: &'static str, status: StatusCode, error: &dyn StdError) -> Self {
        let mut messages = Vec::new();
        messages.push(error.to_string());
        let mut current = error.source();
        while let Some(inner) = current {
            messages.push(inner.to_string());
            current = inner.source();
        }
        Self {
            source,
            status,
            messages,
        }
    }

    pub fn from_message(
        source: &'static str,
        status: StatusCode,
        message: impl Into<String>,
    ) -> Self {
        Self {
            source,
            status,
            messages: vec![message.into()],
        }
    }

    pub fn attach(self, response: &mut Response) {
        response.extensions_mut().insert(self);
    }
}

#[derive(Debug)]
pub struct HttpError {
    status: StatusCode,
    public_message: &'static str,
    report: ErrorReport,
}

impl HttpError {
    pub fn new(
        source: &'static str,
        status: StatusCode,
        public_message: &'static str,
        detail: impl Into<String>,
    ) -> Self {
        let report = ErrorReport::from_message(source, status, detail);
        Self {
            status,
            public_message,
            report,
        }
    }

    pub fn from_error(
        source: &'static str,
        status: StatusCode,
        public_message: &'static str,
        error: &dyn StdError,
    ) -> Self {
        let report = ErrorReport::from_error(source, status, error);
        Self {
            status,
            public_message,
            report,
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let mut response = (self.status, self.public_message).into_response();
        self.report.attach(&mut response);
        response
    }
}

impl From<RepoError> for HttpError {
    fn from(error: RepoError) -> Self {
        const SOURCE: &str = "application::error::repo_error_to_http_error";
        match error {
            RepoError::NotFound => HttpError::new(
                SOURCE,
                StatusCode::NOT_FOUND,
                "Resource not found",
                "resource not found",
            ),
            RepoError::Timeout => HttpError::new(
                SOURCE,
                StatusCode::SERVICE_UNAVAILABLE,
                "Database timeout",
                "Database timeout",
            ),
            err @ (RepoError::Persistence(_) | RepoError::InvalidInput { .. }) => {
                HttpError::from_error(
                    SOURCE,
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Persistence error",
                    &err,
                )
            }
        }
    }
}

impl From<PageError> for HttpError {
    fn from(error: PageError) -> Self {
        const SOURCE: &str = "application::error::page_error_to_http_error";
        match error {
            PageError::NotFound { entity } => HttpError::new(
                SOURCE,
                StatusCode::NOT_FOUND,
                "Resource not found",
                format!("{entity} not found"),
            ),
            err @ PageError::AmbiguousMatch { .. } => HttpError::from_error(
                SOURCE,
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error",
                &err,
            ),
            PageError::Repo(err) => HttpError::from(err),
        }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Infra(#[from] InfraError),
    #[error("unexpected error: {0}")]
    Unexpected(String),
}

impl AppError {
    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::Unexpected(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_not_found_maps_to_404() {
        let error = HttpError::from(PageError::NotFound { entity: "tag" });
        assert_eq!(error.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn ambiguous_slug_maps_to_500() {
        let error = HttpError::from(PageError::AmbiguousMatch {
            slug: "twin".to_string(),
            matches: 2,
        });
        assert_eq!(error.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn repo_timeout_maps_to_503() {
        let error = HttpError::from(PageError::Repo(RepoError::Timeout));
        assert_eq!(error.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn report_collects_error_chain() {
        let error = PageError::Repo(RepoError::from_persistence("connection reset"));
        let report = ErrorReport::from_error("test", StatusCode::INTERNAL_SERVER_ERROR, &error);
        assert_eq!(report.messages.len(), 2);
        assert!(report.messages[1].contains("connection reset"));
    }
}
