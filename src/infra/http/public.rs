use std::sync::Arc;

use axum::{
    Router,
    extract::{Path, State},
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::get,
};
use metrics::counter;

use crate::{
    application::{
        error::{ErrorReport, HttpError},
        pages::{BlogPageService, PageError},
    },
    infra::db::PostgresRepositories,
    presentation::views::{
        ContactsPage, HomePage, LayoutChrome, PageContext, PostDetailPage, TagFilterPage,
        render_not_found_response, render_page,
    },
};

use super::{
    db_health_response,
    middleware::{log_responses, set_request_context},
};

const SOURCE: &str = "infra::http::public";

#[derive(Clone)]
pub struct HttpState {
    pub pages: Arc<BlogPageService>,
    pub chrome: LayoutChrome,
    pub db: Arc<PostgresRepositories>,
}

pub fn build_router(state: HttpState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/posts/{slug}", get(post_detail))
        .route("/tags/{tag_title}", get(tag_filter))
        .route("/contacts", get(contacts))
        .route("/_health/db", get(public_health))
        .fallback(fallback)
        .with_state(state)
        .layer(middleware::from_fn(log_responses))
        .layer(middleware::from_fn(set_request_context))
}

async fn index(State(state): State<HttpState>) -> Response {
    match state.pages.home_page().await {
        Ok(content) => render_page(state.chrome, content),
        Err(err) => page_error_response(HomePage::TEMPLATE_NAME, err, state.chrome),
    }
}

async fn post_detail(State(state): State<HttpState>, Path(slug): Path<String>) -> Response {
    match state.pages.post_detail_page(&slug).await {
        Ok(content) => render_page(state.chrome, content),
        Err(err) => page_error_response(PostDetailPage::TEMPLATE_NAME, err, state.chrome),
    }
}

async fn tag_filter(State(state): State<HttpState>, Path(tag_title): Path<String>) -> Response {
    match state.pages.tag_filter_page(&tag_title).await {
        Ok(content) => render_page(state.chrome, content),
        Err(err) => page_error_response(TagFilterPage::TEMPLATE_NAME, err, state.chrome),
    }
}

async fn contacts(State(state): State<HttpState>) -> Response {
    let content: ContactsPage = state.pages.contacts_page();
    render_page(state.chrome, content)
}

async fn public_health(State(state): State<HttpState>) -> Response {
    db_health_response(state.db.health_check().await)
}

async fn fallback(State(state): State<HttpState>) -> Response {
    render_not_found_response(state.chrome)
}

fn page_error_response(page: &'static str, err: PageError, chrome: LayoutChrome) -> Response {
    let response = match err {
        PageError::NotFound { .. } => {
            let mut response = render_not_found_response(chrome);
            ErrorReport::from_error(SOURCE, StatusCode::NOT_FOUND, &err).attach(&mut response);
            response
        }
        err => HttpError::from(err).into_response(),
    };

    counter!(
        "inkpost_page_error_total",
        "page" => page,
        "status" => response.status().as_u16().to_string()
    )
    .increment(1);

    response
}
