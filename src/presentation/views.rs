use crate::application::error::{ErrorReport, HttpError};
use crate::presentation::serializers::{PostDetail, PostSummary, TagView};
use askama::{Error as AskamaError, Template};
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
#[error("{public_message}")]
pub struct TemplateRenderError {
    pub(crate) source: &'static str,
    pub(crate) public_message: &'static str,
    #[source]
    pub(crate) error: AskamaError,
}

impl TemplateRenderError {
    pub fn new(source: &'static str, public_message: &'static str, error: AskamaError) -> Self {
        Self {
            source,
            public_message,
            error,
        }
    }
}

impl From<TemplateRenderError> for HttpError {
    fn from(err: TemplateRenderError) -> Self {
        let TemplateRenderError {
            source,
            public_message,
            error,
        } = err;

        HttpError::from_error(
            source,
            StatusCode::INTERNAL_SERVER_ERROR,
            public_message,
            &error,
        )
    }
}

/// A page context handed to the renderer under a fixed template name.
pub trait PageContext: Serialize + Sized {
    const TEMPLATE_NAME: &'static str;

    type View: Template;

    fn into_template(self, chrome: LayoutChrome) -> Self::View;

    /// The context as a string-keyed mapping.
    fn context_map(&self) -> Result<Map<String, Value>, serde_json::Error> {
        match serde_json::to_value(self)? {
            Value::Object(map) => Ok(map),
            _ => Ok(Map::new()),
        }
    }
}

pub fn render_template<T: Template>(template: T) -> Result<Html<String>, HttpError> {
    template.render().map(Html).map_err(|err| {
        TemplateRenderError::new(
            "presentation::views::render_template",
            "Template rendering failed",
            err,
        )
        .into()
    })
}

pub fn render_template_response<T: Template>(template: T, status: StatusCode) -> Response {
    match render_template(template) {
        Ok(html) => (status, html).into_response(),
        Err(err) => err.into_response(),
    }
}

pub fn render_page<C: PageContext>(chrome: LayoutChrome, content: C) -> Response {
    debug!(
        target = "inkpost::render",
        template = C::TEMPLATE_NAME,
        "rendering page"
    );
    render_template_response(content.into_template(chrome), StatusCode::OK)
}

pub fn render_not_found_response(chrome: LayoutChrome) -> Response {
    let content = ErrorPageView::not_found();
    let view = LayoutContext::new(chrome, content);
    let mut response = render_template_response(ErrorTemplate { view }, StatusCode::NOT_FOUND);
    ErrorReport::from_message(
        "presentation::views::render_not_found_response",
        StatusCode::NOT_FOUND,
        "Resource not found",
    )
    .attach(&mut response);
    response
}

#[derive(Clone)]
pub struct LayoutChrome {
    pub site_title: String,
}

#[derive(Clone)]
pub struct LayoutContext<T> {
    pub site_title: String,
    pub content: T,
}

impl<T> LayoutContext<T> {
    pub fn new(chrome: LayoutChrome, content: T) -> Self {
        Self {
            site_title: chrome.site_title,
            content,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct HomePage {
    pub most_popular_posts: Vec<PostSummary>,
    pub page_posts: Vec<PostSummary>,
    pub popular_tags: Vec<TagView>,
}

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub view: LayoutContext<HomePage>,
}

impl PageContext for HomePage {
    const TEMPLATE_NAME: &'static str = "index";
    type View = IndexTemplate;

    fn into_template(self, chrome: LayoutChrome) -> IndexTemplate {
        IndexTemplate {
            view: LayoutContext::new(chrome, self),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PostDetailPage {
    pub post: PostDetail,
    pub most_popular_posts: Vec<PostSummary>,
    pub popular_tags: Vec<TagView>,
}

#[derive(Template)]
#[template(path = "post-details.html")]
pub struct PostDetailsTemplate {
    pub view: LayoutContext<PostDetailPage>,
}

impl PageContext for PostDetailPage {
    const TEMPLATE_NAME: &'static str = "post-details";
    type View = PostDetailsTemplate;

    fn into_template(self, chrome: LayoutChrome) -> PostDetailsTemplate {
        PostDetailsTemplate {
            view: LayoutContext::new(chrome, self),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TagFilterPage {
    pub tag: String,
    pub posts: Vec<PostSummary>,
    pub most_popular_posts: Vec<PostSummary>,
    pub popular_tags: Vec<TagView>,
}

#[derive(Template)]
#[template(path = "posts-list.html")]
pub struct PostsListTemplate {
    pub view: LayoutContext<TagFilterPage>,
}

impl PageContext for TagFilterPage {
    const TEMPLATE_NAME: &'static str = "posts-list";
    type View = PostsListTemplate;

    fn into_template(self, chrome: LayoutChrome) -> PostsListTemplate {
        PostsListTemplate {
            view: LayoutContext::new(chrome, self),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ContactsPage {}

#[derive(Template)]
#[template(path = "contacts.html")]
pub struct ContactsTemplate {
    pub view: LayoutContext<ContactsPage>,
}

impl PageContext for ContactsPage {
    const TEMPLATE_NAME: &'static str = "contacts";
    type View = ContactsTemplate;

    fn into_template(self, chrome: LayoutChrome) -> ContactsTemplate {
        ContactsTemplate {
            view: LayoutContext::new(chrome, self),
        }
    }
}

pub struct ErrorPageView {
    pub title: String,
    pub message: String,
}

impl ErrorPageView {
    pub fn not_found() -> Self {
        Self {
            title: "Page Not Found".to_string(),
            message: "The page you requested does not exist.".to_string(),
        }
    }
}

#[derive(Template)]
#[template(path = "error.html")]
pub struct ErrorTemplate {
    pub view: LayoutContext<ErrorPageView>,
}
