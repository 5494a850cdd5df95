//! Backend boundary: request shapes, endpoint paths and response decoding.
//!
//! The controller only sees [`CommentApi`]. [`HaloClient`] implements it on top
//! of a bare [`HttpTransport`] supplied by the host.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ApiError;
use crate::model::{CommentCoordinates, CommentPage, CurrentUserEnvelope, GlobalInfo, User};

pub const COMMENTS_PATH: &str = "/apis/api.halo.run/v1alpha1/comments";
pub const CURRENT_USER_PATH: &str = "/apis/api.console.halo.run/v1alpha1/users/-";
pub const GLOBAL_INFO_PATH: &str = "/actuator/globalinfo";
pub const LOGOUT_PATH: &str = "/logout";
pub const XSRF_COOKIE: &str = "XSRF-TOKEN";
pub const XSRF_HEADER: &str = "X-Xsrf-Token";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl HttpRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self { method: Method::Get, url: url.into(), headers: Vec::new(), body: None }
    }

    pub fn post(url: impl Into<String>) -> Self {
        Self { method: Method::Post, url: url.into(), headers: Vec::new(), body: None }
    }

    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    pub fn json_body(self, body: String) -> Self {
        let mut req = self.header("Content-Type", "application/json");
        req.body = Some(body);
        req
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool { (200..300).contains(&self.status) }
}

/// Raw HTTP exchange. Implementations report only transport failures as errors
/// (as [`ApiError::Network`]); any status code is a successful exchange.
#[async_trait(?Send)]
pub trait HttpTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, ApiError>;
}

/// Parameters of a comment list request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentQuery {
    pub coordinates: CommentCoordinates,
    pub page: u32,
    pub size: u32,
    pub with_replies: bool,
    pub reply_size: u32,
}

impl CommentQuery {
    pub fn to_query_string(&self) -> String {
        let c = &self.coordinates;
        url::form_urlencoded::Serializer::new(String::new())
            .append_pair("group", &c.group)
            .append_pair("kind", &c.kind)
            .append_pair("name", &c.name)
            .append_pair("version", &c.version)
            .append_pair("page", &self.page.to_string())
            .append_pair("size", &self.size.to_string())
            .append_pair("withReplies", if self.with_replies { "true" } else { "false" })
            .append_pair("replySize", &self.reply_size.to_string())
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectRef {
    pub group: String,
    pub kind: String,
    pub name: String,
    pub version: String,
}

impl From<&CommentCoordinates> for SubjectRef {
    fn from(c: &CommentCoordinates) -> Self {
        Self { group: c.group.clone(), kind: c.kind.clone(), name: c.name.clone(), version: c.version.clone() }
    }
}

/// Author fields sent along with an anonymous comment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorFields {
    pub display_name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentRequest {
    pub raw: String,
    pub content: String,
    pub allow_notification: bool,
    pub subject_ref: SubjectRef,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<AuthorFields>,
}

/// Operations the widget needs from the backend.
#[async_trait(?Send)]
pub trait CommentApi {
    async fn list_comments(&self, query: &CommentQuery) -> Result<CommentPage, ApiError>;
    /// The signed-in user, or the anonymous sentinel user.
    async fn current_user(&self) -> Result<User, ApiError>;
    async fn global_info(&self) -> Result<GlobalInfo, ApiError>;
    async fn create_comment(&self, request: &CommentRequest) -> Result<(), ApiError>;
    async fn logout(&self, xsrf_token: &str) -> Result<(), ApiError>;
}

/// [`CommentApi`] against a Halo backend rooted at `base_url`.
#[derive(Debug, Clone)]
pub struct HaloClient<T> {
    base_url: String,
    transport: T,
}

impl<T: HttpTransport> HaloClient<T> {
    pub fn new(base_url: impl Into<String>, transport: T) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { base_url, transport }
    }

    pub fn transport(&self) -> &T { &self.transport }

    fn url(&self, path: &str) -> String { format!("{}{}", self.base_url, path) }

    async fn exchange(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        let response = self.transport.send(request).await?;
        if response.is_success() {
            Ok(response)
        } else {
            Err(ApiError::rejected(response.status, rejection_message(&response.body)))
        }
    }
}

#[async_trait(?Send)]
impl<T: HttpTransport> CommentApi for HaloClient<T> {
    async fn list_comments(&self, query: &CommentQuery) -> Result<CommentPage, ApiError> {
        let url = format!("{}?{}", self.url(COMMENTS_PATH), query.to_query_string());
        let response = self.exchange(HttpRequest::get(url)).await?;
        decode_comment_page(&response.body)
    }

    async fn current_user(&self) -> Result<User, ApiError> {
        let response = self.exchange(HttpRequest::get(self.url(CURRENT_USER_PATH))).await?;
        let envelope: CurrentUserEnvelope = serde_json::from_str(&response.body)?;
        Ok(envelope.user)
    }

    async fn global_info(&self) -> Result<GlobalInfo, ApiError> {
        let response = self.exchange(HttpRequest::get(self.url(GLOBAL_INFO_PATH))).await?;
        Ok(serde_json::from_str(&response.body)?)
    }

    async fn create_comment(&self, request: &CommentRequest) -> Result<(), ApiError> {
        let body = serde_json::to_string(request)?;
        self.exchange(HttpRequest::post(self.url(COMMENTS_PATH)).json_body(body)).await?;
        Ok(())
    }

    async fn logout(&self, xsrf_token: &str) -> Result<(), ApiError> {
        self.exchange(HttpRequest::post(self.url(LOGOUT_PATH)).header(XSRF_HEADER, xsrf_token)).await?;
        Ok(())
    }
}

/// Decodes and checks a list body; flags are re-derived from the counts.
pub fn decode_comment_page(body: &str) -> Result<CommentPage, ApiError> {
    let page: CommentPage = serde_json::from_str(body)?;
    page.check_shape().map_err(ApiError::Malformed)?;
    Ok(page.with_derived_flags())
}

fn rejection_message(body: &str) -> String {
    let Ok(value) = serde_json::from_str::<Value>(body) else {
        return String::new();
    };
    ["detail", "message", "title"]
        .iter()
        .find_map(|k| value.get(*k).and_then(Value::as_str))
        .unwrap_or_default()
        .to_string()
}

/// Pulls the XSRF token out of a `document.cookie` style string.
pub fn xsrf_token_from_cookies(cookies: &str) -> Option<String> {
    cookies
        .split(';')
        .map(str::trim)
        .find_map(|pair| pair.strip_prefix(XSRF_COOKIE)?.strip_prefix('='))
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;
    use std::cell::RefCell;

    #[derive(Default)]
    struct Recorder {
        sent: RefCell<Vec<HttpRequest>>,
        reply: RefCell<Option<Result<HttpResponse, ApiError>>>,
    }

    impl Recorder {
        fn replying(status: u16, body: &str) -> Self {
            let r = Self::default();
            *r.reply.borrow_mut() = Some(Ok(HttpResponse { status, body: body.to_string() }));
            r
        }
    }

    #[async_trait(?Send)]
    impl HttpTransport for Recorder {
        async fn send(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
            self.sent.borrow_mut().push(request);
            self.reply.borrow_mut().take().unwrap_or_else(|| Err(ApiError::Network("offline".into())))
        }
    }

    fn query(page: u32) -> CommentQuery {
        CommentQuery {
            coordinates: CommentCoordinates::new("content.halo.run", "Post", "hello world", "v1alpha1"),
            page,
            size: 20,
            with_replies: true,
            reply_size: 10,
        }
    }

    #[test]
    fn query_string_keeps_parameter_order() {
        assert_eq!(
            query(2).to_query_string(),
            "group=content.halo.run&kind=Post&name=hello+world&version=v1alpha1&page=2&size=20&withReplies=true&replySize=10"
        );
    }

    #[test]
    fn list_hits_comments_endpoint() {
        let client = HaloClient::new("https://blog.example/", Recorder::replying(200, r#"{"page":1,"size":20,"total":0,"items":[]}"#));
        let page = block_on(client.list_comments(&query(1))).unwrap();
        assert_eq!(page.total, 0);
        let sent = client.transport().sent.borrow();
        assert_eq!(sent[0].method, Method::Get);
        assert!(sent[0].url.starts_with("https://blog.example/apis/api.halo.run/v1alpha1/comments?group="));
    }

    #[test]
    fn error_taxonomy() {
        let rejected = HaloClient::new("", Recorder::replying(500, r#"{"detail":"boom"}"#));
        assert_eq!(block_on(rejected.list_comments(&query(1))), Err(ApiError::rejected(500, "boom")));

        let malformed = HaloClient::new("", Recorder::replying(200, "<html>"));
        assert!(matches!(block_on(malformed.list_comments(&query(1))), Err(ApiError::Malformed(_))));

        let offline = HaloClient::new("", Recorder::default());
        assert!(matches!(block_on(offline.global_info()), Err(ApiError::Network(_))));
    }

    #[test]
    fn create_comment_posts_json() {
        let client = HaloClient::new("", Recorder::replying(200, "{}"));
        let request = CommentRequest {
            raw: "hi".into(),
            content: "hi".into(),
            allow_notification: true,
            subject_ref: SubjectRef::from(&query(1).coordinates),
            owner: None,
        };
        block_on(client.create_comment(&request)).unwrap();
        let sent = client.transport().sent.borrow();
        assert_eq!(sent[0].method, Method::Post);
        let body: Value = serde_json::from_str(sent[0].body.as_deref().unwrap()).unwrap();
        assert_eq!(body["subjectRef"]["kind"], "Post");
        assert_eq!(body["allowNotification"], true);
        assert!(body.get("owner").is_none());
    }

    #[test]
    fn reads_xsrf_cookie() {
        assert_eq!(xsrf_token_from_cookies("a=1; XSRF-TOKEN=abc; b=2").as_deref(), Some("abc"));
        assert_eq!(xsrf_token_from_cookies("a=1"), None);
    }
}
