//! Browser implementations of the core's host seams.

use async_trait::async_trait;
use comment_widget_core::api::{HttpRequest, HttpResponse, HttpTransport, Method};
use comment_widget_core::controller::Viewport;
use comment_widget_core::identity::KeyValueStorage;
use comment_widget_core::session::NotificationSink;
use comment_widget_core::{ApiError, StorageError};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{
    Element, Headers, Request, RequestCredentials, RequestInit, Response, ScrollBehavior, ScrollIntoViewOptions,
    ScrollLogicalPosition,
};

pub(crate) fn describe(value: &JsValue) -> String {
    value.as_string().unwrap_or_else(|| format!("{value:?}"))
}

/// `window.fetch` with same-origin credentials.
#[derive(Debug, Default, Clone, Copy)]
pub struct FetchTransport;

#[async_trait(?Send)]
impl HttpTransport for FetchTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        fetch(&request).await.map_err(|err| ApiError::Network(describe(&err)))
    }
}

async fn fetch(request: &HttpRequest) -> Result<HttpResponse, JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let init = RequestInit::new();
    init.set_method(match request.method {
        Method::Get => "GET",
        Method::Post => "POST",
    });
    init.set_credentials(RequestCredentials::SameOrigin);
    let headers = Headers::new()?;
    for (name, value) in &request.headers {
        headers.set(name, value)?;
    }
    init.set_headers(&headers);
    if let Some(body) = &request.body {
        init.set_body(&JsValue::from_str(body));
    }

    let req = Request::new_with_str_and_init(&request.url, &init)?;
    let response: Response = JsFuture::from(window.fetch_with_request(&req)).await?.dyn_into()?;
    let body = JsFuture::from(response.text()?).await?.as_string().unwrap_or_default();
    Ok(HttpResponse { status: response.status(), body })
}

/// `window.localStorage`; unavailable in some private modes and sandboxed frames.
#[derive(Debug, Default, Clone, Copy)]
pub struct BrowserStorage;

impl BrowserStorage {
    fn storage() -> Result<web_sys::Storage, StorageError> {
        web_sys::window()
            .ok_or(StorageError::Unavailable)?
            .local_storage()
            .map_err(|_| StorageError::Unavailable)?
            .ok_or(StorageError::Unavailable)
    }
}

impl KeyValueStorage for BrowserStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Self::storage()?.get_item(key).map_err(|e| StorageError::Backend(describe(&e)))
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        Self::storage()?.set_item(key, value).map_err(|e| StorageError::Backend(describe(&e)))
    }
}

/// Forwards toasts to a JS callback `(level, message) => void`.
#[derive(Debug, Clone)]
pub struct JsNotifier {
    on_toast: js_sys::Function,
}

impl JsNotifier {
    pub fn new(on_toast: js_sys::Function) -> Self { Self { on_toast } }

    fn emit(&self, level: &str, message: &str) {
        if let Err(err) = self.on_toast.call2(&JsValue::NULL, &JsValue::from_str(level), &JsValue::from_str(message)) {
            tracing::warn!(error = %describe(&err), "toast callback threw");
        }
    }
}

impl NotificationSink for JsNotifier {
    fn error(&self, message: &str) { self.emit("error", message); }
    fn success(&self, message: &str) { self.emit("success", message); }
}

/// Scrolls the widget's host element to the top of the viewport.
#[derive(Debug, Clone)]
pub struct ElementViewport {
    element: Element,
}

impl ElementViewport {
    pub fn new(element: Element) -> Self { Self { element } }
}

impl Viewport for ElementViewport {
    fn scroll_to_top(&self) {
        let options = ScrollIntoViewOptions::new();
        options.set_behavior(ScrollBehavior::Smooth);
        options.set_block(ScrollLogicalPosition::Start);
        options.set_inline(ScrollLogicalPosition::Start);
        self.element.scroll_into_view_with_scroll_into_view_options(&options);
    }
}
