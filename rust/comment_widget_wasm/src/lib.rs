use std::rc::{Rc, Weak};

use comment_widget_core::event::{EventOutcome, WidgetEvent};
use comment_widget_core::{CommentWidget, HaloClient, WidgetConfig};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::future_to_promise;

mod host;

pub use host::{BrowserStorage, ElementViewport, FetchTransport, JsNotifier};
use host::describe;

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    tracing_wasm::set_as_global_default();
}

fn page_href() -> String {
    web_sys::window().and_then(|w| w.location().href().ok()).unwrap_or_default()
}

fn document_cookies() -> String {
    web_sys::window()
        .and_then(|w| w.document())
        .and_then(|d| d.dyn_into::<web_sys::HtmlDocument>().ok())
        .and_then(|d| d.cookie().ok())
        .unwrap_or_default()
}

fn view_json(widget: &CommentWidget) -> Result<String, JsValue> {
    serde_json::to_string(&widget.view(&page_href(), chrono::Utc::now())).map_err(|e| JsValue::from_str(&e.to_string()))
}

fn render(widget: &CommentWidget, on_render: &js_sys::Function) {
    match view_json(widget) {
        Ok(json) => {
            if let Err(err) = on_render.call1(&JsValue::NULL, &JsValue::from_str(&json)) {
                tracing::warn!(error = %describe(&err), "render callback threw");
            }
        }
        Err(err) => tracing::error!(error = %describe(&err), "could not encode view"),
    }
}

/// One widget instance bound to a host element.
///
/// `on_render(viewJson)` is called after every state change and
/// `on_toast(level, message)` for user-visible notifications.
#[wasm_bindgen]
pub struct CommentWidgetHandle {
    widget: Rc<CommentWidget>,
    on_render: js_sys::Function,
}

#[wasm_bindgen]
impl CommentWidgetHandle {
    #[wasm_bindgen(constructor)]
    pub fn new(
        config_json: &str,
        host: web_sys::Element,
        on_render: js_sys::Function,
        on_toast: js_sys::Function,
    ) -> Result<CommentWidgetHandle, JsValue> {
        let config = WidgetConfig::from_json(config_json).map_err(|e| JsValue::from_str(&e.to_string()))?;
        let api = Rc::new(HaloClient::new(config.base_url.clone(), FetchTransport));
        let widget = Rc::new(CommentWidget::new(
            config,
            api,
            Rc::new(BrowserStorage),
            Rc::new(JsNotifier::new(on_toast)),
            Rc::new(ElementViewport::new(host)),
        ));

        let weak: Weak<CommentWidget> = Rc::downgrade(&widget);
        let callback = on_render.clone();
        widget.controller().on_change(move || {
            if let Some(widget) = weak.upgrade() {
                render(&widget, &callback);
            }
        });
        let weak: Weak<CommentWidget> = Rc::downgrade(&widget);
        let callback = on_render.clone();
        widget.session().subscribe(move |_| {
            if let Some(widget) = weak.upgrade() {
                render(&widget, &callback);
            }
        });

        Ok(CommentWidgetHandle { widget, on_render })
    }

    /// Loads the session and the first page.
    pub fn mount(&self) -> js_sys::Promise {
        let widget = Rc::clone(&self.widget);
        future_to_promise(async move {
            widget.mount().await;
            Ok(JsValue::UNDEFINED)
        })
    }

    /// Handles a child event such as `{"type":"page-change","page":2}`.
    /// Resolves to `true` when a submitted comment was posted.
    pub fn dispatch(&self, event_json: &str) -> js_sys::Promise {
        let event = WidgetEvent::from_json(event_json);
        let widget = Rc::clone(&self.widget);
        let on_render = self.on_render.clone();
        future_to_promise(async move {
            let event = event.map_err(|e| JsValue::from_str(&format!("invalid event: {e}")))?;
            let outcome = widget.dispatch(event).await;
            render(&widget, &on_render);
            Ok(JsValue::from_bool(matches!(outcome, EventOutcome::Submitted(ref s) if s.is_posted())))
        })
    }

    #[wasm_bindgen(js_name = setField)]
    pub fn set_field(&self, name: &str, value: &str) {
        self.widget.set_draft_field(name, value);
    }

    pub fn logout(&self) -> js_sys::Promise {
        let widget = Rc::clone(&self.widget);
        future_to_promise(async move {
            widget
                .logout(&document_cookies())
                .await
                .map(|()| JsValue::UNDEFINED)
                .map_err(|e| JsValue::from_str(&e.user_message()))
        })
    }

    #[wasm_bindgen(js_name = loginUrl)]
    pub fn login_url(&self) -> String { self.widget.login_url(&page_href()) }

    #[wasm_bindgen(js_name = viewJson)]
    pub fn view_json(&self) -> Result<String, JsValue> { view_json(&self.widget) }
}
