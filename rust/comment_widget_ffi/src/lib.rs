//! Plain-function surface for native hosts (Flutter via `frb`, or any C-ABI
//! wrapper). Structured values cross the boundary as JSON strings. With the
//! `frb` feature, `bridge` exposes the same functions as synchronous Dart calls.

use comment_widget_core::api::decode_comment_page;
use comment_widget_core::form::{self, FormFields, FormMode};
use comment_widget_core::model::checked_total_pages;
use comment_widget_core::pagination::{compute_window, PageStrip};
use comment_widget_core::WidgetConfig;
use serde::Serialize;

#[derive(Debug, Serialize)]
struct ErrorPayload {
    error: String,
}

fn to_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|e| error_json(e.to_string()))
}

fn error_json(error: String) -> String {
    serde_json::to_string(&ErrorPayload { error }).unwrap_or_else(|_| "{}".to_string())
}

fn unnumberable(total: u64, size: u32) -> Option<String> {
    checked_total_pages(total, size)
        .is_none()
        .then(|| error_json(format!("total {total} does not fit in numbered pages of {size}")))
}

pub fn page_window(total: u64, size: u32, current: u32) -> String {
    unnumberable(total, size).unwrap_or_else(|| to_json(&compute_window(total, size, current)))
}

pub fn page_strip(total: u64, size: u32, current: u32) -> String {
    unnumberable(total, size).unwrap_or_else(|| to_json(&PageStrip::build(total, size, current)))
}

/// Normalizes a raw list response, or returns `{"error": ...}`.
pub fn normalize_comment_page(body: String) -> String {
    match decode_comment_page(&body) {
        Ok(page) => to_json(&page),
        Err(e) => error_json(e.to_string()),
    }
}

pub fn login_url(config_json: String, page_href: String) -> String {
    match WidgetConfig::from_json(&config_json) {
        Ok(config) => form::login_url(&config.coordinates(), &page_href),
        Err(e) => error_json(e.to_string()),
    }
}

/// Builds the create-comment body for an anonymous or signed-in author.
pub fn comment_request(config_json: String, fields_json: String, signed_in: bool, allow_anonymous: bool) -> String {
    let config = match WidgetConfig::from_json(&config_json) {
        Ok(config) => config,
        Err(e) => return error_json(e.to_string()),
    };
    let fields: FormFields = match serde_json::from_str(&fields_json) {
        Ok(fields) => fields,
        Err(e) => return error_json(e.to_string()),
    };
    let mode = match (signed_in, allow_anonymous) {
        (true, _) => FormMode::Authenticated(Default::default()),
        (false, true) => FormMode::Anonymous,
        (false, false) => FormMode::LoginRequired,
    };
    match form::build_request(&fields, &mode, &config.coordinates()) {
        Ok(request) => to_json(&request),
        Err(e) => error_json(e.to_string()),
    }
}

/// Synchronous entry points for `flutter_rust_bridge` codegen.
#[cfg(feature = "frb")]
pub mod bridge {
    use flutter_rust_bridge::SyncReturn;

    pub fn page_window(total: u64, size: u32, current: u32) -> SyncReturn<String> {
        SyncReturn(super::page_window(total, size, current))
    }

    pub fn page_strip(total: u64, size: u32, current: u32) -> SyncReturn<String> {
        SyncReturn(super::page_strip(total, size, current))
    }

    pub fn normalize_comment_page(body: String) -> SyncReturn<String> {
        SyncReturn(super::normalize_comment_page(body))
    }

    pub fn login_url(config_json: String, page_href: String) -> SyncReturn<String> {
        SyncReturn(super::login_url(config_json, page_href))
    }

    pub fn comment_request(
        config_json: String,
        fields_json: String,
        signed_in: bool,
        allow_anonymous: bool,
    ) -> SyncReturn<String> {
        SyncReturn(super::comment_request(config_json, fields_json, signed_in, allow_anonymous))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONFIG: &str = r#"{"group":"content.halo.run","kind":"Post","name":"hello","version":"v1alpha1"}"#;

    #[test]
    fn window_as_json() {
        assert_eq!(
            page_window(25, 10, 1),
            r#"[{"type":"Number","page":1},{"type":"Number","page":2},{"type":"Number","page":3}]"#
        );
        assert!(page_window(100, 10, 5).contains(r#"{"type":"Ellipsis"}"#));
        assert!(page_strip(100, 10, 1).contains(r#""prev":null"#));
    }

    #[test]
    fn oversized_totals_are_refused() {
        assert!(page_window(u64::MAX, 1, 1).starts_with(r#"{"error":"#));
        assert!(page_strip(u64::MAX, 1, 1).starts_with(r#"{"error":"#));
        assert!(page_window(u64::from(u32::MAX), 1, u32::MAX).ends_with(&format!(r#"{{"type":"Number","page":{}}}]"#, u32::MAX)));
        assert!(page_strip(100, 10, 50).contains(r#""current":10,"totalPages":10,"prev":9,"next":null"#));
    }

    #[cfg(feature = "frb")]
    #[test]
    fn bridge_wraps_plain_functions() {
        assert_eq!(bridge::page_window(25, 10, 1).0, page_window(25, 10, 1));
    }

    #[test]
    fn errors_come_back_as_payloads() {
        assert!(normalize_comment_page("nope".into()).starts_with(r#"{"error":"#));
        assert!(login_url("{}".into(), "https://x".into()).starts_with(r#"{"error":"#));
        let refused = comment_request(CONFIG.into(), r#"{"content":"hi"}"#.into(), false, false);
        assert_eq!(refused, r#"{"error":"sign in to comment"}"#);
    }

    #[test]
    fn anonymous_request() {
        let body = comment_request(
            CONFIG.into(),
            r#"{"content":"hi","displayName":"Ann","email":"a@b.c"}"#.into(),
            false,
            true,
        );
        let value: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(value["owner"]["displayName"], "Ann");
        assert_eq!(value["subjectRef"]["name"], "hello");
    }
}
