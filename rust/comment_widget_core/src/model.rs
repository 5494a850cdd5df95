//! Wire-level data model shared by the list controller, the session and the views.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// User name the backend reports for an unauthenticated visitor.
pub const ANONYMOUS_USER_NAME: &str = "anonymousUser";

/// Identifies the content item a thread belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct CommentCoordinates {
    pub group: String,
    pub kind: String,
    pub name: String,
    pub version: String,
}

impl CommentCoordinates {
    pub fn new(group: impl Into<String>, kind: impl Into<String>, name: impl Into<String>, version: impl Into<String>) -> Self {
        Self { group: group.into(), kind: kind.into(), name: name.into(), version: version.into() }
    }

    /// Element id the widget is anchored at, e.g. `comment-content-halo-run-Post-hello`.
    pub fn anchor_id(&self) -> String {
        let raw = format!("comment-{}-{}-{}", self.group.replace('.', "-"), self.kind, self.name);
        let mut out = String::with_capacity(raw.len());
        for ch in raw.chars() {
            if ch == '-' && out.ends_with('-') { continue; }
            out.push(ch);
        }
        out
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creation_timestamp: Option<DateTime<Utc>>,
}

/// A page of results as returned by the list endpoints.
///
/// Decoded pages go through [`ListResult::with_derived_flags`] so that the
/// navigation flags always agree with `page`, `size` and `total`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListResult<T> {
    pub page: u32,
    pub size: u32,
    pub total: u64,
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
    #[serde(default)]
    pub first: bool,
    #[serde(default)]
    pub last: bool,
    #[serde(default)]
    pub has_next: bool,
    #[serde(default)]
    pub has_previous: bool,
    #[serde(default)]
    pub total_pages: u32,
}

pub type CommentPage = ListResult<Comment>;

impl<T> ListResult<T> {
    pub fn empty(page: u32, size: u32) -> Self {
        Self {
            page,
            size,
            total: 0,
            items: Vec::new(),
            first: true,
            last: true,
            has_next: false,
            has_previous: false,
            total_pages: 0,
        }
        .with_derived_flags()
    }

    /// Recomputes `total_pages`, `first`, `last`, `has_next` and `has_previous`.
    pub fn with_derived_flags(mut self) -> Self {
        self.total_pages = total_pages(self.total, self.size);
        self.has_next = self.page < self.total_pages;
        self.has_previous = self.page > 1;
        self.first = self.page <= 1;
        self.last = self.page >= self.total_pages;
        self
    }

    /// Structural checks a decoded page must pass before it may replace the held list.
    pub fn check_shape(&self) -> Result<(), String> {
        if self.size == 0 {
            return Err("page size is zero".into());
        }
        if self.page == 0 {
            return Err("page number is zero".into());
        }
        if self.items.len() > self.size as usize {
            return Err(format!("{} items exceed page size {}", self.items.len(), self.size));
        }
        if checked_total_pages(self.total, self.size).is_none() {
            return Err(format!("total {} does not fit in numbered pages of {}", self.total, self.size));
        }
        Ok(())
    }
}

/// `ceil(total / size)` if it fits a page number, zero when `size` is zero.
pub fn checked_total_pages(total: u64, size: u32) -> Option<u32> {
    if size == 0 {
        return Some(0);
    }
    u32::try_from(total.div_ceil(u64::from(size))).ok()
}

/// Saturating [`checked_total_pages`]. Decoded pages never saturate since
/// [`ListResult::check_shape`] rejects them first.
pub fn total_pages(total: u64, size: u32) -> u32 {
    checked_total_pages(total, size).unwrap_or(u32::MAX)
}

/// A top-level comment or a reply. The body is carried through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub metadata: Metadata,
    pub spec: CommentSpec,
    #[serde(default)]
    pub owner: OwnerInfo,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replies: Option<ListResult<Comment>>,
}

impl Comment {
    /// Stable key used to diff rendered lists.
    pub fn key(&self) -> &str { &self.metadata.name }

    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.spec.creation_time.or(self.metadata.creation_timestamp)
    }

    pub fn website(&self) -> Option<&str> {
        self.spec
            .owner
            .as_ref()
            .and_then(|o| o.annotations.get("website"))
            .map(String::as_str)
            .filter(|w| !w.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct CommentSpec {
    #[serde(default)]
    pub raw: String,
    #[serde(default)]
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creation_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub approved: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<OwnerRef>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct OwnerRef {
    #[serde(default)]
    pub kind: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub annotations: BTreeMap<String, String>,
}

/// Author details resolved by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct OwnerInfo {
    #[serde(default)]
    pub kind: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub metadata: Metadata,
    #[serde(default)]
    pub spec: UserSpec,
}

impl User {
    pub fn is_anonymous(&self) -> bool { self.metadata.name == ANONYMOUS_USER_NAME }

    pub fn display_name(&self) -> &str {
        if self.spec.display_name.is_empty() { &self.metadata.name } else { &self.spec.display_name }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct UserSpec {
    #[serde(default)]
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// Body of the current-user endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentUserEnvelope {
    pub user: User,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct GlobalInfo {
    #[serde(default)]
    pub allow_anonymous_comments: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_list_payload() {
        let json = r#"{
            "page": 2, "size": 2, "total": 5,
            "items": [
                {"metadata": {"name": "c-1"}, "spec": {"raw": "hi", "content": "hi", "approved": true,
                 "creationTime": "2024-01-02T03:04:05Z",
                 "owner": {"kind": "Email", "name": "a@b.c", "displayName": "Ann", "annotations": {"website": "https://ann.dev"}}},
                 "owner": {"kind": "Email", "name": "a@b.c", "displayName": "Ann"}}
            ],
            "first": false, "last": false, "hasNext": true, "hasPrevious": true, "totalPages": 3
        }"#;
        let page: CommentPage = serde_json::from_str(json).unwrap();
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].key(), "c-1");
        assert_eq!(page.items[0].website(), Some("https://ann.dev"));
        assert!(page.items[0].created_at().is_some());
        assert_eq!(page.total_pages, 3);
    }

    #[test]
    fn derived_flags_follow_counts() {
        let p: CommentPage = ListResult { page: 3, size: 10, total: 25, ..ListResult::empty(1, 10) }.with_derived_flags();
        assert_eq!(p.total_pages, 3);
        assert!(!p.has_next);
        assert!(p.has_previous);
        assert!(p.last);

        let single: CommentPage = ListResult { total: 5, ..ListResult::empty(1, 10) }.with_derived_flags();
        assert!(!single.has_next && !single.has_previous);
    }

    #[test]
    fn shape_check_rejects_overfull_pages() {
        let mut p: CommentPage = ListResult::empty(1, 1);
        p.items = vec![Comment::default(), Comment::default()];
        assert!(p.check_shape().is_err());
        assert!(ListResult::<Comment>::empty(1, 0).check_shape().is_err());
    }

    #[test]
    fn shape_check_rejects_unnumberable_totals() {
        let huge: CommentPage = ListResult { total: u64::MAX, ..ListResult::empty(1, 1) };
        assert!(huge.check_shape().is_err());
        assert_eq!(checked_total_pages(u64::MAX, 1), None);
        assert_eq!(checked_total_pages(u64::from(u32::MAX), 1), Some(u32::MAX));
        let widest: CommentPage = ListResult { total: u64::from(u32::MAX), ..ListResult::empty(1, 1) };
        assert!(widest.check_shape().is_ok());
    }

    #[test]
    fn anchor_id_collapses_dashes() {
        let c = CommentCoordinates::new("content.halo.run", "Post", "hello", "v1alpha1");
        assert_eq!(c.anchor_id(), "comment-content-halo-run-Post-hello");
        let empty_group = CommentCoordinates::new("", "SinglePage", "about", "v1alpha1");
        assert_eq!(empty_group.anchor_id(), "comment-SinglePage-about");
    }

    #[test]
    fn anonymous_sentinel_is_detected() {
        let env: CurrentUserEnvelope = serde_json::from_str(r#"{"user":{"metadata":{"name":"anonymousUser"}}}"#).unwrap();
        assert!(env.user.is_anonymous());
        assert_eq!(env.user.display_name(), "anonymousUser");
    }
}
