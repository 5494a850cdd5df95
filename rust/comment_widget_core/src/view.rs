//! Render contract: a serializable snapshot of everything on screen.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::form::{ComposeDraft, FormMode};
use crate::model::Comment;
use crate::pagination::PageStrip;

pub const DEFAULT_AVATAR: &str = "https://cravatar.cn/avatar/?d=mp";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetView {
    pub total: u64,
    pub show_spinner: bool,
    pub is_empty: bool,
    pub items: Vec<CommentItemView>,
    pub pagination: Option<PageStrip>,
    pub form: FormView,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormView {
    pub mode: FormMode,
    pub draft: ComposeDraft,
    pub profile_complete: bool,
    pub login_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentItemView {
    pub key: String,
    pub display_name: String,
    pub avatar: String,
    pub website: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub relative_time: String,
    pub pending_review: bool,
    pub content: String,
    pub depth: u8,
    pub replies: Vec<CommentItemView>,
}

impl CommentItemView {
    pub fn from_comment(comment: &Comment, depth: u8, now: DateTime<Utc>) -> Self {
        let created_at = comment.created_at();
        let display_name = [
            comment.owner.display_name.as_str(),
            comment.spec.owner.as_ref().map(|o| o.display_name.as_str()).unwrap_or_default(),
            comment.owner.name.as_str(),
        ]
        .into_iter()
        .find(|n| !n.is_empty())
        .unwrap_or_default()
        .to_string();
        let replies = comment
            .replies
            .as_ref()
            .map(|r| r.items.iter().map(|c| Self::from_comment(c, depth + 1, now)).collect())
            .unwrap_or_default();
        Self {
            key: comment.key().to_string(),
            display_name,
            avatar: comment.owner.avatar.clone().filter(|a| !a.is_empty()).unwrap_or_else(|| DEFAULT_AVATAR.to_string()),
            website: comment.website().map(str::to_string),
            created_at,
            relative_time: created_at.map(|t| time_ago(t, now)).unwrap_or_default(),
            pending_review: !comment.spec.approved,
            content: comment.spec.content.clone(),
            depth,
            replies,
        }
    }
}

/// Short relative description of `then` as seen at `now`.
pub fn time_ago(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let secs = (now - then).num_seconds();
    let plural = |n: i64, unit: &str| if n == 1 { format!("1 {unit} ago") } else { format!("{n} {unit}s ago") };
    match secs {
        s if s < 60 => "just now".to_string(),
        s if s < 3_600 => plural(s / 60, "minute"),
        s if s < 86_400 => plural(s / 3_600, "hour"),
        s if s < 30 * 86_400 => plural(s / 86_400, "day"),
        _ => then.format("%Y-%m-%d").to_string(),
    }
}
