//! Compose form: draft fields, emoji insertion, validation and request building.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::api::{AuthorFields, CommentRequest, SubjectRef};
use crate::error::FormError;
use crate::identity::AnonymousIdentity;
use crate::model::{CommentCoordinates, User};
use crate::session::SessionState;

pub const LOGIN_PATH: &str = "/console/login";

pub const FIELD_CONTENT: &str = "content";
pub const FIELD_DISPLAY_NAME: &str = "displayName";
pub const FIELD_EMAIL: &str = "email";
pub const FIELD_WEBSITE: &str = "website";

/// Field values as submitted by the form renderer.
pub type FormFields = BTreeMap<String, String>;

/// Which variant of the form to show, derived from the session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "user")]
pub enum FormMode {
    Authenticated(User),
    Anonymous,
    LoginRequired,
}

impl FormMode {
    pub fn from_session(state: &SessionState) -> Self {
        match state.current_user.user() {
            Some(user) => Self::Authenticated(user.clone()),
            None if state.allow_anonymous_comments => Self::Anonymous,
            None => Self::LoginRequired,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ComposeDraft {
    pub content: String,
    pub display_name: String,
    pub email: String,
    pub website: String,
}

impl ComposeDraft {
    pub fn prefilled(identity: &AnonymousIdentity) -> Self {
        Self {
            content: String::new(),
            display_name: identity.display_name.clone(),
            email: identity.email.clone(),
            website: identity.website.clone().unwrap_or_default(),
        }
    }

    /// Appends picker output (an emoji) to the comment body.
    pub fn insert_text(&mut self, text: &str) { self.content.push_str(text); }

    pub fn profile_complete(&self) -> bool {
        !self.display_name.trim().is_empty() && !self.email.trim().is_empty()
    }

    pub fn to_fields(&self) -> FormFields {
        [
            (FIELD_CONTENT, &self.content),
            (FIELD_DISPLAY_NAME, &self.display_name),
            (FIELD_EMAIL, &self.email),
            (FIELD_WEBSITE, &self.website),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect()
    }

    pub fn set_field(&mut self, name: &str, value: &str) {
        let slot = match name {
            FIELD_CONTENT => &mut self.content,
            FIELD_DISPLAY_NAME => &mut self.display_name,
            FIELD_EMAIL => &mut self.email,
            FIELD_WEBSITE => &mut self.website,
            other => {
                tracing::debug!(field = other, "ignoring unknown form field");
                return;
            }
        };
        *slot = value.to_string();
    }

    /// Clears the body after a successful post; failures keep everything for a retry.
    pub fn after_submit(&mut self, posted: bool) {
        if posted {
            self.content.clear();
        }
    }
}

fn field<'a>(fields: &'a FormFields, name: &str) -> &'a str {
    fields.get(name).map(|v| v.trim()).unwrap_or_default()
}

/// Validates `fields` for `mode` and builds the create-comment body.
pub fn build_request(fields: &FormFields, mode: &FormMode, coordinates: &CommentCoordinates) -> Result<CommentRequest, FormError> {
    let raw = fields.get(FIELD_CONTENT).map(String::as_str).unwrap_or_default();
    if raw.trim().is_empty() {
        return Err(FormError::EmptyContent);
    }
    let owner = match mode {
        FormMode::LoginRequired => return Err(FormError::LoginRequired),
        FormMode::Authenticated(_) => None,
        FormMode::Anonymous => {
            let display_name = field(fields, FIELD_DISPLAY_NAME);
            let email = field(fields, FIELD_EMAIL);
            if display_name.is_empty() {
                return Err(FormError::MissingDisplayName);
            }
            if email.is_empty() {
                return Err(FormError::MissingEmail);
            }
            let website = field(fields, FIELD_WEBSITE);
            Some(AuthorFields {
                display_name: display_name.to_string(),
                email: email.to_string(),
                website: (!website.is_empty()).then(|| website.to_string()),
            })
        }
    };
    Ok(CommentRequest {
        raw: raw.to_string(),
        content: render_content(raw),
        allow_notification: true,
        subject_ref: SubjectRef::from(coordinates),
        owner,
    })
}

/// Escapes the raw text and keeps its line breaks.
pub fn render_content(raw: &str) -> String {
    html_escape::encode_text(raw.trim()).replace("\r\n", "\n").replace('\n', "<br/>")
}

/// Login page that sends the visitor back to this widget afterwards.
pub fn login_url(coordinates: &CommentCoordinates, page_href: &str) -> String {
    let target = format!("{}#{}", page_href.split('#').next().unwrap_or_default(), coordinates.anchor_id());
    let encoded: String = url::form_urlencoded::byte_serialize(target.as_bytes()).collect();
    format!("{LOGIN_PATH}?redirect_uri={encoded}")
}
