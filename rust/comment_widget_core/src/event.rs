//! Events child renderers send up to the widget root.

use serde::{Deserialize, Serialize};

use crate::controller::{FetchOutcome, SubmitOutcome};
use crate::form::FormFields;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum WidgetEvent {
    PageChange { page: u32 },
    Submit { fields: FormFields },
    EmojiInsert { text: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    PageChange,
    Submit,
    EmojiInsert,
}

impl WidgetEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            Self::PageChange { .. } => EventKind::PageChange,
            Self::Submit { .. } => EventKind::Submit,
            Self::EmojiInsert { .. } => EventKind::EmojiInsert,
        }
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> { serde_json::from_str(json) }
}

/// What handling an event led to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventOutcome {
    Fetched(FetchOutcome),
    Submitted(SubmitOutcome),
    DraftUpdated,
}
