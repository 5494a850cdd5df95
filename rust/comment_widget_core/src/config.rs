//! Widget configuration, mirroring the attributes the host element accepts.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::model::CommentCoordinates;

pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const DEFAULT_REPLY_SIZE: u32 = 10;
pub const DEFAULT_EMOJI_DATA_URL: &str = "https://unpkg.com/@emoji-mart/data";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WidgetConfig {
    pub base_url: String,
    pub group: String,
    pub kind: String,
    pub name: String,
    pub version: String,
    pub with_replies: bool,
    pub reply_size: u32,
    pub page_size: u32,
    pub emoji_data_url: String,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            group: String::new(),
            kind: String::new(),
            name: String::new(),
            version: String::new(),
            with_replies: false,
            reply_size: DEFAULT_REPLY_SIZE,
            page_size: DEFAULT_PAGE_SIZE,
            emoji_data_url: DEFAULT_EMOJI_DATA_URL.to_string(),
        }
    }
}

impl WidgetConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.page_size == 0 {
            return Err(ConfigError::ZeroPageSize);
        }
        if self.kind.is_empty() {
            return Err(ConfigError::MissingCoordinate("kind"));
        }
        if self.name.is_empty() {
            return Err(ConfigError::MissingCoordinate("name"));
        }
        Ok(())
    }

    pub fn coordinates(&self) -> CommentCoordinates {
        CommentCoordinates::new(&self.group, &self.kind, &self.name, &self.version)
    }

    /// Base URL without a trailing slash, ready for path concatenation.
    pub fn api_root(&self) -> &str { self.base_url.trim_end_matches('/') }
}
