//! Image asset type

use serde::{Deserialize, Serialize};

/// An image served by the media-asset backend in multiple resolutions.
///
/// `full` is always present; the thumbnails are optional and fall back to
/// `full` when missing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageAsset {
    /// Full-resolution URL
    pub full: String,

    /// Large thumbnail URL
    pub large: Option<String>,

    /// Small thumbnail URL
    pub small: Option<String>,
}

impl ImageAsset {
    /// Asset with only a full-resolution URL
    pub fn full_only(url: impl Into<String>) -> Self {
        Self {
            full: url.into(),
            large: None,
            small: None,
        }
    }

    /// Best URL for list views: small, then large, then full
    pub fn thumbnail(&self) -> &str {
        self.small
            .as_deref()
            .or(self.large.as_deref())
            .unwrap_or(&self.full)
    }
}
