use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_with::{DurationMilliSeconds, serde_as};

/// Tunables shared by the editor and the admin shell.
#[serde_as]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EditorConfig {
    /// Quiet period after the last edit before an auto-save fires
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    #[serde(rename = "auto_save_delay_ms")]
    pub auto_save_delay: Duration,
    /// Origin prefixed to `/c/<slug>` for public card URLs
    pub public_origin: String,
    /// Appended to the slug of an imported snapshot
    pub import_slug_suffix: String,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            auto_save_delay: Duration::from_millis(3000),
            public_origin: "http://localhost:3000".to_string(),
            import_slug_suffix: "-imported".to_string(),
        }
    }
}

impl EditorConfig {
    pub fn public_url(&self, slug: &str) -> String {
        format!("{}/c/{}", self.public_origin.trim_end_matches('/'), slug)
    }
}
