//! User-facing side effects: alerts, confirmations, clipboard, navigation.

use async_trait::async_trait;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum UiHostError {
    #[error("clipboard unavailable: {0}")]
    Clipboard(String),
}

#[async_trait]
pub trait UiHost: Send + Sync {
    /// Blocking, user-visible message
    async fn alert(&self, message: &str);

    async fn confirm(&self, message: &str) -> bool;

    async fn copy_to_clipboard(&self, text: &str) -> Result<(), UiHostError>;

    async fn open_url(&self, url: &str);
}

/// Headless host: alerts become warnings, confirmations use a fixed answer.
#[derive(Debug, Clone)]
pub struct LoggingUiHost {
    confirm_answer: bool,
}

impl LoggingUiHost {
    pub fn new(confirm_answer: bool) -> Self {
        Self { confirm_answer }
    }
}

impl Default for LoggingUiHost {
    fn default() -> Self {
        Self::new(true)
    }
}

#[async_trait]
impl UiHost for LoggingUiHost {
    async fn alert(&self, message: &str) {
        warn!(message = %message, "alert");
    }

    async fn confirm(&self, message: &str) -> bool {
        info!(message = %message, answer = self.confirm_answer, "confirm");
        self.confirm_answer
    }

    async fn copy_to_clipboard(&self, text: &str) -> Result<(), UiHostError> {
        info!(text = %text, "copy to clipboard");
        Ok(())
    }

    async fn open_url(&self, url: &str) {
        info!(url = %url, "open url");
    }
}
