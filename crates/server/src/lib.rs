use std::sync::Arc;

use db::store::RecordStore;
use services::services::config::EditorConfig;

pub mod config;
pub mod error;
pub mod routes;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn RecordStore>,
    pub editor: EditorConfig,
}

impl AppState {
    pub fn new(store: Arc<dyn RecordStore>, editor: EditorConfig) -> Self {
        Self { store, editor }
    }
}
