pub mod card_editor;
pub mod card_field;
pub mod card_list;
pub mod config;
pub mod debounce;
pub mod duplicate;
pub mod preview;
pub mod session;
pub mod snapshot;
pub mod ui_host;
