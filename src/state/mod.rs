pub mod app_settings;
pub mod app_state;
pub mod form;
pub mod load_match;
pub mod messages;
pub mod network;
