// Presentation layer - HTTP surface for display clients
pub mod app_state;
pub mod handlers;
