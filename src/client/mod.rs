// File: ./src/client/mod.rs
pub mod auth;
pub mod core;
pub mod fetch;
pub mod google;
pub mod middleware;
pub mod redirect;

pub use crate::client::fetch::DocumentFetcher;
pub use crate::client::google::GoogleCalendar;
