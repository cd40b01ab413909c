//! Librarium Library Administration System
//!
//! A Rust REST JSON server for institutional library administration:
//! catalog and roster management, a lending ledger with inventory
//! consistency guarantees, and dashboard statistics.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod store;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}
