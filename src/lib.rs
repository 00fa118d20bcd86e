//! Bookdesk Library Management Backend
//!
//! A REST JSON API for managing a library's book catalog, staff accounts
//! and book loans ("issues"), with overdue fines and dashboard counts.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod policy;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}
