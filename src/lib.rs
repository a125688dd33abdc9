//! ShareIt item sharing service
//!
//! Users list items they are willing to lend, other users book them for a
//! time window, owners approve or reject bookings, and past bookers leave
//! comments. The `shareit-server` binary owns the database; the
//! `shareit-gateway` binary validates requests and forwards them to it.

use std::sync::Arc;

use sqlx::{Pool, Postgres};

pub mod api;
pub mod config;
pub mod error;
pub mod gateway;
pub mod models;
pub mod repository;
pub mod services;
pub mod telemetry;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub services: Arc<services::Services>,
    pub pool: Pool<Postgres>,
}
