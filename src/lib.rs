//! TopDecked: store, player, credit and tournament backend for trading-card-game stores.

pub mod config;
pub mod db;
pub mod error;
pub mod http;
pub mod mail;
pub mod metrics;
pub mod security;
pub mod uploads;

/// Embedded SQL migrations, applied by the server at startup and by the
/// database-backed tests.
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");
