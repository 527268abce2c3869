#![deny(clippy::unwrap_used)]
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_inception,
    clippy::struct_excessive_bools
)]

pub mod api;
pub mod audit;
pub mod database;
pub mod job_queue;
pub mod utils;

/// Embedded schema migrations for the access engine's tables.
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!();
