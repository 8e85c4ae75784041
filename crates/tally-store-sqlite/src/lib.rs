//! SQLite storage backend for the Tally reporting service.
//!
//! Implements [`tally_core::store::ReportStore`] over a single SQLite file
//! via `tokio-rusqlite`. Also exposes the write paths used by the admin
//! CRUD screens and by test fixtures; the reporting pipeline itself only
//! reads through the trait.

pub mod encode;
pub mod error;
pub mod schema;
pub mod store;


pub use error::{Error, Result};
pub use store::SqliteStore;
