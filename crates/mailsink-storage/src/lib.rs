//! mailsink Storage - SQLite persistence for projects and captured emails
//!
//! Projects carry the SMTP credentials that gate a session; emails are the
//! messages recorded at the end of an eligible DATA phase.

pub mod db;
pub mod models;
pub mod repository;

pub use db::DatabasePool;
pub use models::*;
pub use repository::*;
