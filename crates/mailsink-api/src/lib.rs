//! mailsink API - administrative REST surface
//!
//! Project management and browsing of captured emails. Runs beside the SMTP
//! listener and shares only the database with it.

pub mod auth;
pub mod error;
pub mod handlers;
pub mod openapi;
pub mod routes;

pub use error::ApiError;
pub use openapi::create_openapi_routes;
pub use routes::create_router;
