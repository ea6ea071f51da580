//! mailsink Common - Shared types and utilities
//!
//! This crate provides configuration, the error type and the small
//! envelope types shared by the storage, protocol and API crates.

pub mod config;
pub mod error;
pub mod types;

pub use config::Config;
pub use error::{Error, Result};
