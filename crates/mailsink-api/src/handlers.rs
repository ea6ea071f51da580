//! API request handlers

pub mod emails;
pub mod health;
pub mod projects;
pub mod stats;

pub use health::*;
