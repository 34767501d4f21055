//! Shared types, errors, and configuration for Stanza.
//!
//! This crate provides common types used across all other crates:
//! - Typed IDs for type-safe entity references
//! - Application-wide error types
//! - The uniform service result envelope
//! - Configuration management

pub mod config;
pub mod error;
pub mod response;
pub mod types;

pub use config::AppConfig;
pub use error::{AppError, AppResult};
pub use response::ServiceResponse;
