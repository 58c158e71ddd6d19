//! Shared types, errors, and configuration for Khata.
//!
//! This crate provides common types used across all other crates:
//! - Application-wide error types
//! - Layered configuration
//! - JWT claims and token handling
//! - Pagination types for list endpoints

pub mod auth;
pub mod config;
pub mod error;
pub mod jwt;
pub mod types;

pub use auth::Claims;
pub use config::AppConfig;
pub use error::{AppError, AppResult};
pub use jwt::{JwtConfig, JwtError, JwtService};
