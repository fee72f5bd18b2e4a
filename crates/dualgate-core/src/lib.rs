//! Dualgate Core Library
//!
//! Configuration, error taxonomy and identity types shared by the
//! Dualgate two-factor verification crates.

pub mod config;
pub mod error;
pub mod types;

pub use config::DualgateConfig;
pub use error::{Error, FailureCategory, Result};

/// Dualgate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Placeholder substituted with the username in bind templates
pub const USERNAME_PLACEHOLDER: &str = "{username}";
