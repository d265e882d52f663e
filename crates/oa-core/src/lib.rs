//! Core types for the oxidized-apple achievement integration
//!
//! This crate provides the error taxonomy and configuration
//! infrastructure shared by the media tracker and the runner.

pub mod config;
pub mod error;

pub use config::Config;
pub use error::{IntegrationError, MediaError, Result};
