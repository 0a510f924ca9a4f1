//! # reelrate common library
//!
//! Shared code for the reelrate services:
//! - Error type used by configuration loading
//! - TOML configuration model and file discovery
//! - Credential resolution (environment → TOML)

pub mod config;
pub mod error;

pub use error::{Error, Result};
