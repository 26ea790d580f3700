//! Profiles and config file handling
//!
//! Profiles name a catalog endpoint and the credentials to reach it, plus
//! per-profile migration settings. The file is TOML and may reference
//! environment variables with `${VAR}` or `${VAR:-default}`.

#![allow(clippy::module_inception)]

pub mod config;
pub mod error;

pub use config::{Config, Profile};
pub use error::{ConfigError, Result};
