#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! # Strata Log
//!
//! `tracing-subscriber` setup shared by Strata binaries and tests.
//!
//! ```rust,ignore
//! strata_log::LogConfig::from_env().init()?;
//! ```

pub mod builder;
pub mod config;
pub mod error;

pub use builder::try_init;
pub use config::{Format, LOG_ENV, LOG_FORMAT_ENV, LogConfig};
pub use error::LogError;
