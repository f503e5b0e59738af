#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! # Strata Provider
//!
//! The boundary to external systems.
//!
//! - [`ResourceProvider`]: import and refresh of remote objects
//! - [`ProviderRegistry`]: configured providers by configuration address
//! - [`testing::MockProvider`]: scripted double (feature `testing`)

pub mod error;
pub mod provider;
pub mod registry;
#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use error::ProviderError;
pub use provider::ResourceProvider;
pub use registry::ProviderRegistry;
