#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! # Strata Core
//!
//! Shared vocabulary for the Strata import engine:
//!
//! - [`AbsResourceInstance`], [`AbsProviderConfig`], [`ModuleInstance`] and
//!   their string grammar
//! - legacy state keys ([`AbsResourceInstance::legacy_state_key`])
//! - [`Diagnostics`] for passes that report every problem at once

pub mod addr;
pub mod diagnostics;
pub mod error;

pub use addr::{
    AbsProviderConfig, AbsResourceInstance, InstanceKey, ModuleInstance, ModuleStep, Resource,
    ResourceInstance, ResourceMode,
};
pub use diagnostics::{Diagnostic, Diagnostics, DiagnosticsError, Severity};
pub use error::AddressError;
