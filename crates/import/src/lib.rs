#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! # Strata Import
//!
//! Brings existing remote objects under management.
//!
//! Each [`ImportTarget`] becomes an [`ImportStateNode`]. When the walker
//! evaluates it, the provider reports every object behind the requested ID;
//! the node then expands into one [`ImportStateSubNode`] per object, after
//! giving each a distinct address ([`resolve_target_addresses`]) and checking
//! that none of those addresses is already in state ([`scan_conflicts`]).
//! Sub nodes refresh, verify and store their object.
//!
//! [`Importer`] wires this together for a list of targets.

pub mod config;
pub mod conflict;
pub mod dedup;
pub mod error;
pub mod importer;
pub mod node;
pub mod transform;

pub use config::{ImportConfig, TargetConfig};
pub use conflict::{ALREADY_MANAGED, scan_conflicts};
pub use dedup::{candidate_address, resolve_target_addresses};
pub use error::{ConfigError, ImportError};
pub use importer::{ImportReport, Importer};
pub use node::{
    ImportPhase, ImportSlots, ImportStateNode, ImportStateSubNode, ImportStep, SubImportSlots,
    SubImportStep,
};
pub use transform::{ImportStateTransformer, ImportTarget};
