#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! # Strata State
//!
//! Persisted state for resources under management.
//!
//! - [`InstanceState`]: one remote object as a provider reports it
//! - [`State`], [`ModuleState`], [`ResourceState`]: the persisted tree
//! - [`StateStore`]: the lock-protected handle shared by a graph walk
//! - [`StateFilter`]: address-pattern queries over a borrowed [`State`]

pub mod error;
pub mod filter;
pub mod instance;
pub mod state;
pub mod store;

pub use error::StateError;
pub use filter::{FilterResult, FilterValue, StateFilter};
pub use instance::{EphemeralState, InstanceState};
pub use state::{ModuleState, ResourceState, State};
pub use store::StateStore;
