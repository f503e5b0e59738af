//! The provider contract consumed by import nodes.

use strata_core::AbsResourceInstance;
use strata_state::InstanceState;

use crate::error::ProviderError;

/// A plugin that knows how to talk to one kind of external system.
///
/// Calls are synchronous and attempted once; any retry policy belongs to the
/// implementation.
pub trait ResourceProvider: Send + Sync {
    /// Human-readable provider name, used in logs.
    fn name(&self) -> &str;

    /// Discover the remote object(s) identified by `id`.
    ///
    /// One ID may resolve to several objects. Each returned state should carry
    /// its concrete resource type in
    /// [`EphemeralState::type_name`](strata_state::EphemeralState::type_name).
    fn import_state(
        &self,
        addr: &AbsResourceInstance,
        id: &str,
    ) -> Result<Vec<InstanceState>, ProviderError>;

    /// Re-read the live object described by `state`.
    ///
    /// `Ok(None)` means the object no longer exists.
    fn refresh(
        &self,
        addr: &AbsResourceInstance,
        state: &InstanceState,
    ) -> Result<Option<InstanceState>, ProviderError>;
}
