//! Shared, lock-protected state.

use std::sync::Arc;

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::state::State;

/// The state shared by every node of a graph walk.
///
/// Cloning is cheap and yields a handle to the same state. Access goes
/// through scoped guards that release the lock when dropped, on every exit
/// path.
#[derive(Debug, Clone, Default)]
pub struct StateStore {
    inner: Arc<RwLock<State>>,
}

impl StateStore {
    /// Empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store seeded with `state`.
    #[must_use]
    pub fn from_state(state: State) -> Self {
        Self {
            inner: Arc::new(RwLock::new(state)),
        }
    }

    /// Shared read access. Several readers may hold this at once.
    pub fn read(&self) -> RwLockReadGuard<'_, State> {
        self.inner.read()
    }

    /// Exclusive write access.
    pub fn write(&self) -> RwLockWriteGuard<'_, State> {
        self.inner.write()
    }

    /// A point-in-time copy of the state.
    #[must_use]
    pub fn snapshot(&self) -> State {
        self.inner.read().clone()
    }
}
