//! Host service bundle injected into the workspace runtime by the entry layer.

use std::rc::Rc;

use crate::{Clock, KeyValueStore, MemoryKeyValueStore, SystemClock};

/// Stable host strategy selected for the current composition path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostStrategy {
    /// Browser `localStorage`-backed composition.
    Browser,
    /// In-process memory storage (tests, non-browser targets).
    Memory,
}

impl HostStrategy {
    /// Returns a stable string token for diagnostics.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Browser => "browser",
            Self::Memory => "memory",
        }
    }
}

#[derive(Clone)]
/// Services the runtime needs from its host.
pub struct HostServices {
    /// Strategy that produced this bundle.
    pub strategy: HostStrategy,
    /// Synchronous key/value store backing every persisted value.
    pub store: Rc<dyn KeyValueStore>,
    /// Time source for throttling.
    pub clock: Rc<dyn Clock>,
}

impl HostServices {
    /// Builds a bundle from explicit parts.
    pub fn new(strategy: HostStrategy, store: Rc<dyn KeyValueStore>, clock: Rc<dyn Clock>) -> Self {
        Self {
            strategy,
            store,
            clock,
        }
    }

    /// Builds an in-memory bundle around `store` using the system clock.
    pub fn memory(store: MemoryKeyValueStore) -> Self {
        Self::new(HostStrategy::Memory, Rc::new(store), Rc::new(SystemClock))
    }
}

impl std::fmt::Debug for HostServices {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostServices")
            .field("strategy", &self.strategy)
            .finish_non_exhaustive()
    }
}
