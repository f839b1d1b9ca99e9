use std::rc::Rc;

use platform_host::{HostServices, HostStrategy, MemoryKeyValueStore, SystemClock};

use crate::WebLocalStorage;

/// Returns the host strategy usable in the current environment.
///
/// Browsers with storage disabled (some private modes, sandboxed iframes) fall back to memory so
/// the workspace still runs for the session.
pub fn selected_host_strategy() -> HostStrategy {
    if WebLocalStorage.is_available() {
        HostStrategy::Browser
    } else {
        HostStrategy::Memory
    }
}

/// Builds the host service bundle for the selected strategy.
pub fn build_host_services() -> HostServices {
    match selected_host_strategy() {
        HostStrategy::Browser => HostServices::new(
            HostStrategy::Browser,
            Rc::new(WebLocalStorage),
            Rc::new(SystemClock),
        ),
        HostStrategy::Memory => HostServices::memory(MemoryKeyValueStore::default()),
    }
}
