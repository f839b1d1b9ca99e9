//! Runtime provider and context wiring for the desktop shell.
//!
//! The [`WindowManager`] lives in a [`StoredValue`] and is the single writer of window state.
//! Every mutation goes through [`DesktopRuntimeContext::with_manager`], which afterwards copies
//! the manager's state, preferences, and bus revision into signals so views re-render only on
//! real changes. UI composition stays in [`crate::components`].

use leptos::*;
use platform_host::HostServices;

use crate::{
    manager::WindowManager,
    model::{DesktopState, ShellConfig, ShellPreferences},
    palette::CommandPalette,
    reducer::DesktopAction,
};

#[derive(Clone, Copy)]
/// Leptos context for reading desktop state and driving the window manager.
pub struct DesktopRuntimeContext {
    /// Host service bundle (storage, clock).
    pub host: StoredValue<HostServices>,
    /// The single writer of window state.
    pub manager: StoredValue<WindowManager>,
    /// Snapshot of the manager's window state.
    pub state: RwSignal<DesktopState>,
    /// Snapshot of the persisted appearance preferences.
    pub preferences: RwSignal<ShellPreferences>,
    /// App bus revision; bumps whenever an event is delivered.
    pub bus_revision: RwSignal<u64>,
    /// Command palette overlay state.
    pub palette: RwSignal<CommandPalette>,
}

impl DesktopRuntimeContext {
    /// Runs `f` against the window manager, then publishes whatever it changed.
    ///
    /// Returns `None` once the provider has been disposed.
    pub fn with_manager<R>(&self, f: impl FnOnce(&mut WindowManager) -> R) -> Option<R> {
        let result = self.manager.try_update_value(f);
        self.sync();
        result
    }

    /// Dispatches a reducer action, logging rejected actions.
    pub fn dispatch_action(&self, action: DesktopAction) {
        self.with_manager(|manager| {
            if let Err(err) = manager.dispatch(action) {
                logging::warn!("desktop reducer error: {err}");
            }
        });
    }

    pub fn config(&self) -> ShellConfig {
        self.manager
            .try_with_value(|manager| manager.config().clone())
            .unwrap_or_default()
    }

    pub fn now_ms(&self) -> u64 {
        self.host
            .try_with_value(|host| host.clock.now_ms())
            .unwrap_or_else(platform_host::unix_time_ms_now)
    }

    fn sync(&self) {
        let Some((state, preferences, bus_revision, focus_request)) =
            self.manager.try_update_value(|manager| {
                (
                    manager.state().clone(),
                    manager.preferences(),
                    manager.bus().revision(),
                    manager.take_dom_focus_request(),
                )
            })
        else {
            return;
        };

        if self
            .state
            .try_with_untracked(|current| current != &state)
            .unwrap_or(false)
        {
            let _ = self.state.try_set(state);
        }
        if self
            .preferences
            .try_with_untracked(|current| current != &preferences)
            .unwrap_or(false)
        {
            let _ = self.preferences.try_set(preferences);
        }
        if self.bus_revision.try_get_untracked() != Some(bus_revision) {
            let _ = self.bus_revision.try_set(bus_revision);
        }
        if let Some(app_id) = focus_request {
            crate::components::focus_window_element(app_id);
        }
    }
}

#[component]
/// Provides [`DesktopRuntimeContext`] to descendant components and hydrates persisted state.
pub fn DesktopProvider(
    /// Injected host bundle assembled by the entry layer.
    host_services: HostServices,
    /// Runtime tunables; defaults when omitted.
    #[prop(optional)]
    config: Option<ShellConfig>,
    children: Children,
) -> impl IntoView {
    let manager = WindowManager::with_builtin_apps(&host_services, config.unwrap_or_default());
    logging::log!(
        "desktop runtime booted on {} host with {} window(s)",
        host_services.strategy.as_str(),
        manager.state().windows.len()
    );

    let state = create_rw_signal(manager.state().clone());
    let preferences = create_rw_signal(manager.preferences());
    let bus_revision = create_rw_signal(manager.bus().revision());
    let runtime = DesktopRuntimeContext {
        host: store_value(host_services),
        manager: store_value(manager),
        state,
        preferences,
        bus_revision,
        palette: create_rw_signal(CommandPalette::with_builtin_commands()),
    };

    provide_context(runtime);

    children().into_view()
}

/// Returns the current [`DesktopRuntimeContext`].
///
/// # Panics
///
/// Panics if called outside [`DesktopProvider`].
pub fn use_desktop_runtime() -> DesktopRuntimeContext {
    use_context::<DesktopRuntimeContext>().expect("DesktopRuntimeContext not provided")
}
