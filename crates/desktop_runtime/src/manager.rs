//! Stateful window manager: owns the window state, its persisted copies, app close hooks, the app
//! bus, and deferred work waiting on window mount acknowledgments.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use desktop_app_contract::{
    ApplicationId, BusPayload, SettingsTab, WindowManagerOps, WindowPosition, WindowSize,
};
use leptos::logging;
use platform_host::HostServices;

use crate::{
    app_bus::AppBus,
    apps,
    model::{DesktopState, MinimizedSet, ShellConfig, ShellPreferences, WindowEntry},
    persistence::PersistedValue,
    reducer::{reduce_desktop, DesktopAction, ReducerError, RuntimeEffect},
    window_manager::sanitize_windows,
};

/// Cleanup an app runs when its window closes. Errors are logged and never block the close.
pub type CloseHook = Box<dyn FnMut(&mut AppBus) -> Result<(), String>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DeferredWork {
    Focus,
    SelectSettingsTab(SettingsTab),
}

pub struct WindowManager {
    config: ShellConfig,
    state: DesktopState,
    layout: PersistedValue<Vec<WindowEntry>>,
    minimized_store: Option<PersistedValue<MinimizedSet>>,
    wallpaper: PersistedValue<String>,
    font: PersistedValue<String>,
    mounted: BTreeSet<ApplicationId>,
    pending: BTreeMap<ApplicationId, Vec<DeferredWork>>,
    close_hooks: HashMap<ApplicationId, CloseHook>,
    bus: AppBus,
    dom_focus_request: Option<ApplicationId>,
}

impl WindowManager {
    /// Hydrates the manager from `host` storage.
    ///
    /// Stored layouts are sanitized (duplicate ids collapse to the topmost entry, malformed ids
    /// are dropped, sizes are raised to the floor) and written back when sanitizing changed them.
    pub fn new(host: &HostServices, config: ShellConfig) -> Self {
        let mut layout =
            PersistedValue::read(host.store.clone(), config.windows_key.clone(), Vec::new());
        let windows = sanitize_windows(layout.get().clone(), config.min_size);
        if &windows != layout.get() {
            logging::warn!(
                "stored window layout `{}` was inconsistent, repairing",
                layout.key()
            );
            layout.set(windows.clone());
        }

        let minimized_store = config.persist_minimized.then(|| {
            PersistedValue::read(
                host.store.clone(),
                config.minimized_key.clone(),
                MinimizedSet::new(),
            )
        });
        let minimized = minimized_store
            .as_ref()
            .map(|store| {
                store
                    .get()
                    .iter()
                    .filter(|id| windows.iter().any(|w| &w.id == *id))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        let defaults = ShellPreferences::default();
        let wallpaper =
            PersistedValue::read(host.store.clone(), config.wallpaper_key.clone(), defaults.wallpaper);
        let font = PersistedValue::read(host.store.clone(), config.font_key.clone(), defaults.font);

        Self {
            config,
            state: DesktopState { windows, minimized },
            layout,
            minimized_store,
            wallpaper,
            font,
            mounted: BTreeSet::new(),
            pending: BTreeMap::new(),
            close_hooks: HashMap::new(),
            bus: AppBus::default(),
            dom_focus_request: None,
        }
    }

    /// Hydrates the manager and installs the built-in apps' close hooks and bus subscriptions.
    pub fn with_builtin_apps(host: &HostServices, config: ShellConfig) -> Self {
        let mut manager = Self::new(host, config);
        apps::install_builtin_wiring(&mut manager);
        manager
    }

    pub fn config(&self) -> &ShellConfig {
        &self.config
    }

    pub fn state(&self) -> &DesktopState {
        &self.state
    }

    /// Topmost open window that is not minimized.
    pub fn focused_app(&self) -> Option<&ApplicationId> {
        self.state.focused_app()
    }

    pub fn bus(&self) -> &AppBus {
        &self.bus
    }

    pub fn bus_mut(&mut self) -> &mut AppBus {
        &mut self.bus
    }

    /// Registers (or replaces) the hook that runs when `app_id` closes or the layout is reset.
    pub fn register_close_hook(&mut self, app_id: ApplicationId, hook: CloseHook) {
        self.close_hooks.insert(app_id, hook);
    }

    /// Applies `action` and executes the resulting effects.
    ///
    /// # Errors
    ///
    /// Returns the reducer error unchanged; state and storage are untouched in that case.
    pub fn dispatch(&mut self, action: DesktopAction) -> Result<(), ReducerError> {
        let mut next = self.state.clone();
        let effects = reduce_desktop(&mut next, &self.config, action)?;
        self.state = next;
        for effect in effects {
            self.run_effect(effect);
        }
        Ok(())
    }

    fn apply(&mut self, action: DesktopAction) {
        if let Err(err) = self.dispatch(action) {
            logging::warn!("window manager rejected action: {err}");
        }
    }

    fn run_effect(&mut self, effect: RuntimeEffect) {
        match effect {
            RuntimeEffect::PersistLayout => {
                self.layout.set(self.state.windows.clone());
            }
            RuntimeEffect::PersistMinimized => {
                if let Some(store) = self.minimized_store.as_mut() {
                    store.set(self.state.minimized.clone());
                }
            }
            RuntimeEffect::PurgeLayout => {
                self.layout.purge();
                if let Some(store) = self.minimized_store.as_mut() {
                    store.purge();
                }
            }
            RuntimeEffect::RunCloseHook(app_id) => {
                if let Some(hook) = self.close_hooks.get_mut(&app_id) {
                    if let Err(err) = hook(&mut self.bus) {
                        logging::error!("close hook for `{app_id}` failed: {err}");
                    }
                }
            }
            RuntimeEffect::ReleaseApp(app_id) => {
                self.pending.remove(&app_id);
                self.mounted.remove(&app_id);
                if self.dom_focus_request.as_ref() == Some(&app_id) {
                    self.dom_focus_request = None;
                }
            }
            RuntimeEffect::FocusWhenMounted(app_id) => {
                if self.mounted.contains(&app_id) {
                    self.apply(DesktopAction::BringToFront { app_id });
                } else {
                    self.defer(app_id, DeferredWork::Focus);
                }
            }
            RuntimeEffect::SelectSettingsTabWhenMounted(tab) => {
                let settings = apps::settings_app_id();
                if self.mounted.contains(&settings) {
                    self.publish_settings_tab(tab);
                } else {
                    self.defer(settings, DeferredWork::SelectSettingsTab(tab));
                }
            }
            RuntimeEffect::FocusWindowInput(app_id) => {
                self.dom_focus_request = Some(app_id);
            }
        }
    }

    fn defer(&mut self, app_id: ApplicationId, work: DeferredWork) {
        let queue = self.pending.entry(app_id).or_default();
        // Only the latest tab request matters.
        if let DeferredWork::SelectSettingsTab(_) = work {
            queue.retain(|queued| !matches!(queued, DeferredWork::SelectSettingsTab(_)));
        }
        if !queue.contains(&work) {
            queue.push(work);
        }
    }

    fn publish_settings_tab(&mut self, tab: SettingsTab) {
        self.bus.publish(
            BusPayload::SettingsTabSelected { tab },
            Some(apps::settings_app_id()),
        );
    }

    /// Records that the window for `app_id` is rendered and runs work deferred until then.
    pub fn window_mounted(&mut self, app_id: &ApplicationId) {
        if !self.state.is_visible(app_id) {
            return;
        }
        self.mounted.insert(app_id.clone());
        for work in self.pending.remove(app_id).unwrap_or_default() {
            match work {
                DeferredWork::Focus => self.apply(DesktopAction::BringToFront {
                    app_id: app_id.clone(),
                }),
                DeferredWork::SelectSettingsTab(tab) => self.publish_settings_tab(tab),
            }
        }
    }

    pub fn window_unmounted(&mut self, app_id: &ApplicationId) {
        self.mounted.remove(app_id);
    }

    /// Takes the window whose content should receive DOM focus next, if any.
    pub fn take_dom_focus_request(&mut self) -> Option<ApplicationId> {
        self.dom_focus_request.take()
    }

    pub fn preferences(&self) -> ShellPreferences {
        ShellPreferences {
            wallpaper: self.wallpaper.get().clone(),
            font: self.font.get().clone(),
        }
    }

    /// Returns `true` when the stored wallpaper changed.
    pub fn set_wallpaper(&mut self, url: impl Into<String>) -> bool {
        let url = url.into();
        self.wallpaper.update(|_| url)
    }

    /// Returns `true` when the stored font changed.
    pub fn set_font(&mut self, font: impl Into<String>) -> bool {
        let font = font.into();
        self.font.update(|_| font)
    }

    /// Restores default preferences and resets the window layout.
    pub fn reset_all_settings(&mut self) {
        self.wallpaper.purge();
        self.font.purge();
        self.reset_all_windows();
    }
}

impl WindowManagerOps for WindowManager {
    fn open_app(&mut self, id: &ApplicationId) {
        self.apply(DesktopAction::OpenApp { app_id: id.clone() });
    }

    fn close_app(&mut self, id: &ApplicationId) {
        self.apply(DesktopAction::CloseApp { app_id: id.clone() });
    }

    fn bring_to_front(&mut self, id: &ApplicationId) {
        self.apply(DesktopAction::BringToFront { app_id: id.clone() });
    }

    fn minimize_app(&mut self, id: &ApplicationId) {
        self.apply(DesktopAction::MinimizeApp { app_id: id.clone() });
    }

    fn update_window(&mut self, id: &ApplicationId, position: WindowPosition, size: WindowSize) {
        self.apply(DesktopAction::UpdateWindow {
            app_id: id.clone(),
            position,
            size,
        });
    }

    fn reset_all_windows(&mut self) {
        self.apply(DesktopAction::ResetAllWindows);
    }

    fn close_all_apps(&mut self) {
        self.apply(DesktopAction::CloseAllApps);
    }

    fn open_settings_tab(&mut self, tab: SettingsTab) {
        self.apply(DesktopAction::OpenSettingsTab { tab });
    }
}

impl std::fmt::Debug for WindowManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WindowManager")
            .field("state", &self.state)
            .field("mounted", &self.mounted)
            .field("pending", &self.pending)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::Cell, rc::Rc};

    use desktop_app_contract::{
        BusTopic, AMBIENT_APP, KANBAN_APP, SETTINGS_APP, TODO_APP, YOUTUBE_APP,
    };
    use platform_host::MemoryKeyValueStore;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::model::{DEFAULT_WALLPAPER_URL, FONT_KEY, WALLPAPER_KEY, WINDOWS_KEY};

    fn id(raw: &str) -> ApplicationId {
        ApplicationId::trusted(raw)
    }

    fn manager_over(store: &MemoryKeyValueStore) -> WindowManager {
        WindowManager::with_builtin_apps(
            &HostServices::memory(store.clone()),
            ShellConfig::default(),
        )
    }

    fn order(manager: &WindowManager) -> Vec<&str> {
        manager.state().windows.iter().map(|w| w.id.as_str()).collect()
    }

    #[test]
    fn open_stagger_focus_close_walkthrough() {
        let store = MemoryKeyValueStore::default();
        let mut manager = manager_over(&store);
        let todo = id(TODO_APP);
        let kanban = id(KANBAN_APP);

        manager.open_app(&todo);
        let todo_entry = manager.state().entry(&todo).cloned().expect("todo open");
        assert_eq!(todo_entry.position, WindowPosition::new(50, 50));
        assert_eq!(todo_entry.size, WindowSize::new(420, 520));

        manager.open_app(&kanban);
        assert_eq!(
            manager.state().entry(&kanban).map(|w| w.position),
            Some(WindowPosition::new(70, 70))
        );

        manager.bring_to_front(&todo);
        assert_eq!(order(&manager), vec!["kanban", "todo"]);

        manager.close_app(&kanban);
        assert_eq!(manager.state().windows, vec![todo_entry]);
    }

    #[test]
    fn minimize_then_reopen_youtube_walkthrough() {
        let store = MemoryKeyValueStore::default();
        let mut manager = manager_over(&store);
        let youtube = id(YOUTUBE_APP);
        manager.open_app(&youtube);
        manager.open_app(&id(TODO_APP));

        manager.minimize_app(&youtube);
        assert!(manager.state().is_open(&youtube));
        assert_eq!(
            manager.state().minimized.iter().collect::<Vec<_>>(),
            vec![&youtube]
        );

        manager.open_app(&youtube);
        assert!(manager.state().minimized.is_empty());
        manager.window_mounted(&youtube);
        assert_eq!(manager.state().windows.last().map(|w| &w.id), Some(&youtube));
        assert_eq!(
            manager.state().windows.iter().filter(|w| w.id == youtube).count(),
            1
        );
    }

    #[test]
    fn repeated_opens_never_duplicate_ids() {
        let store = MemoryKeyValueStore::default();
        let mut manager = manager_over(&store);
        let sequence = [TODO_APP, KANBAN_APP, TODO_APP, TODO_APP, "weather", KANBAN_APP, "weather"];
        for app in sequence {
            manager.open_app(&id(app));
            let ids = manager.state().known_ids();
            assert_eq!(ids.len(), manager.state().windows.len());
        }
        assert_eq!(manager.state().windows.len(), 3);
    }

    #[test]
    fn bring_to_front_twice_matches_once() {
        let store = MemoryKeyValueStore::default();
        let mut manager = manager_over(&store);
        for app in [TODO_APP, KANBAN_APP, YOUTUBE_APP] {
            manager.open_app(&id(app));
        }
        manager.bring_to_front(&id(TODO_APP));
        let once = manager.state().clone();
        let writes = store.write_count();

        manager.bring_to_front(&id(TODO_APP));

        assert_eq!(manager.state(), &once);
        assert_eq!(store.write_count(), writes);
    }

    #[test]
    fn identical_geometry_update_skips_the_write() {
        let store = MemoryKeyValueStore::default();
        let mut manager = manager_over(&store);
        manager.open_app(&id(TODO_APP));
        let entry = manager.state().windows[0].clone();
        let writes = store.write_count();

        manager.update_window(&entry.id, entry.position, entry.size);

        assert_eq!(store.write_count(), writes);
    }

    #[test]
    fn layout_survives_a_reload() {
        let store = MemoryKeyValueStore::default();
        let mut manager = manager_over(&store);
        manager.open_app(&id(TODO_APP));
        manager.open_app(&id(KANBAN_APP));
        manager.update_window(
            &id(TODO_APP),
            WindowPosition::new(5, 6),
            WindowSize::new(500, 400),
        );

        let reloaded = manager_over(&store);
        assert_eq!(reloaded.state().windows, manager.state().windows);
    }

    #[test]
    fn minimized_set_is_session_only_by_default() {
        let store = MemoryKeyValueStore::default();
        let mut manager = manager_over(&store);
        manager.open_app(&id(TODO_APP));
        manager.minimize_app(&id(TODO_APP));

        let reloaded = manager_over(&store);
        assert!(reloaded.state().is_visible(&id(TODO_APP)));
    }

    #[test]
    fn minimized_set_persists_when_configured() {
        let store = MemoryKeyValueStore::default();
        let config = ShellConfig {
            persist_minimized: true,
            ..ShellConfig::default()
        };
        let host = HostServices::memory(store.clone());
        let mut manager = WindowManager::new(&host, config.clone());
        manager.open_app(&id(TODO_APP));
        manager.minimize_app(&id(TODO_APP));

        let reloaded = WindowManager::new(&host, config);
        assert!(reloaded.state().is_minimized(&id(TODO_APP)));
    }

    #[test]
    fn hydration_repairs_duplicates_and_undersized_windows() {
        let store = MemoryKeyValueStore::with_entries([(
            WINDOWS_KEY,
            r#"[
                {"id":"todo","position":{"x":1,"y":1},"size":{"width":100,"height":100}},
                {"id":"BAD ID","position":{"x":0,"y":0},"size":{"width":400,"height":400}},
                {"id":"todo","position":{"x":9,"y":9},"size":{"width":420,"height":520}}
            ]"#,
        )]);
        let manager = manager_over(&store);

        assert_eq!(order(&manager), vec!["todo"]);
        assert_eq!(manager.state().windows[0].position, WindowPosition::new(9, 9));
        let stored = store.raw(WINDOWS_KEY).expect("rewritten");
        assert!(!stored.contains("BAD ID"));
    }

    #[test]
    fn corrupt_layout_boots_empty_and_is_purged() {
        let store = MemoryKeyValueStore::with_entries([(WINDOWS_KEY, "{not json")]);
        let manager = manager_over(&store);
        assert!(manager.state().windows.is_empty());
        assert!(!store.contains(WINDOWS_KEY));
    }

    #[test]
    fn reset_removes_the_stored_layout_key() {
        let store = MemoryKeyValueStore::default();
        let mut manager = manager_over(&store);
        manager.open_app(&id(TODO_APP));
        assert!(store.contains(WINDOWS_KEY));

        manager.reset_all_windows();

        assert_eq!(manager.state(), &DesktopState::default());
        assert!(!store.contains(WINDOWS_KEY));
    }

    #[test]
    fn reset_runs_close_hooks_and_drops_deferred_focus() {
        let store = MemoryKeyValueStore::default();
        let mut manager = manager_over(&store);
        let calls = Rc::new(Cell::new(0));
        let seen = calls.clone();
        manager.register_close_hook(
            id(TODO_APP),
            Box::new(move |_: &mut AppBus| {
                seen.set(seen.get() + 1);
                Ok(())
            }),
        );
        let youtube = id(YOUTUBE_APP);
        manager.open_app(&youtube);
        manager.open_app(&id(TODO_APP));
        manager.minimize_app(&youtube);
        manager.open_app(&youtube);
        assert!(!manager.pending.is_empty());

        manager.reset_all_windows();

        assert_eq!(calls.get(), 1);
        assert!(manager.pending.is_empty());
        assert!(manager.mounted.is_empty());

        manager.open_app(&youtube);
        manager.open_app(&id(TODO_APP));
        manager.window_mounted(&youtube);
        assert_eq!(order(&manager), vec!["youtube", "todo"]);
    }

    #[test]
    fn reset_purges_even_when_memory_is_already_empty() {
        let store = MemoryKeyValueStore::with_entries([(WINDOWS_KEY, "[]")]);
        let mut manager = manager_over(&store);
        manager.reset_all_windows();
        assert!(!store.contains(WINDOWS_KEY));
    }

    #[test]
    fn close_all_leaves_nothing_open_or_minimized() {
        let store = MemoryKeyValueStore::default();
        let mut manager = manager_over(&store);
        for app in [TODO_APP, KANBAN_APP, YOUTUBE_APP] {
            manager.open_app(&id(app));
        }
        manager.minimize_app(&id(KANBAN_APP));

        manager.close_all_apps();

        assert_eq!(manager.state(), &DesktopState::default());
        assert_eq!(store.raw(WINDOWS_KEY).as_deref(), Some("[]"));
    }

    #[test]
    fn failing_close_hook_does_not_block_close() {
        let store = MemoryKeyValueStore::default();
        let mut manager = manager_over(&store);
        let calls = Rc::new(Cell::new(0));
        let seen = calls.clone();
        manager.register_close_hook(
            id(TODO_APP),
            Box::new(move |_: &mut AppBus| {
                seen.set(seen.get() + 1);
                Err("still saving".to_string())
            }),
        );
        manager.open_app(&id(TODO_APP));

        manager.close_app(&id(TODO_APP));

        assert_eq!(calls.get(), 1);
        assert!(!manager.state().is_open(&id(TODO_APP)));
    }

    #[test]
    fn closing_ambient_broadcasts_stop_all() {
        let store = MemoryKeyValueStore::default();
        let mut manager = manager_over(&store);
        let ambient = id(AMBIENT_APP);
        manager.open_app(&ambient);

        manager.close_app(&ambient);

        let events = manager.bus_mut().drain(&ambient);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].topic(), BusTopic::AmbientStopAll);
        assert!(manager.bus().is_subscribed(&ambient, BusTopic::AmbientStopAll));
    }

    #[test]
    fn storage_write_failures_keep_memory_state() {
        let store = MemoryKeyValueStore::default();
        store.fail_writes(true);
        let mut manager = manager_over(&store);

        manager.open_app(&id(TODO_APP));

        assert!(manager.state().is_open(&id(TODO_APP)));
        assert!(!store.contains(WINDOWS_KEY));
    }

    #[test]
    fn restored_window_is_raised_after_mount_ack() {
        let store = MemoryKeyValueStore::default();
        let mut manager = manager_over(&store);
        let youtube = id(YOUTUBE_APP);
        manager.open_app(&youtube);
        manager.window_mounted(&youtube);
        manager.open_app(&id(TODO_APP));
        manager.minimize_app(&youtube);
        manager.window_unmounted(&youtube);

        manager.open_app(&youtube);
        assert!(manager.state().is_visible(&youtube));
        assert_eq!(order(&manager), vec!["youtube", "todo"]);

        manager.window_mounted(&youtube);
        assert_eq!(order(&manager), vec!["todo", "youtube"]);
        assert_eq!(manager.focused_app(), Some(&youtube));
    }

    #[test]
    fn deferred_focus_is_dropped_when_the_window_closes_first() {
        let store = MemoryKeyValueStore::default();
        let mut manager = manager_over(&store);
        let youtube = id(YOUTUBE_APP);
        manager.open_app(&youtube);
        manager.open_app(&id(TODO_APP));
        manager.minimize_app(&youtube);
        manager.open_app(&youtube);

        manager.close_app(&youtube);
        manager.open_app(&youtube);
        manager.open_app(&id(KANBAN_APP));
        manager.window_mounted(&youtube);

        assert_eq!(order(&manager), vec!["todo", "youtube", "kanban"]);
    }

    #[test]
    fn settings_tab_is_broadcast_once_settings_mounts() {
        let store = MemoryKeyValueStore::default();
        let mut manager = manager_over(&store);
        let settings = id(SETTINGS_APP);

        manager.open_settings_tab(SettingsTab::Appearance);
        manager.open_settings_tab(SettingsTab::Font);
        assert_eq!(manager.bus().pending(&settings), 0);

        manager.window_mounted(&settings);
        let events = manager.bus_mut().drain(&settings);
        assert_eq!(events.len(), 1);
        assert_eq!(
            events[0].payload,
            BusPayload::SettingsTabSelected {
                tab: SettingsTab::Font
            }
        );

        manager.open_settings_tab(SettingsTab::About);
        assert_eq!(manager.bus().pending(&settings), 1);
    }

    #[test]
    fn opening_requests_dom_focus() {
        let store = MemoryKeyValueStore::default();
        let mut manager = manager_over(&store);
        manager.open_app(&id(TODO_APP));
        assert_eq!(manager.take_dom_focus_request(), Some(id(TODO_APP)));
        assert_eq!(manager.take_dom_focus_request(), None);
    }

    #[test]
    fn invalid_ids_are_rejected_without_touching_storage() {
        let store = MemoryKeyValueStore::default();
        let mut manager = manager_over(&store);
        let err = manager
            .dispatch(DesktopAction::OpenApp {
                app_id: id("../etc"),
            })
            .expect_err("invalid");
        assert!(matches!(err, ReducerError::InvalidApplicationId(_)));
        assert_eq!(store.write_count(), 0);
    }

    #[test]
    fn preferences_persist_and_reset_to_defaults() {
        let store = MemoryKeyValueStore::default();
        let mut manager = manager_over(&store);
        assert!(manager.set_wallpaper("/wallpapers/forest.jpg"));
        assert!(!manager.set_wallpaper("/wallpapers/forest.jpg"));
        manager.set_font("mono");
        manager.open_app(&id(TODO_APP));

        let reloaded = manager_over(&store);
        assert_eq!(reloaded.preferences().wallpaper, "/wallpapers/forest.jpg");
        assert_eq!(reloaded.preferences().font, "mono");

        manager.reset_all_settings();
        assert_eq!(manager.preferences().wallpaper, DEFAULT_WALLPAPER_URL);
        assert!(!store.contains(WALLPAPER_KEY));
        assert!(!store.contains(FONT_KEY));
        assert!(!store.contains(WINDOWS_KEY));
        assert!(manager.state().windows.is_empty());
    }
}
