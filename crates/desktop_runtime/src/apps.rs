//! Hosted-application catalog and the shell-side wiring for apps with background behavior.

use std::sync::OnceLock;

use desktop_app_contract::{
    ApplicationId, BusPayload, BusTopic, WindowSize, AMBIENT_APP, SETTINGS_APP,
};
use leptos::logging;
use serde::Deserialize;

use crate::{app_bus::AppBus, manager::WindowManager, model::GENERIC_APP_TITLE};

include!(concat!(env!("OUT_DIR"), "/app_catalog_generated.rs"));

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AppDescriptor {
    pub app_id: ApplicationId,
    pub title: String,
    pub icon: String,
    pub show_in_dock: bool,
    pub keywords: Vec<String>,
    pub window_defaults: WindowSize,
}

#[derive(Debug, Default)]
pub struct AppCatalog {
    apps: Vec<AppDescriptor>,
}

impl AppCatalog {
    fn parse(raw: &str) -> Self {
        match serde_json::from_str::<Vec<AppDescriptor>>(raw) {
            Ok(apps) => Self { apps },
            Err(err) => {
                logging::error!("app catalog failed to parse: {err}");
                Self::default()
            }
        }
    }

    pub fn apps(&self) -> &[AppDescriptor] {
        &self.apps
    }

    pub fn descriptor(&self, id: &ApplicationId) -> Option<&AppDescriptor> {
        self.apps.iter().find(|app| &app.app_id == id)
    }

    pub fn dock_apps(&self) -> impl Iterator<Item = &AppDescriptor> + '_ {
        self.apps.iter().filter(|app| app.show_in_dock)
    }
}

pub fn catalog() -> &'static AppCatalog {
    static CATALOG: OnceLock<AppCatalog> = OnceLock::new();
    CATALOG.get_or_init(|| AppCatalog::parse(APP_CATALOG_JSON))
}

/// Title for `id`, or the generic "App" title for ids outside the catalog.
pub fn app_title(id: &ApplicationId) -> &'static str {
    catalog()
        .descriptor(id)
        .map(|app| app.title.as_str())
        .unwrap_or(GENERIC_APP_TITLE)
}

pub fn app_icon(id: &ApplicationId) -> &'static str {
    catalog()
        .descriptor(id)
        .map(|app| app.icon.as_str())
        .unwrap_or("app")
}

/// Catalog default size for `id`, falling back to `generic`.
pub fn default_window_size(id: &ApplicationId, generic: WindowSize) -> WindowSize {
    match catalog().descriptor(id) {
        Some(app) => app.window_defaults,
        None => {
            logging::warn!("no catalog entry for `{id}`, using generic window defaults");
            generic
        }
    }
}

pub fn settings_app_id() -> ApplicationId {
    ApplicationId::trusted(SETTINGS_APP)
}

/// Registers close hooks and bus subscriptions for apps that outlive their window.
pub fn install_builtin_wiring(manager: &mut WindowManager) {
    let ambient = ApplicationId::trusted(AMBIENT_APP);
    manager
        .bus_mut()
        .subscribe(&ambient, BusTopic::AmbientStopAll);
    manager.register_close_hook(
        ambient,
        Box::new(|bus: &mut AppBus| {
            bus.publish(BusPayload::AmbientStopAll, None);
            Ok(())
        }),
    );

    manager
        .bus_mut()
        .subscribe(&settings_app_id(), BusTopic::SettingsTabSelected);
}

#[cfg(test)]
mod tests {
    use desktop_app_contract::{KANBAN_APP, TODO_APP, YOUTUBE_APP};
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::model::GENERIC_WINDOW_SIZE;

    #[test]
    fn catalog_lists_every_hosted_app_once() {
        let ids: Vec<&str> = catalog().apps().iter().map(|a| a.app_id.as_str()).collect();
        assert_eq!(
            ids,
            vec![
                "todo", "kanban", "pomodoro", "notepad", "ambient", "youtube", "habits",
                "settings"
            ]
        );
        assert!(catalog().dock_apps().all(|a| a.app_id.as_str() != SETTINGS_APP));
    }

    #[test]
    fn known_apps_use_catalog_defaults() {
        assert_eq!(
            default_window_size(&ApplicationId::trusted(TODO_APP), GENERIC_WINDOW_SIZE),
            WindowSize::new(420, 520)
        );
        assert_eq!(
            default_window_size(&ApplicationId::trusted(KANBAN_APP), GENERIC_WINDOW_SIZE),
            WindowSize::new(820, 520)
        );
        assert_eq!(app_title(&ApplicationId::trusted(YOUTUBE_APP)), "YouTube Playlist");
    }

    #[test]
    fn unknown_apps_fall_back_to_generic_descriptor() {
        let id = ApplicationId::trusted("weather");
        assert_eq!(app_title(&id), "App");
        assert_eq!(app_icon(&id), "app");
        assert_eq!(default_window_size(&id, GENERIC_WINDOW_SIZE), GENERIC_WINDOW_SIZE);
    }

    #[test]
    fn corrupt_catalog_json_yields_empty_catalog() {
        assert!(AppCatalog::parse("{not json").apps().is_empty());
    }
}
