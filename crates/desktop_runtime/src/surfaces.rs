//! View models for the dock and the menu bar.

use desktop_app_contract::{ApplicationId, SettingsTab};

use crate::{
    apps,
    model::DesktopState,
    palette::PaletteAction,
    reducer::DesktopAction,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DockItem {
    pub app_id: ApplicationId,
    pub title: String,
    pub icon: String,
    pub open: bool,
    pub minimized: bool,
    pub focused: bool,
}

/// Dock entries in catalog order.
pub fn dock_items(state: &DesktopState) -> Vec<DockItem> {
    let focused = state.focused_app();
    apps::catalog()
        .dock_apps()
        .map(|app| DockItem {
            app_id: app.app_id.clone(),
            title: app.title.clone(),
            icon: app.icon.clone(),
            open: state.is_open(&app.app_id),
            minimized: state.is_minimized(&app.app_id),
            focused: focused == Some(&app.app_id),
        })
        .collect()
}

/// What a dock click does: the focused, visible app minimizes; anything else opens (which
/// also restores and raises).
pub fn dock_click_action(state: &DesktopState, app_id: &ApplicationId) -> DesktopAction {
    if state.focused_app() == Some(app_id) {
        DesktopAction::MinimizeApp {
            app_id: app_id.clone(),
        }
    } else {
        DesktopAction::OpenApp {
            app_id: app_id.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuEntry {
    pub label: &'static str,
    pub action: PaletteAction,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuBarModel {
    /// Title of the focused app, or the workspace name when nothing is focused.
    pub title: String,
    pub focused_app: Option<ApplicationId>,
    pub entries: Vec<MenuEntry>,
}

pub const WORKSPACE_TITLE: &str = "Deskspace";

pub fn menu_bar_model(state: &DesktopState) -> MenuBarModel {
    let focused_app = state.focused_app().cloned();
    let title = focused_app
        .as_ref()
        .map(|id| apps::app_title(id).to_string())
        .unwrap_or_else(|| WORKSPACE_TITLE.to_string());
    MenuBarModel {
        title,
        focused_app,
        entries: vec![
            MenuEntry {
                label: "Settings",
                action: PaletteAction::OpenSettingsTab(SettingsTab::General),
            },
            MenuEntry {
                label: "Close all",
                action: PaletteAction::CloseAllWindows,
            },
            MenuEntry {
                label: "Reset",
                action: PaletteAction::ResetWorkspace,
            },
        ],
    }
}

#[cfg(test)]
mod tests {
    use desktop_app_contract::{KANBAN_APP, TODO_APP, WindowPosition, WindowSize};
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::model::WindowEntry;

    fn entry(raw: &str) -> WindowEntry {
        WindowEntry {
            id: ApplicationId::trusted(raw),
            position: WindowPosition::new(0, 0),
            size: WindowSize::new(400, 300),
        }
    }

    fn state_with(open: &[&str], minimized: &[&str]) -> DesktopState {
        DesktopState {
            windows: open.iter().map(|id| entry(id)).collect(),
            minimized: minimized.iter().map(|id| ApplicationId::trusted(*id)).collect(),
        }
    }

    #[test]
    fn dock_flags_open_minimized_and_focused_apps() {
        let state = state_with(&[TODO_APP, KANBAN_APP], &[KANBAN_APP]);
        let items = dock_items(&state);

        let todo = items.iter().find(|i| i.app_id.as_str() == TODO_APP).expect("todo");
        assert!(todo.open && todo.focused && !todo.minimized);
        let kanban = items.iter().find(|i| i.app_id.as_str() == KANBAN_APP).expect("kanban");
        assert!(kanban.open && kanban.minimized && !kanban.focused);
        assert!(items.iter().all(|i| i.app_id.as_str() != "settings"));
    }

    #[test]
    fn dock_click_minimizes_only_the_focused_app() {
        let state = state_with(&[TODO_APP, KANBAN_APP], &[]);
        let kanban = ApplicationId::trusted(KANBAN_APP);
        let todo = ApplicationId::trusted(TODO_APP);

        assert_eq!(
            dock_click_action(&state, &kanban),
            DesktopAction::MinimizeApp {
                app_id: kanban.clone()
            }
        );
        assert_eq!(
            dock_click_action(&state, &todo),
            DesktopAction::OpenApp { app_id: todo }
        );

        let minimized = state_with(&[TODO_APP, KANBAN_APP], &[KANBAN_APP]);
        assert_eq!(
            dock_click_action(&minimized, &kanban),
            DesktopAction::OpenApp { app_id: kanban }
        );
    }

    #[test]
    fn menu_bar_names_the_focused_app() {
        assert_eq!(menu_bar_model(&DesktopState::default()).title, WORKSPACE_TITLE);
        let state = state_with(&[KANBAN_APP, TODO_APP], &[TODO_APP]);
        assert_eq!(menu_bar_model(&state).title, "Kanban");
    }
}
