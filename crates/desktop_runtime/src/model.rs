use std::collections::BTreeSet;

use desktop_app_contract::{ApplicationId, WindowPosition, WindowSize};
use serde::{Deserialize, Serialize};

pub const MIN_WINDOW_WIDTH: i32 = 300;
pub const MIN_WINDOW_HEIGHT: i32 = 200;
pub const MIN_WINDOW_SIZE: WindowSize = WindowSize::new(MIN_WINDOW_WIDTH, MIN_WINDOW_HEIGHT);
pub const GENERIC_WINDOW_SIZE: WindowSize = WindowSize::new(600, 400);
pub const GENERIC_APP_TITLE: &str = "App";
pub const STAGGER_BASE_PX: i32 = 50;
pub const STAGGER_STEP_PX: i32 = 20;
pub const SNAP_THRESHOLD_PX: i32 = 20;
pub const GUIDE_RECOMPUTE_PX: i32 = 5;
pub const COMMIT_INTERVAL_MS: u64 = 100;

pub const WINDOWS_KEY: &str = "deskspace.windows.v1";
pub const MINIMIZED_KEY: &str = "deskspace.minimized.v1";
pub const WALLPAPER_KEY: &str = "deskspace.wallpaper.v1";
pub const FONT_KEY: &str = "deskspace.font.v1";

pub const DEFAULT_WALLPAPER_URL: &str = "/wallpapers/dunes.jpg";
pub const DEFAULT_FONT: &str = "inter";

/// One open application window. Stack order is the entry's index in [`DesktopState::windows`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowEntry {
    pub id: ApplicationId,
    pub position: WindowPosition,
    pub size: WindowSize,
}

impl WindowEntry {
    pub fn geometry(&self) -> WindowGeometry {
        WindowGeometry {
            position: self.position,
            size: self.size,
        }
    }
}

/// Ids hidden from view but still present in the window collection.
pub type MinimizedSet = BTreeSet<ApplicationId>;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DesktopState {
    /// Bottom-most first; the last entry is on top.
    pub windows: Vec<WindowEntry>,
    pub minimized: MinimizedSet,
}

impl DesktopState {
    pub fn entry(&self, id: &ApplicationId) -> Option<&WindowEntry> {
        self.windows.iter().find(|w| &w.id == id)
    }

    pub fn is_open(&self, id: &ApplicationId) -> bool {
        self.entry(id).is_some()
    }

    pub fn is_minimized(&self, id: &ApplicationId) -> bool {
        self.minimized.contains(id)
    }

    pub fn is_visible(&self, id: &ApplicationId) -> bool {
        self.is_open(id) && !self.is_minimized(id)
    }

    /// Stack index of `id`, `0` being the bottom.
    pub fn z_index(&self, id: &ApplicationId) -> Option<usize> {
        self.windows.iter().position(|w| &w.id == id)
    }

    /// The topmost window that is not minimized.
    pub fn focused_app(&self) -> Option<&ApplicationId> {
        self.windows
            .iter()
            .rev()
            .find(|w| !self.minimized.contains(&w.id))
            .map(|w| &w.id)
    }

    pub fn visible_windows(&self) -> impl Iterator<Item = &WindowEntry> + '_ {
        self.windows
            .iter()
            .filter(|w| !self.minimized.contains(&w.id))
    }

    /// Visible ids sorted by id. Unaffected by restacking, so rendered windows keep their DOM
    /// position and stacking comes from [`DesktopState::z_index`] alone.
    pub fn render_order(&self) -> Vec<ApplicationId> {
        let mut ids: Vec<ApplicationId> = self.visible_windows().map(|w| w.id.clone()).collect();
        ids.sort();
        ids
    }

    /// Open ids plus minimized ids, deduplicated.
    pub fn known_ids(&self) -> BTreeSet<ApplicationId> {
        self.windows
            .iter()
            .map(|w| w.id.clone())
            .chain(self.minimized.iter().cloned())
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowGeometry {
    pub position: WindowPosition,
    pub size: WindowSize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointerPosition {
    pub x: i32,
    pub y: i32,
}

impl PointerPosition {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Size of the area windows are laid out in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: i32,
    pub height: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResizeDirection {
    Right,
    Bottom,
    Corner,
}

impl ResizeDirection {
    pub const ALL: [ResizeDirection; 3] = [Self::Right, Self::Bottom, Self::Corner];

    pub fn resizes_width(self) -> bool {
        matches!(self, Self::Right | Self::Corner)
    }

    pub fn resizes_height(self) -> bool {
        matches!(self, Self::Bottom | Self::Corner)
    }

    pub fn css_class(self) -> &'static str {
        match self {
            Self::Right => "resize-right",
            Self::Bottom => "resize-bottom",
            Self::Corner => "resize-corner",
        }
    }
}

/// Runtime tunables. Every field has a default so partial configs deserialize.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShellConfig {
    pub windows_key: String,
    pub minimized_key: String,
    pub wallpaper_key: String,
    pub font_key: String,
    /// Keep the minimized set across reloads. Off by default: minimizing is session state.
    pub persist_minimized: bool,
    pub min_size: WindowSize,
    pub generic_size: WindowSize,
    pub stagger_base_px: i32,
    pub stagger_step_px: i32,
    pub snap_threshold_px: i32,
    pub guide_recompute_px: i32,
    pub commit_interval_ms: u64,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            windows_key: WINDOWS_KEY.to_string(),
            minimized_key: MINIMIZED_KEY.to_string(),
            wallpaper_key: WALLPAPER_KEY.to_string(),
            font_key: FONT_KEY.to_string(),
            persist_minimized: false,
            min_size: MIN_WINDOW_SIZE,
            generic_size: GENERIC_WINDOW_SIZE,
            stagger_base_px: STAGGER_BASE_PX,
            stagger_step_px: STAGGER_STEP_PX,
            snap_threshold_px: SNAP_THRESHOLD_PX,
            guide_recompute_px: GUIDE_RECOMPUTE_PX,
            commit_interval_ms: COMMIT_INTERVAL_MS,
        }
    }
}

/// Appearance preferences persisted beside the window layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShellPreferences {
    pub wallpaper: String,
    pub font: String,
}

impl Default for ShellPreferences {
    fn default() -> Self {
        Self {
            wallpaper: DEFAULT_WALLPAPER_URL.to_string(),
            font: DEFAULT_FONT.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn entry(id: &str) -> WindowEntry {
        WindowEntry {
            id: ApplicationId::trusted(id),
            position: WindowPosition::new(50, 50),
            size: WindowSize::new(400, 300),
        }
    }

    #[test]
    fn focused_app_skips_minimized_windows() {
        let mut state = DesktopState {
            windows: vec![entry("todo"), entry("kanban"), entry("youtube")],
            ..DesktopState::default()
        };
        assert_eq!(state.focused_app().map(|id| id.as_str()), Some("youtube"));

        state.minimized.insert(ApplicationId::trusted("youtube"));
        assert_eq!(state.focused_app().map(|id| id.as_str()), Some("kanban"));
        assert_eq!(state.visible_windows().count(), 2);
        assert!(state.is_open(&ApplicationId::trusted("youtube")));
        assert!(!state.is_visible(&ApplicationId::trusted("youtube")));
    }

    #[test]
    fn render_order_ignores_restacking() {
        let mut state = DesktopState {
            windows: vec![entry("youtube"), entry("todo"), entry("kanban")],
            ..DesktopState::default()
        };
        let before = state.render_order();

        let raised = state.windows.remove(0);
        state.windows.push(raised);

        assert_eq!(state.render_order(), before);
        assert_eq!(
            before.iter().map(|id| id.as_str()).collect::<Vec<_>>(),
            vec!["kanban", "todo", "youtube"]
        );
        assert_eq!(state.z_index(&ApplicationId::trusted("youtube")), Some(2));

        state.minimized.insert(ApplicationId::trusted("todo"));
        assert_eq!(state.render_order().len(), 2);
    }

    #[test]
    fn window_entry_serializes_with_nested_geometry() {
        let json = serde_json::to_value(entry("todo")).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "id": "todo",
                "position": { "x": 50, "y": 50 },
                "size": { "width": 400, "height": 300 }
            })
        );
    }

    #[test]
    fn partial_shell_config_fills_defaults() {
        let config: ShellConfig =
            serde_json::from_str(r#"{ "persist_minimized": true, "snap_threshold_px": 12 }"#)
                .unwrap();
        assert!(config.persist_minimized);
        assert_eq!(config.snap_threshold_px, 12);
        assert_eq!(config.min_size, MIN_WINDOW_SIZE);
        assert_eq!(config.windows_key, WINDOWS_KEY);
    }
}
