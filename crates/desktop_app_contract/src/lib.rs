//! Shared contract types between the workspace window manager and the mini-apps it hosts.
//!
//! Mini-apps (todo, kanban, pomodoro, notepad, ambient mixer, playlist player, habits) never
//! touch window state directly. They see application ids, window geometry values, typed bus
//! events, and the [`WindowManagerOps`] operation set defined here.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

use serde::{Deserialize, Serialize};

/// Identifier of the todo list app.
pub const TODO_APP: &str = "todo";
/// Identifier of the kanban board app.
pub const KANBAN_APP: &str = "kanban";
/// Identifier of the pomodoro timer app.
pub const POMODORO_APP: &str = "pomodoro";
/// Identifier of the notepad app.
pub const NOTEPAD_APP: &str = "notepad";
/// Identifier of the ambient sound mixer app.
pub const AMBIENT_APP: &str = "ambient";
/// Identifier of the YouTube playlist player app.
pub const YOUTUBE_APP: &str = "youtube";
/// Identifier of the habit tracker app.
pub const HABITS_APP: &str = "habits";
/// Identifier of the workspace settings app.
pub const SETTINGS_APP: &str = "settings";

/// Stable identifier for a hosted application.
///
/// At most one window exists per id. Deserialization is unchecked so persisted data from older
/// builds still loads; the window manager re-validates before mutating state.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApplicationId(String);

impl ApplicationId {
    /// Returns an app identifier when `raw` is a lowercase `[a-z][a-z0-9-]*` token.
    pub fn new(raw: impl Into<String>) -> Result<Self, String> {
        let raw = raw.into();
        if is_valid_application_id(&raw) {
            Ok(Self(raw))
        } else {
            Err(format!(
                "invalid application id `{raw}`; expected a lowercase token"
            ))
        }
    }

    /// Creates an id without validation for trusted constants.
    pub fn trusted(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Returns the string form of the identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns whether the identifier satisfies the token policy.
    pub fn is_valid(&self) -> bool {
        is_valid_application_id(&self.0)
    }
}

impl std::fmt::Display for ApplicationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

fn is_valid_application_id(raw: &str) -> bool {
    if raw.is_empty() || raw.len() > 32 || raw.ends_with('-') {
        return false;
    }
    let bytes = raw.as_bytes();
    bytes[0].is_ascii_lowercase()
        && bytes
            .iter()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || *b == b'-')
}

/// Top-left screen offset of a window in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct WindowPosition {
    /// Horizontal offset from the viewport's left edge.
    pub x: i32,
    /// Vertical offset from the viewport's top edge.
    pub y: i32,
}

impl WindowPosition {
    /// Creates a position.
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Outer size of a window in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WindowSize {
    /// Window width.
    pub width: i32,
    /// Window height.
    pub height: i32,
}

impl WindowSize {
    /// Creates a size.
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }

    /// Returns the size with each axis raised to at least the given floor.
    pub fn clamped_min(self, floor: WindowSize) -> Self {
        Self {
            width: self.width.max(floor.width),
            height: self.height.max(floor.height),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
/// Tabs exposed by the settings app.
pub enum SettingsTab {
    /// General workspace behavior.
    General,
    /// Theme and appearance.
    Appearance,
    /// Wallpaper picker.
    Wallpaper,
    /// Font picker.
    Font,
    /// Stored data and reset controls.
    Data,
    /// Version and credits.
    About,
}

impl SettingsTab {
    /// All tabs in display order.
    pub const ALL: [SettingsTab; 6] = [
        SettingsTab::General,
        SettingsTab::Appearance,
        SettingsTab::Wallpaper,
        SettingsTab::Font,
        SettingsTab::Data,
        SettingsTab::About,
    ];

    /// Returns the stable token used in bus payloads and palette command ids.
    pub const fn token(self) -> &'static str {
        match self {
            Self::General => "general",
            Self::Appearance => "appearance",
            Self::Wallpaper => "wallpaper",
            Self::Font => "font",
            Self::Data => "data",
            Self::About => "about",
        }
    }

    /// Parses a [`Self::token`] back into a tab.
    pub fn from_token(token: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|tab| tab.token() == token)
    }

    /// Human-readable label.
    pub const fn label(self) -> &'static str {
        match self {
            Self::General => "General",
            Self::Appearance => "Appearance",
            Self::Wallpaper => "Wallpaper",
            Self::Font => "Font",
            Self::Data => "Data",
            Self::About => "About",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
/// Named app-bus topics.
pub enum BusTopic {
    /// The settings app should switch to a tab.
    SettingsTabSelected,
    /// The ambient mixer should stop every playing sound.
    AmbientStopAll,
    /// A habit completion was toggled for a date.
    HabitDateToggled,
    /// The display currency changed.
    CurrencyChanged,
}

impl BusTopic {
    /// Returns the stable topic name.
    pub const fn name(self) -> &'static str {
        match self {
            Self::SettingsTabSelected => "settings.tab-selected",
            Self::AmbientStopAll => "ambient.stop-all",
            Self::HabitDateToggled => "habits.date-toggled",
            Self::CurrencyChanged => "currency.changed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "topic", rename_all = "kebab-case")]
/// Typed payloads carried on the app bus. Each variant belongs to exactly one [`BusTopic`].
pub enum BusPayload {
    /// Payload for [`BusTopic::SettingsTabSelected`].
    SettingsTabSelected {
        /// Tab to show.
        tab: SettingsTab,
    },
    /// Payload for [`BusTopic::AmbientStopAll`].
    AmbientStopAll,
    /// Payload for [`BusTopic::HabitDateToggled`].
    HabitDateToggled {
        /// Habit identifier.
        habit_id: String,
        /// ISO `YYYY-MM-DD` date.
        date: String,
    },
    /// Payload for [`BusTopic::CurrencyChanged`].
    CurrencyChanged {
        /// ISO 4217 currency code.
        currency: String,
    },
}

impl BusPayload {
    /// Returns the topic this payload is published on.
    pub const fn topic(&self) -> BusTopic {
        match self {
            Self::SettingsTabSelected { .. } => BusTopic::SettingsTabSelected,
            Self::AmbientStopAll => BusTopic::AmbientStopAll,
            Self::HabitDateToggled { .. } => BusTopic::HabitDateToggled,
            Self::CurrencyChanged { .. } => BusTopic::CurrencyChanged,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Envelope delivered to app inboxes through the app bus.
pub struct AppEvent {
    /// Envelope schema version.
    pub schema_version: u32,
    /// Typed payload; its topic is [`BusPayload::topic`].
    pub payload: BusPayload,
    /// Publishing app when known. `None` means the shell itself.
    pub source_app_id: Option<ApplicationId>,
    /// Timestamp in unix milliseconds when known.
    pub timestamp_unix_ms: Option<u64>,
}

impl AppEvent {
    /// Creates a v1 envelope.
    pub fn new(payload: BusPayload, source_app_id: Option<ApplicationId>) -> Self {
        Self {
            schema_version: 1,
            payload,
            source_app_id,
            timestamp_unix_ms: None,
        }
    }

    /// Returns the envelope's topic.
    pub fn topic(&self) -> BusTopic {
        self.payload.topic()
    }
}

/// Window-management operations every shell surface and app window may invoke.
///
/// All operations are idempotent from the caller's point of view and never fail: bookkeeping
/// problems are recovered inside the manager.
pub trait WindowManagerOps {
    /// Opens `id`, restoring it when minimized or raising it when already open.
    fn open_app(&mut self, id: &ApplicationId);
    /// Closes `id`, running its close hook first.
    fn close_app(&mut self, id: &ApplicationId);
    /// Raises an open, non-minimized window to the top of the stack.
    fn bring_to_front(&mut self, id: &ApplicationId);
    /// Hides `id` without closing it.
    fn minimize_app(&mut self, id: &ApplicationId);
    /// Replaces the stored geometry of `id`.
    fn update_window(&mut self, id: &ApplicationId, position: WindowPosition, size: WindowSize);
    /// Closes every window and wipes the persisted layout.
    fn reset_all_windows(&mut self);
    /// Closes every open or minimized app.
    fn close_all_apps(&mut self);
    /// Opens the settings app and selects `tab` once it is mounted.
    fn open_settings_tab(&mut self, tab: SettingsTab);
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn application_id_accepts_lowercase_tokens_only() {
        assert!(ApplicationId::new("todo").is_ok());
        assert!(ApplicationId::new("white-noise2").is_ok());
        assert!(ApplicationId::new("").is_err());
        assert!(ApplicationId::new("Todo").is_err());
        assert!(ApplicationId::new("2do").is_err());
        assert!(ApplicationId::new("todo-").is_err());
        assert!(ApplicationId::new("to do").is_err());
        assert!(!ApplicationId::trusted("Bad Id").is_valid());
    }

    #[test]
    fn application_id_serializes_as_bare_string() {
        let id = ApplicationId::trusted(TODO_APP);
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"todo\"");
        let back: ApplicationId = serde_json::from_str("\"kanban\"").unwrap();
        assert_eq!(back.as_str(), KANBAN_APP);
    }

    #[test]
    fn payload_topics_match_variants() {
        let payload = BusPayload::SettingsTabSelected {
            tab: SettingsTab::Font,
        };
        assert_eq!(payload.topic(), BusTopic::SettingsTabSelected);
        assert_eq!(payload.topic().name(), "settings.tab-selected");
        assert_eq!(
            serde_json::to_value(&payload).unwrap(),
            serde_json::json!({ "topic": "settings-tab-selected", "tab": "font" })
        );
        let event = AppEvent::new(BusPayload::AmbientStopAll, None);
        assert_eq!(event.schema_version, 1);
        assert_eq!(event.topic(), BusTopic::AmbientStopAll);
    }

    #[test]
    fn settings_tab_tokens_parse_back() {
        for tab in SettingsTab::ALL {
            assert_eq!(SettingsTab::from_token(tab.token()), Some(tab));
        }
        assert_eq!(SettingsTab::from_token("Font"), None);
    }

    #[test]
    fn size_floor_clamps_each_axis() {
        let floor = WindowSize::new(300, 200);
        assert_eq!(
            WindowSize::new(120, 480).clamped_min(floor),
            WindowSize::new(300, 480)
        );
        assert_eq!(
            WindowSize::new(640, -5).clamped_min(floor),
            WindowSize::new(640, 200)
        );
    }
}
