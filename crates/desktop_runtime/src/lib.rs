//! Window manager and shell runtime for the browser workspace.

pub mod app_bus;
pub mod apps;
pub mod components;
pub mod interaction;
pub mod manager;
pub mod model;
pub mod palette;
pub mod persistence;
pub mod reducer;
pub mod runtime_context;
pub mod shortcuts;
pub mod surfaces;
pub mod throttle;
pub mod window_manager;

pub use app_bus::AppBus;
pub use components::{use_desktop_runtime, DesktopProvider, DesktopRuntimeContext, DesktopShell};
pub use interaction::{ControllerCommand, InteractionController, InteractionPhase, SnapGuide};
pub use manager::{CloseHook, WindowManager};
pub use model::*;
pub use palette::{CommandPalette, PaletteAction, PaletteCommand};
pub use persistence::{PersistedValue, SubscriptionId};
pub use reducer::{reduce_desktop, DesktopAction, ReducerError, RuntimeEffect};
pub use shortcuts::{match_shortcut, KeyChord, ShellShortcut};
