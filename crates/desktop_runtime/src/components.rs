//! Desktop shell UI composition: wallpaper, menu bar, window layer, dock, and command palette.

mod app_bodies;
mod command_palette;
mod dock;
mod menu_bar;
mod window;

use desktop_app_contract::{ApplicationId, WindowManagerOps};
use leptos::*;
#[cfg(target_arch = "wasm32")]
use wasm_bindgen::JsCast;

use self::{command_palette::CommandPaletteOverlay, dock::Dock, menu_bar::MenuBar, window::DesktopWindow};
use crate::{
    model::{DesktopState, PointerPosition, Viewport},
    shortcuts::{match_shortcut, KeyChord, ShellShortcut},
};

pub use crate::runtime_context::{use_desktop_runtime, DesktopProvider, DesktopRuntimeContext};

/// Font tokens offered in settings, with the CSS stack each maps to.
pub const FONT_CHOICES: [(&str, &str, &str); 3] = [
    ("inter", "Inter", "Inter, system-ui, sans-serif"),
    ("serif", "Serif", "Georgia, 'Times New Roman', serif"),
    ("mono", "Monospace", "'JetBrains Mono', ui-monospace, monospace"),
];

/// Wallpapers offered in settings.
pub const WALLPAPER_CHOICES: [(&str, &str); 3] = [
    ("Dunes", "/wallpapers/dunes.jpg"),
    ("Forest", "/wallpapers/forest.jpg"),
    ("Night", "/wallpapers/night.jpg"),
];

fn font_stack(token: &str) -> &'static str {
    FONT_CHOICES
        .iter()
        .find(|(id, _, _)| *id == token)
        .map(|(_, _, stack)| *stack)
        .unwrap_or(FONT_CHOICES[0].2)
}

pub(crate) fn window_dom_id(app_id: &ApplicationId) -> String {
    format!("window-{}", app_id.as_str())
}

fn stop_mouse_event(ev: &web_sys::MouseEvent) {
    ev.prevent_default();
    ev.stop_propagation();
}

fn pointer_from_pointer_event(ev: &web_sys::PointerEvent) -> PointerPosition {
    PointerPosition {
        x: ev.client_x(),
        y: ev.client_y(),
    }
}

#[cfg(target_arch = "wasm32")]
fn current_viewport() -> Viewport {
    let size = web_sys::window().and_then(|window| {
        let width = window.inner_width().ok()?.as_f64()?;
        let height = window.inner_height().ok()?.as_f64()?;
        Some(Viewport {
            width: width as i32,
            height: height as i32,
        })
    });
    size.unwrap_or(Viewport {
        width: 1280,
        height: 800,
    })
}

#[cfg(not(target_arch = "wasm32"))]
fn current_viewport() -> Viewport {
    Viewport {
        width: 1280,
        height: 800,
    }
}

/// Moves DOM focus into the window for `app_id` on the next frame.
pub(crate) fn focus_window_element(app_id: ApplicationId) {
    #[cfg(target_arch = "wasm32")]
    request_animation_frame(move || {
        let Some(element) = document().get_element_by_id(&window_dom_id(&app_id)) else {
            return;
        };
        if let Ok(element) = element.dyn_into::<web_sys::HtmlElement>() {
            let _ = element.focus();
        }
    });
    #[cfg(not(target_arch = "wasm32"))]
    let _ = app_id;
}

fn handle_shell_shortcut(runtime: DesktopRuntimeContext, ev: &web_sys::KeyboardEvent) {
    let Some(shortcut) = match_shortcut(&KeyChord::from_event(ev)) else {
        return;
    };
    match shortcut {
        ShellShortcut::ToggleCommandPalette => {
            runtime.palette.update(|palette| palette.toggle());
        }
        ShellShortcut::CloseAllWindows => {
            runtime.with_manager(|manager| manager.close_all_apps());
        }
        ShellShortcut::ResetWorkspace => {
            runtime.with_manager(|manager| manager.reset_all_settings());
        }
        ShellShortcut::CloseFocusedWindow => {
            let Some(app_id) = runtime.state.get_untracked().focused_app().cloned() else {
                return;
            };
            runtime.with_manager(|manager| manager.close_app(&app_id));
        }
        ShellShortcut::Escape => {
            if !runtime.palette.with_untracked(|palette| palette.is_open()) {
                return;
            }
            runtime.palette.update(|palette| palette.close());
        }
    }
    ev.prevent_default();
    ev.stop_propagation();
}

#[component]
/// Root shell view. Must be rendered inside [`DesktopProvider`].
pub fn DesktopShell() -> impl IntoView {
    let runtime = use_desktop_runtime();
    let state = runtime.state;
    let preferences = runtime.preferences;

    let shortcut_listener = window_event_listener(ev::keydown, move |ev| {
        if ev.default_prevented() {
            return;
        }
        handle_shell_shortcut(runtime, &ev);
    });
    on_cleanup(move || shortcut_listener.remove());

    let shell_style = move || {
        let prefs = preferences.get();
        format!(
            "background-image:url('{}');font-family:{};",
            prefs.wallpaper,
            font_stack(&prefs.font)
        )
    };
    let visible_ids = move || state.with(DesktopState::render_order);

    view! {
        <div
            id="desktop-shell-root"
            class="desktop-shell"
            tabindex="-1"
            data-font=move || preferences.get().font
            style=shell_style
        >
            <MenuBar />
            <main class="window-layer" aria-label="Open windows">
                <For each=visible_ids key=|id| id.clone() let:app_id>
                    <DesktopWindow app_id=app_id />
                </For>
            </main>
            <Dock />
            <CommandPaletteOverlay />
        </div>
    }
}
