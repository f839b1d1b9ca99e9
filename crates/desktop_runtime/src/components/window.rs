use std::time::Duration;

use desktop_app_contract::{ApplicationId, WindowManagerOps};
use leptos::leptos_dom::helpers::WindowListenerHandle;
use leptos::*;
#[cfg(target_arch = "wasm32")]
use wasm_bindgen::JsCast;

use super::{
    app_bodies::WindowBody, current_viewport, pointer_from_pointer_event, stop_mouse_event,
    use_desktop_runtime, window_dom_id, DesktopRuntimeContext,
};
use crate::{
    apps,
    interaction::{ControllerCommand, InteractionController, SnapGuide},
    model::{ResizeDirection, WindowGeometry},
};

#[cfg(target_arch = "wasm32")]
fn try_set_pointer_capture(ev: &web_sys::PointerEvent) {
    if let Some(target) = ev.current_target() {
        if let Ok(element) = target.dyn_into::<web_sys::Element>() {
            let _ = element.set_pointer_capture(ev.pointer_id());
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn try_set_pointer_capture(_: &web_sys::PointerEvent) {}

fn is_primary_press(ev: &web_sys::PointerEvent) -> bool {
    if ev.pointer_type() == "mouse" {
        ev.button() == 0
    } else {
        ev.is_primary()
    }
}

fn snap_guide_class(guide: SnapGuide) -> &'static str {
    match guide {
        SnapGuide::Left => "snap-guide snap-guide-left",
        SnapGuide::Top => "snap-guide snap-guide-top",
        SnapGuide::CenterX => "snap-guide snap-guide-center-x",
    }
}

/// Reactive handles for one window's drag/resize gesture.
///
/// Global pointer and blur listeners exist only between gesture start and end.
#[derive(Clone, Copy)]
struct Gesture {
    app_id: StoredValue<ApplicationId>,
    controller: StoredValue<InteractionController>,
    geometry: RwSignal<WindowGeometry>,
    guides: RwSignal<Vec<SnapGuide>>,
    listeners: StoredValue<Vec<WindowListenerHandle>>,
    trailing_scheduled: StoredValue<bool>,
}

impl Gesture {
    fn refresh(self) {
        let Some((geometry, guides)) = self
            .controller
            .try_with_value(|c| (c.geometry(), c.guides().to_vec()))
        else {
            return;
        };
        if self.geometry.try_get_untracked() != Some(geometry) {
            let _ = self.geometry.try_set(geometry);
        }
        if self
            .guides
            .try_with_untracked(|current| current != &guides)
            .unwrap_or(false)
        {
            let _ = self.guides.try_set(guides);
        }
    }

    fn apply(self, runtime: DesktopRuntimeContext, command: Option<ControllerCommand>) {
        self.refresh();
        let (Some(command), Some(app_id)) = (command, self.app_id.try_get_value()) else {
            return;
        };
        match command {
            ControllerCommand::BringToFront => {
                runtime.with_manager(|manager| manager.bring_to_front(&app_id));
            }
            ControllerCommand::UpdateWindow(geometry) => {
                runtime.with_manager(|manager| {
                    manager.update_window(&app_id, geometry.position, geometry.size)
                });
            }
        }
    }

    fn begin(self, runtime: DesktopRuntimeContext, command: Option<ControllerCommand>) {
        // `None` means another gesture already owns the window.
        if command.is_none() {
            return;
        }
        self.install_listeners(runtime);
        self.apply(runtime, command);
    }

    fn install_listeners(self, runtime: DesktopRuntimeContext) {
        let pointer_move = window_event_listener(ev::pointermove, move |ev| {
            let pointer = pointer_from_pointer_event(&ev);
            let viewport = current_viewport();
            let now_ms = runtime.now_ms();
            let command = self
                .controller
                .try_update_value(|c| c.pointer_move(pointer, viewport, now_ms))
                .flatten();
            self.apply(runtime, command);
            self.schedule_trailing(runtime);
        });
        let pointer_up = window_event_listener(ev::pointerup, move |_| self.end(runtime));
        let pointer_cancel = window_event_listener(ev::pointercancel, move |_| self.end(runtime));
        // A release outside the browser never arrives; losing focus ends the gesture instead.
        let blur = window_event_listener(ev::blur, move |_| self.end(runtime));

        self.listeners.update_value(|listeners| {
            listeners.extend([pointer_move, pointer_up, pointer_cancel, blur]);
        });
    }

    fn end(self, runtime: DesktopRuntimeContext) {
        let command = self.controller.try_update_value(|c| c.pointer_up()).flatten();
        self.remove_listeners();
        self.apply(runtime, command);
    }

    fn remove_listeners(self) {
        let listeners = self
            .listeners
            .try_update_value(std::mem::take)
            .unwrap_or_default();
        for listener in listeners {
            listener.remove();
        }
    }

    fn schedule_trailing(self, runtime: DesktopRuntimeContext) {
        let Some(deadline) = self
            .controller
            .try_with_value(|c| c.trailing_deadline())
            .flatten()
        else {
            return;
        };
        if self.trailing_scheduled.try_get_value().unwrap_or(true) {
            return;
        }
        self.trailing_scheduled.set_value(true);

        let delay = deadline.saturating_sub(runtime.now_ms());
        set_timeout(
            move || {
                if self.trailing_scheduled.try_update_value(|s| *s = false).is_none() {
                    return;
                }
                let now_ms = runtime.now_ms();
                let command = self
                    .controller
                    .try_update_value(|c| c.poll_trailing(now_ms))
                    .flatten();
                if command.is_some() {
                    self.apply(runtime, command);
                }
                self.schedule_trailing(runtime);
            },
            Duration::from_millis(delay),
        );
    }
}

#[component]
pub(super) fn DesktopWindow(app_id: ApplicationId) -> impl IntoView {
    let runtime = use_desktop_runtime();
    let state = runtime.state;

    let initial = state
        .with_untracked(|s| s.entry(&app_id).map(|entry| entry.geometry()))
        .unwrap_or(WindowGeometry {
            position: Default::default(),
            size: runtime.config().generic_size,
        });
    let gesture = Gesture {
        app_id: store_value(app_id.clone()),
        controller: store_value(InteractionController::new(initial, &runtime.config())),
        geometry: create_rw_signal(initial),
        guides: create_rw_signal(Vec::new()),
        listeners: store_value(Vec::new()),
        trailing_scheduled: store_value(false),
    };

    let synced_id = app_id.clone();
    create_effect(move |_| {
        let Some(geometry) = state.with(|s| s.entry(&synced_id).map(|entry| entry.geometry()))
        else {
            return;
        };
        gesture.controller.update_value(|c| c.sync_geometry(geometry));
        gesture.refresh();
    });

    let mounted_id = app_id.clone();
    request_animation_frame(move || {
        runtime.with_manager(|manager| manager.window_mounted(&mounted_id));
    });
    let unmounted_id = app_id.clone();
    on_cleanup(move || {
        gesture.remove_listeners();
        runtime.with_manager(|manager| manager.window_unmounted(&unmounted_id));
    });

    let z_id = app_id.clone();
    let style = move || {
        let geometry = gesture.geometry.get();
        let z_index = state.with(|s| s.z_index(&z_id)).unwrap_or(0);
        format!(
            "left:{}px;top:{}px;width:{}px;height:{}px;z-index:{};",
            geometry.position.x,
            geometry.position.y,
            geometry.size.width,
            geometry.size.height,
            z_index + 10
        )
    };
    let focused_id = app_id.clone();
    let is_focused = move || state.with(|s| s.focused_app() == Some(&focused_id));

    let focus_id = app_id.clone();
    let focus = move |_: web_sys::PointerEvent| {
        let raised = state.with_untracked(|s| s.focused_app() == Some(&focus_id));
        if !raised {
            runtime.with_manager(|manager| manager.bring_to_front(&focus_id));
        }
    };
    let escape_id = app_id.clone();
    let close_on_escape = move |ev: web_sys::KeyboardEvent| {
        if ev.default_prevented() || ev.key() != "Escape" {
            return;
        }
        ev.prevent_default();
        ev.stop_propagation();
        runtime.with_manager(|manager| manager.close_app(&escape_id));
    };
    let begin_drag = move |ev: web_sys::PointerEvent| {
        if !is_primary_press(&ev) {
            return;
        }
        try_set_pointer_capture(&ev);
        ev.prevent_default();
        ev.stop_propagation();
        let pointer = pointer_from_pointer_event(&ev);
        let command = gesture
            .controller
            .try_update_value(|c| c.begin_drag(pointer))
            .flatten();
        gesture.begin(runtime, command);
    };
    let minimize_id = app_id.clone();
    let minimize = move |ev: web_sys::MouseEvent| {
        stop_mouse_event(&ev);
        runtime.with_manager(|manager| manager.minimize_app(&minimize_id));
    };
    let close_id = app_id.clone();
    let close = move |ev: web_sys::MouseEvent| {
        stop_mouse_event(&ev);
        runtime.with_manager(|manager| manager.close_app(&close_id));
    };

    let resize_handles = ResizeDirection::ALL
        .into_iter()
        .map(|direction| {
            let begin_resize = move |ev: web_sys::PointerEvent| {
                if !is_primary_press(&ev) {
                    return;
                }
                try_set_pointer_capture(&ev);
                ev.prevent_default();
                ev.stop_propagation();
                let pointer = pointer_from_pointer_event(&ev);
                let command = gesture
                    .controller
                    .try_update_value(|c| c.begin_resize(direction, pointer))
                    .flatten();
                gesture.begin(runtime, command);
            };
            view! {
                <div
                    class=format!("window-resize-handle {}", direction.css_class())
                    aria-hidden="true"
                    on:pointerdown=begin_resize
                />
            }
        })
        .collect_view();

    let title = apps::app_title(&app_id);
    let icon = apps::app_icon(&app_id);

    view! {
        <section
            id=window_dom_id(&app_id)
            class=move || if is_focused() { "desktop-window focused" } else { "desktop-window" }
            style=style
            role="dialog"
            aria-label=title
            tabindex="-1"
            data-app-id=app_id.to_string()
            on:pointerdown=focus
            on:keydown=close_on_escape
        >
            <header class="titlebar" on:pointerdown=begin_drag>
                <span class=format!("app-icon icon-{icon}") aria-hidden="true"></span>
                <span class="titlebar-title">{title}</span>
                <div class="titlebar-controls">
                    <button
                        aria-label="Minimize window"
                        on:pointerdown=move |ev: web_sys::PointerEvent| ev.stop_propagation()
                        on:click=minimize
                    >
                        "_"
                    </button>
                    <button
                        aria-label="Close window"
                        on:pointerdown=move |ev: web_sys::PointerEvent| ev.stop_propagation()
                        on:click=close
                    >
                        "×"
                    </button>
                </div>
            </header>
            <div class="window-body">
                <WindowBody app_id=app_id.clone() />
            </div>
            {resize_handles}
            <For
                each=move || gesture.guides.get()
                key=|guide| *guide
                children=move |guide| view! { <div class=snap_guide_class(guide) aria-hidden="true" /> }
            />
        </section>
    }
}
