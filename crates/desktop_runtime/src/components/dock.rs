use leptos::*;

use super::use_desktop_runtime;
use crate::surfaces::{dock_click_action, dock_items};

#[component]
pub(super) fn Dock() -> impl IntoView {
    let runtime = use_desktop_runtime();
    let state = runtime.state;
    let items = move || state.with(dock_items);

    view! {
        <nav class="dock" aria-label="Dock">
            <For
                each=items
                key=|item| {
                    (item.app_id.clone(), item.open, item.minimized, item.focused)
                }
                children=move |item| {
                    let app_id = item.app_id.clone();
                    let class = format!(
                        "dock-item{}{}{}",
                        if item.open { " open" } else { "" },
                        if item.minimized { " minimized" } else { "" },
                        if item.focused { " focused" } else { "" },
                    );
                    view! {
                        <button
                            class=class
                            title=item.title.clone()
                            aria-label=item.title.clone()
                            aria-pressed=item.focused.to_string()
                            on:click=move |_| {
                                let action = state.with_untracked(|s| dock_click_action(s, &app_id));
                                runtime.dispatch_action(action);
                            }
                        >
                            <span class=format!("app-icon icon-{}", item.icon) aria-hidden="true"></span>
                            <span class="dock-indicator" aria-hidden="true"></span>
                        </button>
                    }
                }
            />
        </nav>
    }
}
