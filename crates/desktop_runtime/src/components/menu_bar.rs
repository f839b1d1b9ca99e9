use leptos::*;

use super::use_desktop_runtime;
use crate::{shortcuts::ShellShortcut, surfaces::menu_bar_model};

#[component]
pub(super) fn MenuBar() -> impl IntoView {
    let runtime = use_desktop_runtime();
    let model = move || runtime.state.with(menu_bar_model);

    let entries = move || {
        model()
            .entries
            .into_iter()
            .map(|entry| {
                let action = entry.action;
                view! {
                    <button
                        class="menu-bar-entry"
                        on:click=move |_| {
                            runtime.with_manager(|manager| action.apply(manager));
                        }
                    >
                        {entry.label}
                    </button>
                }
            })
            .collect_view()
    };

    view! {
        <header class="menu-bar" role="menubar">
            <span class="menu-bar-title">{move || model().title}</span>
            <div class="menu-bar-entries">{entries}</div>
            <button
                class="menu-bar-search"
                aria-label="Command palette"
                aria-keyshortcuts=ShellShortcut::ToggleCommandPalette.aria_label()
                on:click=move |_| runtime.palette.update(|palette| palette.toggle())
            >
                "Search"
            </button>
        </header>
    }
}
