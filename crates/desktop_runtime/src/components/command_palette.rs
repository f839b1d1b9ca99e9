use leptos::*;

use super::{use_desktop_runtime, DesktopRuntimeContext};

fn execute_selected(runtime: DesktopRuntimeContext) {
    let action = runtime
        .palette
        .try_update(|palette| {
            let action = palette.confirm();
            palette.close();
            action
        })
        .flatten();
    if let Some(action) = action {
        runtime.with_manager(|manager| action.apply(manager));
    }
}

#[component]
pub(super) fn CommandPaletteOverlay() -> impl IntoView {
    let runtime = use_desktop_runtime();
    let palette = runtime.palette;
    let input_ref = create_node_ref::<html::Input>();

    create_effect(move |_| {
        if palette.with(|p| p.is_open()) {
            if let Some(input) = input_ref.get() {
                let _ = input.focus();
            }
        }
    });

    let on_keydown = move |ev: web_sys::KeyboardEvent| match ev.key().as_str() {
        "ArrowDown" => {
            ev.prevent_default();
            palette.update(|p| p.select_next());
        }
        "ArrowUp" => {
            ev.prevent_default();
            palette.update(|p| p.select_prev());
        }
        "Enter" => {
            ev.prevent_default();
            execute_selected(runtime);
        }
        "Escape" => {
            ev.prevent_default();
            ev.stop_propagation();
            palette.update(|p| p.close());
        }
        _ => {}
    };

    let results = move || {
        palette.with(|p| {
            let selected = p.selected_index();
            p.visible_items()
                .into_iter()
                .enumerate()
                .map(|(index, command)| (index, command.label.clone(), index == selected))
                .collect::<Vec<_>>()
        })
    };

    view! {
        <Show when=move || palette.with(|p| p.is_open()) fallback=|| ()>
            <div class="command-palette-backdrop" on:click=move |_| palette.update(|p| p.close())>
                <div
                    class="command-palette"
                    role="dialog"
                    aria-label="Command palette"
                    on:click=move |ev| ev.stop_propagation()
                >
                    <input
                        node_ref=input_ref
                        type="text"
                        placeholder="Type a command"
                        prop:value=move || palette.with(|p| p.query().to_string())
                        on:input=move |ev| palette.update(|p| p.set_query(&event_target_value(&ev)))
                        on:keydown=on_keydown
                    />
                    <ul role="listbox">
                        {move || {
                            results()
                                .into_iter()
                                .map(|(index, label, selected)| {
                                    view! {
                                        <li
                                            role="option"
                                            class=if selected { "selected" } else { "" }
                                            aria-selected=selected.to_string()
                                            on:mouseenter=move |_| palette.update(|p| p.select(index))
                                            on:click=move |_| {
                                                palette.update(|p| p.select(index));
                                                execute_selected(runtime);
                                            }
                                        >
                                            {label}
                                        </li>
                                    }
                                })
                                .collect_view()
                        }}
                    </ul>
                </div>
            </div>
        </Show>
    }
}
