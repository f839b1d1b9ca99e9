//! Window bodies. Mini-app business logic lives outside the shell; each app gets a placeholder
//! body, except settings and ambient sounds, which react to bus events.

use desktop_app_contract::{
    AppEvent, ApplicationId, BusPayload, SettingsTab, WindowManagerOps, AMBIENT_APP, SETTINGS_APP,
};
use leptos::*;

use super::{use_desktop_runtime, DesktopRuntimeContext, FONT_CHOICES, WALLPAPER_CHOICES};
use crate::apps;

/// Drains `app_id`'s inbox whenever the bus delivers something.
fn on_bus_events(
    runtime: DesktopRuntimeContext,
    app_id: ApplicationId,
    handler: impl Fn(Vec<AppEvent>) + 'static,
) {
    create_effect(move |_| {
        runtime.bus_revision.track();
        let events = runtime
            .manager
            .try_update_value(|manager| manager.bus_mut().drain(&app_id))
            .unwrap_or_default();
        if !events.is_empty() {
            handler(events);
        }
    });
}

#[component]
pub(super) fn WindowBody(app_id: ApplicationId) -> impl IntoView {
    match app_id.as_str() {
        SETTINGS_APP => view! { <SettingsBody /> }.into_view(),
        AMBIENT_APP => view! { <AmbientBody /> }.into_view(),
        _ => {
            let title = apps::app_title(&app_id);
            view! {
                <div class="app-placeholder" data-app-id=app_id.to_string()>
                    <h2>{title}</h2>
                    <p>"This app runs in its own module."</p>
                </div>
            }
            .into_view()
        }
    }
}

#[component]
fn SettingsBody() -> impl IntoView {
    let runtime = use_desktop_runtime();
    let selected = create_rw_signal(SettingsTab::General);

    on_bus_events(runtime, apps::settings_app_id(), move |events| {
        let latest = events.into_iter().rev().find_map(|event| match event.payload {
            BusPayload::SettingsTabSelected { tab } => Some(tab),
            _ => None,
        });
        if let Some(tab) = latest {
            selected.set(tab);
        }
    });

    let tabs = SettingsTab::ALL
        .into_iter()
        .map(|tab| {
            view! {
                <button
                    role="tab"
                    class="settings-tab"
                    aria-selected=move || (selected.get() == tab).to_string()
                    on:click=move |_| selected.set(tab)
                >
                    {tab.label()}
                </button>
            }
        })
        .collect_view();

    view! {
        <div class="settings" data-tab=move || selected.get().token()>
            <nav class="settings-tabs" role="tablist">{tabs}</nav>
            <div class="settings-panel" role="tabpanel">
                {move || settings_panel(runtime, selected.get())}
            </div>
        </div>
    }
}

fn settings_panel(runtime: DesktopRuntimeContext, tab: SettingsTab) -> View {
    match tab {
        SettingsTab::Wallpaper => WALLPAPER_CHOICES
            .into_iter()
            .map(|(label, url)| {
                view! {
                    <button
                        class="wallpaper-choice"
                        aria-pressed=move || (runtime.preferences.get().wallpaper == url).to_string()
                        on:click=move |_| {
                            runtime.with_manager(|manager| manager.set_wallpaper(url));
                        }
                    >
                        {label}
                    </button>
                }
            })
            .collect_view(),
        SettingsTab::Font | SettingsTab::Appearance => FONT_CHOICES
            .into_iter()
            .map(|(token, label, _)| {
                view! {
                    <button
                        class="font-choice"
                        aria-pressed=move || (runtime.preferences.get().font == token).to_string()
                        on:click=move |_| {
                            runtime.with_manager(|manager| manager.set_font(token));
                        }
                    >
                        {label}
                    </button>
                }
            })
            .collect_view(),
        SettingsTab::Data => view! {
            <button on:click=move |_| {
                runtime.with_manager(|manager| manager.close_all_apps());
            }>
                "Close all windows"
            </button>
            <button on:click=move |_| {
                runtime.with_manager(|manager| manager.reset_all_settings());
            }>
                "Reset workspace"
            </button>
        }
        .into_view(),
        SettingsTab::General | SettingsTab::About => view! {
            <p>{format!("{} apps installed.", apps::catalog().apps().len())}</p>
        }
        .into_view(),
    }
}

#[component]
fn AmbientBody() -> impl IntoView {
    let runtime = use_desktop_runtime();
    let playing = create_rw_signal(false);

    on_bus_events(runtime, ApplicationId::trusted(AMBIENT_APP), move |events| {
        if events
            .iter()
            .any(|event| event.payload == BusPayload::AmbientStopAll)
        {
            playing.set(false);
        }
    });

    view! {
        <div class="ambient">
            <p>{move || if playing.get() { "Playing" } else { "Stopped" }}</p>
            <button on:click=move |_| playing.update(|p| *p = !*p)>
                {move || if playing.get() { "Stop all" } else { "Play" }}
            </button>
        </div>
    }
}
