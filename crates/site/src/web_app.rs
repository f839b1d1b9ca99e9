use desktop_app_contract::{ApplicationId, SettingsTab, WindowManagerOps};
use desktop_runtime::{use_desktop_runtime, DesktopProvider, DesktopShell};
use leptos::*;
use leptos_meta::*;
use leptos_router::*;
use platform_host_web::build_host_services;

/// Workspace action requested through the page URL (`?open=<app>` or `?settings=<tab>`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeepLink {
    OpenApp(ApplicationId),
    SettingsTab(SettingsTab),
}

/// Settings wins when both parameters are present. Unknown tabs and malformed ids are ignored.
pub fn parse_deep_link(open: Option<&str>, settings: Option<&str>) -> Option<DeepLink> {
    if let Some(tab) = settings.and_then(SettingsTab::from_token) {
        return Some(DeepLink::SettingsTab(tab));
    }
    open.and_then(|raw| ApplicationId::new(raw).ok())
        .map(DeepLink::OpenApp)
}

#[component]
pub fn SiteApp() -> impl IntoView {
    provide_meta_context();

    view! {
        <Title text="Deskspace" />
        <Meta name="description" content="A desktop-style productivity workspace in the browser." />

        <Router>
            <main class="site-root">
                <Routes>
                    <Route path="" view=DesktopEntry />
                    <Route path="/*any" view=DesktopEntry />
                </Routes>
            </main>
        </Router>
    }
}

#[component]
pub fn DesktopEntry() -> impl IntoView {
    view! {
        <DesktopProvider host_services=build_host_services()>
            <DesktopShell />
            <DeepLinkLauncher />
        </DesktopProvider>
    }
}

#[component]
fn DeepLinkLauncher() -> impl IntoView {
    let runtime = use_desktop_runtime();
    let query = use_query_map();
    let link = query.with_untracked(|map| {
        parse_deep_link(
            map.get("open").map(String::as_str),
            map.get("settings").map(String::as_str),
        )
    });

    if let Some(link) = link {
        logging::log!("opening deep link {link:?}");
        runtime.with_manager(|manager| match link {
            DeepLink::OpenApp(app_id) => manager.open_app(&app_id),
            DeepLink::SettingsTab(tab) => manager.open_settings_tab(tab),
        });
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn settings_parameter_takes_precedence() {
        assert_eq!(
            parse_deep_link(Some("todo"), Some("font")),
            Some(DeepLink::SettingsTab(SettingsTab::Font))
        );
    }

    #[test]
    fn open_parameter_requires_a_valid_id() {
        assert_eq!(
            parse_deep_link(Some("kanban"), None),
            Some(DeepLink::OpenApp(ApplicationId::trusted("kanban")))
        );
        assert_eq!(parse_deep_link(Some("../x"), None), None);
        assert_eq!(parse_deep_link(None, Some("nope")), None);
    }
}
