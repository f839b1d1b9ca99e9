//! Reducer actions, side-effect intents, and transition logic for the window manager.

use desktop_app_contract::{ApplicationId, SettingsTab, WindowPosition, WindowSize};
use thiserror::Error;

use crate::{
    apps,
    model::{DesktopState, ShellConfig, WindowEntry},
    window_manager::{add_window, bring_to_front, remove_by_id, stagger_position, update_geometry},
};

#[derive(Debug, Clone, PartialEq)]
/// Actions accepted by [`reduce_desktop`] to mutate [`DesktopState`].
pub enum DesktopAction {
    /// Restore, raise, or create the window for an app.
    OpenApp {
        /// App to open.
        app_id: ApplicationId,
    },
    /// Remove an app's window and minimized flag.
    CloseApp {
        /// App to close.
        app_id: ApplicationId,
    },
    /// Raise an open, visible window to the top.
    BringToFront {
        /// App to raise.
        app_id: ApplicationId,
    },
    /// Hide an open window without closing it.
    MinimizeApp {
        /// App to hide.
        app_id: ApplicationId,
    },
    /// Replace an open window's geometry.
    UpdateWindow {
        /// Target app.
        app_id: ApplicationId,
        /// New top-left offset.
        position: WindowPosition,
        /// New size; raised to the configured floor.
        size: WindowSize,
    },
    /// Empty both collections and wipe the stored layout.
    ResetAllWindows,
    /// Close every open or minimized app.
    CloseAllApps,
    /// Open settings and select a tab once the settings window has mounted.
    OpenSettingsTab {
        /// Tab to select.
        tab: SettingsTab,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Side-effect intents emitted by [`reduce_desktop`] for the window manager to execute.
pub enum RuntimeEffect {
    /// Persist the window collection.
    PersistLayout,
    /// Persist the minimized set (honored only when configured).
    PersistMinimized,
    /// Remove the stored layout key unconditionally.
    PurgeLayout,
    /// Run the app's registered close hook.
    RunCloseHook(ApplicationId),
    /// Drop deferred work and mount bookkeeping for a closed app.
    ReleaseApp(ApplicationId),
    /// Raise the window once it acknowledges mounting.
    FocusWhenMounted(ApplicationId),
    /// Broadcast a settings tab once the settings window acknowledges mounting.
    SelectSettingsTabWhenMounted(SettingsTab),
    /// Move DOM focus into the window.
    FocusWindowInput(ApplicationId),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
/// Reducer errors for malformed actions.
pub enum ReducerError {
    /// The action named an id that violates the application id policy.
    #[error("invalid application id `{0}`")]
    InvalidApplicationId(String),
}

/// Applies a [`DesktopAction`] to the window state and collects resulting side effects.
///
/// Ids outside the app catalog are accepted and get the generic title and size. State is left
/// untouched when an error is returned.
///
/// # Errors
///
/// Returns [`ReducerError::InvalidApplicationId`] for ids that are empty or not lowercase tokens.
pub fn reduce_desktop(
    state: &mut DesktopState,
    config: &ShellConfig,
    action: DesktopAction,
) -> Result<Vec<RuntimeEffect>, ReducerError> {
    let mut effects = Vec::new();
    match action {
        DesktopAction::OpenApp { app_id } => {
            ensure_valid(&app_id)?;
            let was_minimized = state.minimized.remove(&app_id);
            if was_minimized {
                effects.push(RuntimeEffect::PersistMinimized);
            }

            if was_minimized && state.is_open(&app_id) {
                // Raising now would race the window's own mount; wait for its acknowledgment.
                effects.push(RuntimeEffect::FocusWhenMounted(app_id));
            } else if state.is_open(&app_id) {
                state.windows = bring_to_front(std::mem::take(&mut state.windows), &app_id);
                effects.push(RuntimeEffect::PersistLayout);
                effects.push(RuntimeEffect::FocusWindowInput(app_id));
            } else {
                let entry = WindowEntry {
                    size: apps::default_window_size(&app_id, config.generic_size)
                        .clamped_min(config.min_size),
                    position: stagger_position(
                        state.windows.len(),
                        config.stagger_base_px,
                        config.stagger_step_px,
                    ),
                    id: app_id.clone(),
                };
                state.windows = add_window(std::mem::take(&mut state.windows), entry);
                effects.push(RuntimeEffect::PersistLayout);
                effects.push(RuntimeEffect::FocusWindowInput(app_id));
            }
        }
        DesktopAction::CloseApp { app_id } => {
            ensure_valid(&app_id)?;
            if state.known_ids().contains(&app_id) {
                effects.push(RuntimeEffect::RunCloseHook(app_id.clone()));
            }
            state.windows = remove_by_id(std::mem::take(&mut state.windows), &app_id);
            if state.minimized.remove(&app_id) {
                effects.push(RuntimeEffect::PersistMinimized);
            }
            effects.push(RuntimeEffect::ReleaseApp(app_id));
            effects.push(RuntimeEffect::PersistLayout);
        }
        DesktopAction::BringToFront { app_id } => {
            ensure_valid(&app_id)?;
            if state.is_visible(&app_id) {
                state.windows = bring_to_front(std::mem::take(&mut state.windows), &app_id);
                effects.push(RuntimeEffect::PersistLayout);
                effects.push(RuntimeEffect::FocusWindowInput(app_id));
            }
        }
        DesktopAction::MinimizeApp { app_id } => {
            ensure_valid(&app_id)?;
            if state.is_open(&app_id) && state.minimized.insert(app_id) {
                effects.push(RuntimeEffect::PersistMinimized);
            }
        }
        DesktopAction::UpdateWindow {
            app_id,
            position,
            size,
        } => {
            ensure_valid(&app_id)?;
            state.windows = update_geometry(
                std::mem::take(&mut state.windows),
                &app_id,
                position,
                size.clamped_min(config.min_size),
            );
            effects.push(RuntimeEffect::PersistLayout);
        }
        DesktopAction::ResetAllWindows => {
            for app_id in state.known_ids() {
                effects.push(RuntimeEffect::RunCloseHook(app_id.clone()));
                effects.push(RuntimeEffect::ReleaseApp(app_id));
            }
            state.windows.clear();
            state.minimized.clear();
            effects.push(RuntimeEffect::PurgeLayout);
            effects.push(RuntimeEffect::PersistMinimized);
        }
        DesktopAction::CloseAllApps => {
            for app_id in state.known_ids() {
                effects.extend(reduce_desktop(
                    state,
                    config,
                    DesktopAction::CloseApp { app_id },
                )?);
            }
        }
        DesktopAction::OpenSettingsTab { tab } => {
            effects.extend(reduce_desktop(
                state,
                config,
                DesktopAction::OpenApp {
                    app_id: apps::settings_app_id(),
                },
            )?);
            effects.push(RuntimeEffect::SelectSettingsTabWhenMounted(tab));
        }
    }

    Ok(effects)
}

fn ensure_valid(app_id: &ApplicationId) -> Result<(), ReducerError> {
    if app_id.is_valid() {
        Ok(())
    } else {
        Err(ReducerError::InvalidApplicationId(app_id.to_string()))
    }
}
