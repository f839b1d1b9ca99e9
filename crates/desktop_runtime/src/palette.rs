//! Command palette model: fuzzy-ranked shell commands with a wrapping selection cursor.

use desktop_app_contract::{ApplicationId, SettingsTab, WindowManagerOps};
use fuzzy_matcher::{skim::SkimMatcherV2, FuzzyMatcher};

use crate::{apps, manager::WindowManager};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaletteAction {
    OpenApp(ApplicationId),
    OpenSettingsTab(SettingsTab),
    CloseAllWindows,
    ResetWorkspace,
}

impl PaletteAction {
    pub fn apply(&self, manager: &mut WindowManager) {
        match self {
            Self::OpenApp(app_id) => manager.open_app(app_id),
            Self::OpenSettingsTab(tab) => manager.open_settings_tab(*tab),
            Self::CloseAllWindows => manager.close_all_apps(),
            Self::ResetWorkspace => manager.reset_all_settings(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaletteCommand {
    pub label: String,
    /// Extra terms matched alongside the label.
    pub keywords: Vec<String>,
    pub action: PaletteAction,
}

impl PaletteCommand {
    fn haystack(&self) -> String {
        if self.keywords.is_empty() {
            self.label.clone()
        } else {
            format!("{} {}", self.label, self.keywords.join(" "))
        }
    }
}

/// One command per catalog app, one per settings tab, then the workspace-wide commands.
pub fn builtin_commands() -> Vec<PaletteCommand> {
    let mut commands: Vec<PaletteCommand> = apps::catalog()
        .apps()
        .iter()
        .map(|app| PaletteCommand {
            label: format!("Open {}", app.title),
            keywords: app.keywords.clone(),
            action: PaletteAction::OpenApp(app.app_id.clone()),
        })
        .collect();

    commands.extend(SettingsTab::ALL.into_iter().map(|tab| PaletteCommand {
        label: format!("Settings: {}", tab.label()),
        keywords: vec!["preferences".to_string()],
        action: PaletteAction::OpenSettingsTab(tab),
    }));

    commands.push(PaletteCommand {
        label: "Close all windows".to_string(),
        keywords: Vec::new(),
        action: PaletteAction::CloseAllWindows,
    });
    commands.push(PaletteCommand {
        label: "Reset workspace".to_string(),
        keywords: vec!["defaults".to_string(), "clear".to_string()],
        action: PaletteAction::ResetWorkspace,
    });
    commands
}

pub struct CommandPalette {
    open: bool,
    query: String,
    commands: Vec<PaletteCommand>,
    filtered: Vec<usize>,
    selected: usize,
    matcher: SkimMatcherV2,
}

impl CommandPalette {
    pub fn new(commands: Vec<PaletteCommand>) -> Self {
        let filtered = (0..commands.len()).collect();
        Self {
            open: false,
            query: String::new(),
            commands,
            filtered,
            selected: 0,
            matcher: SkimMatcherV2::default().ignore_case(),
        }
    }

    pub fn with_builtin_commands() -> Self {
        Self::new(builtin_commands())
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Opens with an empty query.
    pub fn open(&mut self) {
        self.open = true;
        self.set_query("");
    }

    pub fn close(&mut self) {
        self.open = false;
    }

    pub fn toggle(&mut self) {
        if self.open {
            self.close();
        } else {
            self.open();
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    /// Replaces the query, re-ranks, and moves the cursor back to the best match.
    pub fn set_query(&mut self, query: &str) {
        self.query = query.to_string();
        self.filter();
        self.selected = 0;
    }

    pub fn select_next(&mut self) {
        if !self.filtered.is_empty() {
            self.selected = (self.selected + 1) % self.filtered.len();
        }
    }

    pub fn select_prev(&mut self) {
        if !self.filtered.is_empty() {
            self.selected = (self.selected + self.filtered.len() - 1) % self.filtered.len();
        }
    }

    pub fn select(&mut self, index: usize) {
        if index < self.filtered.len() {
            self.selected = index;
        }
    }

    pub fn selected_index(&self) -> usize {
        self.selected
    }

    pub fn visible_items(&self) -> Vec<&PaletteCommand> {
        self.filtered.iter().map(|&idx| &self.commands[idx]).collect()
    }

    /// Action under the cursor, if anything matches.
    pub fn confirm(&self) -> Option<PaletteAction> {
        self.filtered
            .get(self.selected)
            .map(|&idx| self.commands[idx].action.clone())
    }

    /// Closes the palette and runs the selected command against `manager`.
    pub fn execute_selected(&mut self, manager: &mut WindowManager) -> Option<PaletteAction> {
        let action = self.confirm()?;
        self.close();
        action.apply(manager);
        Some(action)
    }

    fn filter(&mut self) {
        let query = self.query.trim();
        if query.is_empty() {
            self.filtered = (0..self.commands.len()).collect();
            return;
        }

        let mut scored: Vec<(i64, usize)> = self
            .commands
            .iter()
            .enumerate()
            .filter_map(|(idx, command)| {
                self.matcher
                    .fuzzy_match(&command.haystack(), query)
                    .map(|score| (score, idx))
            })
            .collect();
        // Highest score first; ties keep catalog order.
        scored.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));
        self.filtered = scored.into_iter().map(|(_, idx)| idx).collect();
    }
}

impl std::fmt::Debug for CommandPalette {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandPalette")
            .field("open", &self.open)
            .field("query", &self.query)
            .field("filtered", &self.filtered)
            .field("selected", &self.selected)
            .finish_non_exhaustive()
    }
}
