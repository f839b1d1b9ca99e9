//! Global keyboard shortcut mapping.

/// Modifier state and key of one keydown event.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct KeyChord {
    /// `KeyboardEvent.key`, e.g. `"k"` or `"Escape"`.
    pub key: String,
    pub ctrl: bool,
    pub meta: bool,
    pub shift: bool,
    pub alt: bool,
}

impl KeyChord {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ..Self::default()
        }
    }

    pub fn ctrl(mut self) -> Self {
        self.ctrl = true;
        self
    }

    pub fn meta(mut self) -> Self {
        self.meta = true;
        self
    }

    pub fn shift(mut self) -> Self {
        self.shift = true;
        self
    }

    pub fn alt(mut self) -> Self {
        self.alt = true;
        self
    }

    /// Ctrl on most platforms, Cmd on macOS. Either counts.
    fn primary(&self) -> bool {
        self.ctrl || self.meta
    }

    pub fn from_event(ev: &web_sys::KeyboardEvent) -> Self {
        Self {
            key: ev.key(),
            ctrl: ev.ctrl_key(),
            meta: ev.meta_key(),
            shift: ev.shift_key(),
            alt: ev.alt_key(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellShortcut {
    ToggleCommandPalette,
    CloseAllWindows,
    ResetWorkspace,
    CloseFocusedWindow,
    /// Closes the window holding DOM focus, or dismisses the palette when it is open.
    Escape,
}

impl ShellShortcut {
    /// Value for `aria-keyshortcuts`.
    pub const fn aria_label(self) -> &'static str {
        match self {
            Self::ToggleCommandPalette => "Control+K Meta+K",
            Self::CloseAllWindows => "Control+Shift+X Meta+Shift+X",
            Self::ResetWorkspace => "Control+Shift+Backspace Meta+Shift+Backspace",
            Self::CloseFocusedWindow => "Alt+W",
            Self::Escape => "Escape",
        }
    }
}

/// Maps a chord to the shell shortcut it triggers, if any.
pub fn match_shortcut(chord: &KeyChord) -> Option<ShellShortcut> {
    let key = chord.key.as_str();
    if chord.primary() && !chord.alt {
        if chord.shift {
            return match key {
                "x" | "X" => Some(ShellShortcut::CloseAllWindows),
                "Backspace" => Some(ShellShortcut::ResetWorkspace),
                _ => None,
            };
        }
        return matches!(key, "k" | "K").then_some(ShellShortcut::ToggleCommandPalette);
    }

    // Alt+W produces "∑" on macOS layouts, so accept it as well.
    if chord.alt && !chord.primary() && matches!(key, "w" | "W" | "∑") {
        return Some(ShellShortcut::CloseFocusedWindow);
    }

    (key == "Escape" && !chord.primary() && !chord.alt).then_some(ShellShortcut::Escape)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn palette_toggle_accepts_ctrl_and_cmd() {
        assert_eq!(
            match_shortcut(&KeyChord::new("k").ctrl()),
            Some(ShellShortcut::ToggleCommandPalette)
        );
        assert_eq!(
            match_shortcut(&KeyChord::new("k").meta()),
            Some(ShellShortcut::ToggleCommandPalette)
        );
        assert_eq!(match_shortcut(&KeyChord::new("k")), None);
    }

    #[test]
    fn shifted_chords_close_all_or_reset() {
        assert_eq!(
            match_shortcut(&KeyChord::new("X").ctrl().shift()),
            Some(ShellShortcut::CloseAllWindows)
        );
        assert_eq!(
            match_shortcut(&KeyChord::new("Backspace").meta().shift()),
            Some(ShellShortcut::ResetWorkspace)
        );
        assert_eq!(match_shortcut(&KeyChord::new("k").ctrl().shift()), None);
    }

    #[test]
    fn alt_w_closes_focused_window() {
        assert_eq!(
            match_shortcut(&KeyChord::new("w").alt()),
            Some(ShellShortcut::CloseFocusedWindow)
        );
        assert_eq!(match_shortcut(&KeyChord::new("w").alt().ctrl()), None);
    }

    #[test]
    fn bare_escape_only() {
        assert_eq!(
            match_shortcut(&KeyChord::new("Escape")),
            Some(ShellShortcut::Escape)
        );
        assert_eq!(match_shortcut(&KeyChord::new("Escape").ctrl()), None);
    }
}
