//! Pure window-collection transitions used by the desktop reducer.
//!
//! Every function takes the collection by value and returns the next collection. None of them
//! enforce id uniqueness; the reducer checks membership before calling [`add_window`].

use desktop_app_contract::{ApplicationId, WindowPosition, WindowSize};

use crate::model::WindowEntry;

/// Appends `entry` on top of the stack.
pub fn add_window(mut windows: Vec<WindowEntry>, entry: WindowEntry) -> Vec<WindowEntry> {
    windows.push(entry);
    windows
}

/// Drops the entry for `id`. No-op when absent.
pub fn remove_by_id(mut windows: Vec<WindowEntry>, id: &ApplicationId) -> Vec<WindowEntry> {
    windows.retain(|w| &w.id != id);
    windows
}

/// Moves the entry for `id` to the top, keeping every other entry in its relative order.
///
/// Returns the input unchanged when `id` is absent or already on top, so calling it twice is
/// the same as calling it once.
pub fn bring_to_front(mut windows: Vec<WindowEntry>, id: &ApplicationId) -> Vec<WindowEntry> {
    let Some(index) = windows.iter().position(|w| &w.id == id) else {
        return windows;
    };
    if index + 1 == windows.len() {
        return windows;
    }
    let entry = windows.remove(index);
    windows.push(entry);
    windows
}

/// Replaces position and size of the entry for `id`. No-op when absent.
pub fn update_geometry(
    mut windows: Vec<WindowEntry>,
    id: &ApplicationId,
    position: WindowPosition,
    size: WindowSize,
) -> Vec<WindowEntry> {
    if let Some(window) = windows.iter_mut().find(|w| &w.id == id) {
        window.position = position;
        window.size = size;
    }
    windows
}

/// Default position for the `open_count`-th window: `base + step * open_count` on both axes.
pub fn stagger_position(open_count: usize, base: i32, step: i32) -> WindowPosition {
    let offset = base.saturating_add(step.saturating_mul(open_count as i32));
    WindowPosition::new(offset, offset)
}

/// Collapses duplicate ids (the topmost occurrence wins), drops malformed ids, and raises sizes
/// to `floor`.
pub fn sanitize_windows(windows: Vec<WindowEntry>, floor: WindowSize) -> Vec<WindowEntry> {
    let mut kept: Vec<WindowEntry> = Vec::with_capacity(windows.len());
    for mut window in windows.into_iter().rev() {
        if !window.id.is_valid() || kept.iter().any(|w| w.id == window.id) {
            continue;
        }
        window.size = window.size.clamped_min(floor);
        kept.push(window);
    }
    kept.reverse();
    kept
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn entry(id: &str, offset: i32) -> WindowEntry {
        WindowEntry {
            id: ApplicationId::trusted(id),
            position: WindowPosition::new(offset, offset),
            size: WindowSize::new(400, 300),
        }
    }

    fn ids(windows: &[WindowEntry]) -> Vec<&str> {
        windows.iter().map(|w| w.id.as_str()).collect()
    }

    #[test]
    fn bring_to_front_keeps_relative_order_of_others() {
        let windows = vec![entry("todo", 50), entry("kanban", 70), entry("notepad", 90)];
        let raised = bring_to_front(windows, &ApplicationId::trusted("todo"));
        assert_eq!(ids(&raised), vec!["kanban", "notepad", "todo"]);
    }

    #[test]
    fn bring_to_front_is_idempotent() {
        let windows = vec![entry("todo", 50), entry("kanban", 70), entry("notepad", 90)];
        let id = ApplicationId::trusted("kanban");
        let once = bring_to_front(windows.clone(), &id);
        let twice = bring_to_front(once.clone(), &id);
        assert_eq!(once, twice);
    }

    #[test]
    fn missing_ids_leave_collection_untouched() {
        let windows = vec![entry("todo", 50)];
        let ghost = ApplicationId::trusted("ghost");
        assert_eq!(bring_to_front(windows.clone(), &ghost), windows);
        assert_eq!(remove_by_id(windows.clone(), &ghost), windows);
        assert_eq!(
            update_geometry(
                windows.clone(),
                &ghost,
                WindowPosition::new(1, 1),
                WindowSize::new(500, 500)
            ),
            windows
        );
    }

    #[test]
    fn update_geometry_touches_only_the_target() {
        let windows = vec![entry("todo", 50), entry("kanban", 70)];
        let next = update_geometry(
            windows,
            &ApplicationId::trusted("kanban"),
            WindowPosition::new(200, 120),
            WindowSize::new(640, 480),
        );
        assert_eq!(next[0], entry("todo", 50));
        assert_eq!(next[1].position, WindowPosition::new(200, 120));
        assert_eq!(next[1].size, WindowSize::new(640, 480));
    }

    #[test]
    fn stagger_grows_by_step_per_open_window() {
        assert_eq!(stagger_position(0, 50, 20), WindowPosition::new(50, 50));
        assert_eq!(stagger_position(1, 50, 20), WindowPosition::new(70, 70));
        assert_eq!(stagger_position(4, 50, 20), WindowPosition::new(130, 130));
    }

    #[test]
    fn sanitize_collapses_duplicates_and_clamps_sizes() {
        let mut tiny = entry("kanban", 10);
        tiny.size = WindowSize::new(100, 50);
        let windows = vec![
            entry("todo", 50),
            entry("kanban", 70),
            entry("Bad Id", 80),
            tiny,
        ];
        let clean = sanitize_windows(windows, WindowSize::new(300, 200));
        assert_eq!(ids(&clean), vec!["todo", "kanban"]);
        assert_eq!(clean[1].position, WindowPosition::new(10, 10));
        assert_eq!(clean[1].size, WindowSize::new(300, 200));
    }
}
