//! Transient UI layout state. Never persisted.

use tokio::sync::watch;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutState {
    pub preview_visible: bool,
    pub terminal_visible: bool,
    pub chat_visible: bool,
    /// Path of the focused editor tab.
    pub active_file: Option<String>,
}

impl Default for LayoutState {
    fn default() -> Self {
        Self {
            preview_visible: false,
            terminal_visible: true,
            chat_visible: true,
            active_file: None,
        }
    }
}

/// Observable holder of [`LayoutState`].
pub struct Layout {
    state: watch::Sender<LayoutState>,
}

impl Default for Layout {
    fn default() -> Self {
        Self::new()
    }
}

impl Layout {
    pub fn new() -> Self {
        let (state, _) = watch::channel(LayoutState::default());
        Self { state }
    }

    pub fn snapshot(&self) -> LayoutState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<LayoutState> {
        self.state.subscribe()
    }

    /// Applies `f`; subscribers are only notified when something changed.
    pub fn update<F>(&self, f: F)
    where
        F: FnOnce(&mut LayoutState),
    {
        self.state.send_if_modified(|state| {
            let before = state.clone();
            f(state);
            *state != before
        });
    }

    pub fn show_preview(&self) {
        self.update(|state| state.preview_visible = true);
    }

    pub fn hide_preview(&self) {
        self.update(|state| state.preview_visible = false);
    }

    pub fn set_active_file(&self, path: Option<String>) {
        self.update(|state| state.active_file = path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let layout = Layout::new();
        let state = layout.snapshot();
        assert!(!state.preview_visible);
        assert!(state.terminal_visible);
        assert!(state.active_file.is_none());
    }

    #[test]
    fn test_unchanged_update_does_not_notify() {
        let layout = Layout::new();
        let mut rx = layout.subscribe();

        layout.hide_preview();
        assert!(!rx.has_changed().unwrap());

        layout.show_preview();
        assert!(rx.has_changed().unwrap());
        assert!(rx.borrow_and_update().preview_visible);
    }
}
