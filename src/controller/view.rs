// src/controller/view.rs
// Capability surface the controller needs from whatever renders the panel.
// The TUI state implements it for real; tests drive it without a terminal.

use std::fmt::Debug;

/// Whether the recognition process is running, as far as the panel knows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecognitionState {
    Active,
    Inactive,
}

impl RecognitionState {
    pub fn label(&self) -> &'static str {
        match self {
            RecognitionState::Active => "🟢 Active",
            RecognitionState::Inactive => "🔴 Inactive",
        }
    }

    pub fn toggled(&self) -> Self {
        match self {
            RecognitionState::Active => RecognitionState::Inactive,
            RecognitionState::Inactive => RecognitionState::Active,
        }
    }
}

/// What the controller is allowed to do to the panel.
///
/// Two invariants hold across every implementation: exactly one of the
/// start/stop controls is offered at a time (both derive from
/// `recognition_state`), and apply/save are disabled iff recognition is
/// active.
pub trait PanelView: Debug {
    fn recognition_state(&self) -> RecognitionState;

    /// Flip the status line and the start/stop pair together.
    fn set_recognition_state(&mut self, state: RecognitionState);

    fn video_source(&self) -> Option<&str>;

    /// `Some(url)` reveals the feed pane; `None` hides it and clears the
    /// source.
    fn set_video_source(&mut self, source: Option<String>);

    fn submit_enabled(&self) -> bool;

    fn set_submit_enabled(&mut self, enabled: bool);

    fn server_message(&self) -> &str;

    fn set_server_message(&mut self, text: &str);

    /// Show a transient feedback message, returning the stamp a later
    /// `hide_message` must present.
    fn show_message(&mut self, text: &str) -> u64;

    /// Hide the transient message, but only if `stamp` still names it.
    fn hide_message(&mut self, stamp: u64);

    /// Blocking alert; input is swallowed until the user dismisses it.
    fn show_alert(&mut self, text: &str);

    /// Assign a form field by name. Returns false when no such field
    /// exists so the caller can log the skip.
    fn set_field(&mut self, name: &str, value: &str) -> bool;

    /// Insert a preset option keeping the list in ascending order.
    fn insert_preset_sorted(&mut self, name: &str);

    /// The page-reload equivalent: back to the initial panel state.
    fn reset(&mut self);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels_match_the_status_line() {
        assert_eq!(RecognitionState::Active.label(), "🟢 Active");
        assert_eq!(RecognitionState::Inactive.label(), "🔴 Inactive");
    }

    #[test]
    fn test_toggled_flips() {
        assert_eq!(RecognitionState::Active.toggled(), RecognitionState::Inactive);
        assert_eq!(RecognitionState::Inactive.toggled(), RecognitionState::Active);
    }
}
