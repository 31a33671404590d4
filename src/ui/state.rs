// src/ui/state.rs
// The panel's presentation state. This is the real `PanelView`; the
// rendering code only reads it and the controller only writes it through
// the trait.

use crate::config::PanelConfig;
use crate::controller::form::FormState;
use crate::controller::view::{PanelView, RecognitionState};

/// Which control key input lands on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    PresetSelect,
    NameInput,
    Mapping(usize),
    ApplyButton,
    SaveButton,
    ToggleButton,
    StopClientButton,
}

#[derive(Debug, Clone)]
struct TransientMessage {
    stamp: u64,
    text: String,
}

#[derive(Debug)]
pub struct UiState {
    pub form: FormState,
    pub focus: Focus,
    recognition: RecognitionState,
    video_source: Option<String>,
    submit_enabled: bool,
    server_message: String,
    message: Option<TransientMessage>,
    /// Monotonic across resets so an expiry scheduled before a reset can
    /// never hide a message shown after it.
    next_stamp: u64,
    alert: Option<String>,
    config: PanelConfig,
}

impl UiState {
    pub fn new(config: &PanelConfig) -> Self {
        Self {
            form: FormState::from_config(config),
            focus: Focus::PresetSelect,
            recognition: RecognitionState::Inactive,
            video_source: None,
            submit_enabled: true,
            server_message: String::new(),
            message: None,
            next_stamp: 0,
            alert: None,
            config: config.clone(),
        }
    }

    fn focus_order(&self) -> Vec<Focus> {
        let mut order = vec![Focus::PresetSelect, Focus::NameInput];
        order.extend((0..self.form.fields.len()).map(Focus::Mapping));
        order.extend([
            Focus::ApplyButton,
            Focus::SaveButton,
            Focus::ToggleButton,
            Focus::StopClientButton,
        ]);
        order
    }

    pub fn focus_next(&mut self) {
        let order = self.focus_order();
        let index = order.iter().position(|f| *f == self.focus).unwrap_or(0);
        self.focus = order[(index + 1) % order.len()];
    }

    pub fn focus_previous(&mut self) {
        let order = self.focus_order();
        let index = order.iter().position(|f| *f == self.focus).unwrap_or(0);
        self.focus = order[(index + order.len() - 1) % order.len()];
    }

    /// Step the focused select left or right. Controls that are not
    /// selects ignore it.
    pub fn cycle(&mut self, delta: isize) {
        match self.focus {
            Focus::PresetSelect => self.form.cycle_preset(delta),
            Focus::Mapping(row) => self.form.cycle_command(row, delta),
            _ => {}
        }
    }

    pub fn type_char(&mut self, c: char) {
        if self.focus == Focus::NameInput {
            self.form.name_input.push(c);
        }
    }

    pub fn backspace(&mut self) {
        if self.focus == Focus::NameInput {
            self.form.name_input.pop();
        }
    }

    pub fn message_text(&self) -> Option<&str> {
        self.message.as_ref().map(|m| m.text.as_str())
    }

    pub fn alert_text(&self) -> Option<&str> {
        self.alert.as_deref()
    }

    pub fn dismiss_alert(&mut self) {
        self.alert = None;
    }
}

impl PanelView for UiState {
    fn recognition_state(&self) -> RecognitionState {
        self.recognition
    }

    fn set_recognition_state(&mut self, state: RecognitionState) {
        self.recognition = state;
    }

    fn video_source(&self) -> Option<&str> {
        self.video_source.as_deref()
    }

    fn set_video_source(&mut self, source: Option<String>) {
        self.video_source = source;
    }

    fn submit_enabled(&self) -> bool {
        self.submit_enabled
    }

    fn set_submit_enabled(&mut self, enabled: bool) {
        self.submit_enabled = enabled;
    }

    fn server_message(&self) -> &str {
        &self.server_message
    }

    fn set_server_message(&mut self, text: &str) {
        self.server_message = text.to_string();
    }

    fn show_message(&mut self, text: &str) -> u64 {
        self.next_stamp += 1;
        let stamp = self.next_stamp;
        self.message = Some(TransientMessage {
            stamp,
            text: text.to_string(),
        });
        stamp
    }

    fn hide_message(&mut self, stamp: u64) {
        if self.message.as_ref().is_some_and(|m| m.stamp == stamp) {
            self.message = None;
        }
    }

    fn show_alert(&mut self, text: &str) {
        self.alert = Some(text.to_string());
    }

    fn set_field(&mut self, name: &str, value: &str) -> bool {
        self.form.set_field(name, value)
    }

    fn insert_preset_sorted(&mut self, name: &str) {
        self.form.insert_preset_sorted(name);
    }

    fn reset(&mut self) {
        self.form = FormState::from_config(&self.config);
        self.focus = Focus::PresetSelect;
        self.recognition = RecognitionState::Inactive;
        self.video_source = None;
        self.submit_enabled = true;
        self.server_message.clear();
        self.message = None;
        self.alert = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> UiState {
        UiState::new(&PanelConfig::default())
    }

    #[test]
    fn test_focus_wraps_both_directions() {
        let mut ui = state();
        let field_count = ui.form.fields.len();

        ui.focus_previous();
        assert_eq!(ui.focus, Focus::StopClientButton);
        ui.focus_next();
        assert_eq!(ui.focus, Focus::PresetSelect);

        ui.focus_next();
        assert_eq!(ui.focus, Focus::NameInput);
        for row in 0..field_count {
            ui.focus_next();
            assert_eq!(ui.focus, Focus::Mapping(row));
        }
        ui.focus_next();
        assert_eq!(ui.focus, Focus::ApplyButton);
    }

    #[test]
    fn test_typing_only_lands_in_the_name_input() {
        let mut ui = state();
        ui.type_char('x');
        assert_eq!(ui.form.name_input, "");

        ui.focus = Focus::NameInput;
        ui.type_char('h');
        ui.type_char('i');
        assert_eq!(ui.form.name_input, "hi");
        ui.backspace();
        assert_eq!(ui.form.name_input, "h");
    }

    #[test]
    fn test_newest_message_wins_and_old_stamps_are_ignored() {
        let mut ui = state();
        let first = ui.show_message("first");
        let second = ui.show_message("second");
        assert_eq!(ui.message_text(), Some("second"));

        ui.hide_message(first);
        assert_eq!(ui.message_text(), Some("second"));
        ui.hide_message(second);
        assert_eq!(ui.message_text(), None);
    }

    #[test]
    fn test_reset_restores_the_initial_panel_but_not_the_stamps() {
        let mut ui = state();
        ui.set_recognition_state(RecognitionState::Active);
        ui.set_submit_enabled(false);
        ui.set_video_source(Some("http://example/feed".to_string()));
        ui.set_server_message("running");
        ui.form.name_input = "draft".to_string();
        let before = ui.show_message("about to vanish");

        ui.reset();
        assert_eq!(ui.recognition_state(), RecognitionState::Inactive);
        assert!(ui.submit_enabled());
        assert_eq!(ui.video_source(), None);
        assert_eq!(ui.server_message(), "");
        assert_eq!(ui.form.name_input, "");
        assert_eq!(ui.message_text(), None);

        let after = ui.show_message("fresh");
        assert!(after > before);
    }
}
