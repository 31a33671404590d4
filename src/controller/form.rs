// src/controller/form.rs
use crate::config::PanelConfig;

/// Which submit control fired. The backend branches on the matching
/// form value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormAction {
    Apply,
    Save,
}

impl FormAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            FormAction::Apply => "apply",
            FormAction::Save => "save",
        }
    }
}

/// One gesture row: the gesture is the field name, the mapped command is
/// the value. Empty value means unmapped and the backend drops it.
#[derive(Debug, Clone)]
pub struct FormField {
    pub name: String,
    pub value: String,
}

/// Everything the mapping form holds between submissions.
#[derive(Debug, Clone)]
pub struct FormState {
    pub fields: Vec<FormField>,
    pub commands: Vec<String>,
    pub presets: Vec<String>,
    /// Index into `presets`; `None` is the blank placeholder row.
    pub selected_preset: Option<usize>,
    pub name_input: String,
}

impl FormState {
    pub fn from_config(config: &PanelConfig) -> Self {
        let fields = config
            .gestures
            .iter()
            .map(|name| FormField {
                name: name.clone(),
                value: String::new(),
            })
            .collect();
        let mut presets = config.presets.clone();
        presets.sort();
        Self {
            fields,
            commands: config.commands.clone(),
            presets,
            selected_preset: None,
            name_input: String::new(),
        }
    }

    /// Assign a field by name, returning false when the form has no such
    /// row.
    pub fn set_field(&mut self, name: &str, value: &str) -> bool {
        match self.fields.iter_mut().find(|field| field.name == name) {
            Some(field) => {
                field.value = value.to_string();
                true
            }
            None => false,
        }
    }

    /// Insert a preset option before the first one sorting later, so the
    /// list stays ascending without a full re-sort. Duplicates are kept;
    /// the selected option stays selected.
    pub fn insert_preset_sorted(&mut self, name: &str) {
        let index = self
            .presets
            .iter()
            .position(|existing| existing.as_str() > name)
            .unwrap_or(self.presets.len());
        self.presets.insert(index, name.to_string());
        if let Some(selected) = self.selected_preset {
            if index <= selected {
                self.selected_preset = Some(selected + 1);
            }
        }
    }

    pub fn selected_preset_name(&self) -> Option<&str> {
        self.selected_preset
            .and_then(|index| self.presets.get(index))
            .map(String::as_str)
    }

    /// The name a save will land under: the dropdown wins, the free-text
    /// field is the fallback, and empty means the backend picks nothing.
    pub fn submitted_name(&self) -> Option<String> {
        if let Some(name) = self.selected_preset_name() {
            if !name.is_empty() {
                return Some(name.to_string());
            }
        }
        if self.name_input.is_empty() {
            None
        } else {
            Some(self.name_input.clone())
        }
    }

    /// Flatten the form into submission order: every gesture row (mapped
    /// or not), both name fields, then the action, which always wins over
    /// anything before it.
    pub fn payload(&self, action: FormAction) -> Vec<(String, String)> {
        let mut entries: Vec<(String, String)> = self
            .fields
            .iter()
            .map(|field| (field.name.clone(), field.value.clone()))
            .collect();
        entries.push((
            "config_name_select".to_string(),
            self.selected_preset_name().unwrap_or_default().to_string(),
        ));
        entries.push(("config_name_text".to_string(), self.name_input.clone()));
        entries.retain(|(name, _)| name != "action");
        entries.push(("action".to_string(), action.as_str().to_string()));
        entries
    }

    /// Step a gesture row through blank plus every known command, wrapping
    /// at both ends. A value outside the command list steps from the blank
    /// slot.
    pub fn cycle_command(&mut self, row: usize, delta: isize) {
        let Some(field) = self.fields.get_mut(row) else {
            return;
        };
        let slots = self.commands.len() as isize + 1;
        let current = self
            .commands
            .iter()
            .position(|command| *command == field.value)
            .map(|index| index as isize + 1)
            .unwrap_or(0);
        let next = (current + delta).rem_euclid(slots);
        field.value = if next == 0 {
            String::new()
        } else {
            self.commands[next as usize - 1].clone()
        };
    }

    /// Step the preset dropdown, treating the blank placeholder as one
    /// more slot so cycling can land back on "nothing selected".
    pub fn cycle_preset(&mut self, delta: isize) {
        if self.presets.is_empty() {
            return;
        }
        let slots = self.presets.len() as isize + 1;
        let current = match self.selected_preset {
            None => 0,
            Some(index) => index as isize + 1,
        };
        let next = (current + delta).rem_euclid(slots);
        self.selected_preset = if next == 0 {
            None
        } else {
            Some(next as usize - 1)
        };
    }
}

/// Preset names travel as file names, so only letters, digits and
/// underscores pass.
pub fn is_valid_preset_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state_with_presets(presets: &[&str]) -> FormState {
        let mut config = PanelConfig::default();
        config.presets = presets.iter().map(|s| s.to_string()).collect();
        FormState::from_config(&config)
    }

    #[test]
    fn test_valid_preset_names() {
        assert!(is_valid_preset_name("gaming_setup"));
        assert!(is_valid_preset_name("Preset2"));
        assert!(!is_valid_preset_name(""));
        assert!(!is_valid_preset_name("bad name"));
        assert!(!is_valid_preset_name("dot.json"));
        assert!(!is_valid_preset_name("sneaky/../path"));
    }

    #[test]
    fn test_set_field_rejects_unknown_names() {
        let mut state = state_with_presets(&[]);
        assert!(state.set_field("Thumb_Up", "volume up"));
        assert_eq!(state.fields[0].value, "volume up");
        assert!(!state.set_field("Wave", "volume up"));
    }

    #[test]
    fn test_insert_preset_keeps_ascending_order() {
        let mut state = state_with_presets(&["alpha", "gamma"]);
        state.insert_preset_sorted("beta");
        assert_eq!(state.presets, vec!["alpha", "beta", "gamma"]);
        state.insert_preset_sorted("zeta");
        assert_eq!(state.presets, vec!["alpha", "beta", "gamma", "zeta"]);
        state.insert_preset_sorted("aaa");
        assert_eq!(state.presets[0], "aaa");
    }

    #[test]
    fn test_insert_preset_allows_duplicates_and_tracks_selection() {
        let mut state = state_with_presets(&["alpha", "gamma"]);
        state.selected_preset = Some(1);
        state.insert_preset_sorted("beta");
        assert_eq!(state.selected_preset_name(), Some("gamma"));
        state.insert_preset_sorted("gamma");
        assert_eq!(
            state.presets,
            vec!["alpha", "beta", "gamma", "gamma"]
        );
    }

    #[test]
    fn test_payload_includes_unmapped_rows_and_single_action() {
        let mut state = state_with_presets(&["gaming"]);
        state.set_field("Victory", "play/pause");
        state.selected_preset = Some(0);
        let payload = state.payload(FormAction::Apply);
        let actions: Vec<_> = payload.iter().filter(|(name, _)| name == "action").collect();
        assert_eq!(actions.len(), 1);
        assert_eq!(payload.last().unwrap(), &("action".to_string(), "apply".to_string()));
        assert!(payload.contains(&("Thumb_Up".to_string(), String::new())));
        assert!(payload.contains(&("Victory".to_string(), "play/pause".to_string())));
        assert!(payload.contains(&("config_name_select".to_string(), "gaming".to_string())));
        assert!(payload.contains(&("config_name_text".to_string(), String::new())));
    }

    #[test]
    fn test_submitted_name_prefers_the_dropdown() {
        let mut state = state_with_presets(&["gaming"]);
        state.name_input = "typed".to_string();
        assert_eq!(state.submitted_name(), Some("typed".to_string()));
        state.selected_preset = Some(0);
        assert_eq!(state.submitted_name(), Some("gaming".to_string()));
        state.selected_preset = None;
        state.name_input.clear();
        assert_eq!(state.submitted_name(), None);
    }

    #[test]
    fn test_cycle_command_wraps_through_blank() {
        let mut state = state_with_presets(&[]);
        let last = state.commands.last().unwrap().clone();
        state.cycle_command(0, -1);
        assert_eq!(state.fields[0].value, last);
        state.cycle_command(0, 1);
        assert_eq!(state.fields[0].value, "");
        state.cycle_command(0, 1);
        assert_eq!(state.fields[0].value, state.commands[0]);
    }

    #[test]
    fn test_cycle_preset_wraps_through_placeholder() {
        let mut state = state_with_presets(&["a", "b"]);
        assert_eq!(state.selected_preset, None);
        state.cycle_preset(1);
        assert_eq!(state.selected_preset_name(), Some("a"));
        state.cycle_preset(1);
        assert_eq!(state.selected_preset_name(), Some("b"));
        state.cycle_preset(1);
        assert_eq!(state.selected_preset, None);
        state.cycle_preset(-1);
        assert_eq!(state.selected_preset_name(), Some("b"));
    }

    #[test]
    fn test_presets_sorted_at_construction() {
        let state = state_with_presets(&["zeta", "alpha", "mid"]);
        assert_eq!(state.presets, vec!["alpha", "mid", "zeta"]);
    }
}
