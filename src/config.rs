// src/config.rs
// Panel configuration: where the backend lives, timing knobs, and the page
// data the client's HTML used to ship pre-rendered (gesture rows, command
// options, known preset names).

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{PanelError, Result};

/// Environment variable pointing at an alternate config file.
pub const CONFIG_PATH_ENV: &str = "GESTURE_PANEL_CONFIG";

const DEFAULT_CONFIG_PATH: &str = "panel.yml";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PanelConfig {
    /// Base URL of the gesture recognition client's HTTP API.
    pub backend_url: String,
    /// Seconds between command-server health checks.
    pub poll_interval_secs: u64,
    /// Seconds a transient form-feedback message stays visible.
    pub message_secs: u64,
    /// Gesture field names, in display order. These double as the form
    /// field identifiers and as the keys of preset JSON documents.
    pub gestures: Vec<String>,
    /// Commands a gesture can be mapped to.
    pub commands: Vec<String>,
    /// Preset names known at startup; saving adds to the list at runtime.
    pub presets: Vec<String>,
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            backend_url: "http://127.0.0.1:8080".to_string(),
            poll_interval_secs: 5,
            message_secs: 3,
            gestures: [
                "Thumb_Up",
                "Thumb_Down",
                "Open_Palm",
                "Closed_Fist",
                "Victory",
                "ILoveYou",
                "Pointing_Up",
            ]
            .map(String::from)
            .to_vec(),
            commands: [
                "Volume Up",
                "Volume Down",
                "Open Calculator",
                "Screenshot",
                "AltTab",
                "PlayPause",
                "Scroll Up",
                "Scroll Down",
                "Task Manager",
            ]
            .map(String::from)
            .to_vec(),
            presets: Vec::new(),
        }
    }
}

impl PanelConfig {
    /// Load the panel config from `GESTURE_PANEL_CONFIG` or `./panel.yml`.
    /// A missing file is not an error; defaults cover everything.
    pub fn load() -> Result<Self> {
        let path = std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        Self::load_from(Path::new(&path))
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)?;
        serde_yaml::from_str(&contents)
            .map_err(|e| PanelError::ConfigError(format!("{}: {}", path.display(), e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_fill_every_table() {
        let config = PanelConfig::default();
        assert_eq!(config.poll_interval_secs, 5);
        assert_eq!(config.message_secs, 3);
        assert_eq!(config.gestures.len(), 7);
        assert!(config.gestures.iter().any(|g| g == "Open_Palm"));
        assert_eq!(config.commands.len(), 9);
        assert!(config.presets.is_empty());
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = PanelConfig::load_from(&dir.path().join("nope.yml")).unwrap();
        assert_eq!(config.backend_url, "http://127.0.0.1:8080");
    }

    #[test]
    fn test_partial_file_keeps_defaults_for_the_rest() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("panel.yml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "backend_url: \"http://10.0.0.2:8080\"").unwrap();
        writeln!(file, "presets:").unwrap();
        writeln!(file, "  - gaming").unwrap();
        writeln!(file, "  - desk").unwrap();

        let config = PanelConfig::load_from(&path).unwrap();
        assert_eq!(config.backend_url, "http://10.0.0.2:8080");
        assert_eq!(config.presets, vec!["gaming", "desk"]);
        assert_eq!(config.poll_interval_secs, 5);
        assert_eq!(config.gestures.len(), 7);
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("panel.yml");
        std::fs::write(&path, "backend_url: [not, a, string").unwrap();
        assert!(PanelConfig::load_from(&path).is_err());
    }
}
