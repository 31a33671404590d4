// src/controller/mod.rs
// Owns every interaction between the panel and the command server: preset
// loading, form submission, the start/stop toggle and the health poller.
// Backend calls run on spawned tasks; their results come back here as
// `ControllerMessage`s and are folded into the view on the UI task.

pub mod form;
pub mod view;

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::backend::{epoch_millis, Backend, SubmitOutcome};
use crate::config::PanelConfig;
use crate::{log_debug, log_error, log_info, log_warn};
use form::{is_valid_preset_name, FormAction, FormState};
use view::{PanelView, RecognitionState};

pub const SERVER_UNREACHABLE_MSG: &str = "Command server unreachable.";
pub const SERVER_RUNNING_MSG: &str = "Command server running.";
pub const NETWORK_ERROR_MSG: &str = "Network error.";
pub const INVALID_NAME_MSG: &str =
    "Invalid configuration name. Use letters, numbers and underscores only.";
const APPLY_OK_MSG: &str = "Configuration applied.";
const SAVE_OK_MSG: &str = "Configuration saved.";
const SUBMIT_FAILED_MSG: &str = "Request failed.";

/// Completion of a backend call, queued for the UI task.
#[derive(Debug)]
pub enum ControllerMessage {
    PresetLoaded {
        name: String,
        values: Vec<(String, String)>,
    },
    PresetLoadFailed {
        name: String,
        error: String,
    },
    SubmitResolved {
        action: FormAction,
        submitted_name: Option<String>,
        outcome: SubmitOutcome,
    },
    SubmitFailed {
        action: FormAction,
        error: String,
    },
    ToggleResolved {
        generation: u64,
        target: RecognitionState,
        ok: bool,
    },
    ClientStopResolved {
        ok: bool,
    },
    ServerChecked {
        ok: bool,
    },
    HideMessage {
        stamp: u64,
    },
}

#[derive(Debug)]
pub struct PanelController {
    backend: Arc<dyn Backend>,
    tx: mpsc::UnboundedSender<ControllerMessage>,
    /// Bumped on every toggle request and on reset. Replies carrying an
    /// older generation are dropped so a slow start cannot overwrite the
    /// outcome of a later stop.
    toggle_generation: u64,
    poller: Option<JoinHandle<()>>,
    poll_interval: Duration,
    message_duration: Duration,
}

impl PanelController {
    pub fn new(
        backend: Arc<dyn Backend>,
        tx: mpsc::UnboundedSender<ControllerMessage>,
        config: &PanelConfig,
    ) -> Self {
        Self {
            backend,
            tx,
            toggle_generation: 0,
            poller: None,
            poll_interval: Duration::from_secs(config.poll_interval_secs),
            message_duration: Duration::from_secs(config.message_secs),
        }
    }

    /// Fetch a preset and queue its field values. An empty name is a
    /// silent no-op; a name with anything beyond letters, digits or
    /// underscores never reaches the backend.
    pub fn load_preset(&self, view: &mut dyn PanelView, name: &str) {
        if name.is_empty() {
            return;
        }
        if !is_valid_preset_name(name) {
            log_warn!("Rejected configuration name {:?}", name);
            view.show_alert(INVALID_NAME_MSG);
            return;
        }

        log_info!("Loading configuration {:?}", name);
        let backend = Arc::clone(&self.backend);
        let tx = self.tx.clone();
        let name = name.to_string();
        tokio::spawn(async move {
            let message = match backend.fetch_preset(&name).await {
                Ok(values) => ControllerMessage::PresetLoaded { name, values },
                Err(e) => ControllerMessage::PresetLoadFailed {
                    name,
                    error: e.to_string(),
                },
            };
            let _ = tx.send(message);
        });
    }

    /// POST the whole form. The payload is assembled before the task is
    /// spawned so later edits cannot leak into an in-flight submission.
    pub fn submit(&self, action: FormAction, form: &FormState) {
        let payload = form.payload(action);
        let submitted_name = form.submitted_name();
        log_info!("Submitting form ({})", action.as_str());
        let backend = Arc::clone(&self.backend);
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let message = match backend.submit_form(payload).await {
                Ok(outcome) => ControllerMessage::SubmitResolved {
                    action,
                    submitted_name,
                    outcome,
                },
                Err(e) => ControllerMessage::SubmitFailed {
                    action,
                    error: e.to_string(),
                },
            };
            let _ = tx.send(message);
        });
    }

    /// Ask the backend to move recognition into `target`. Returns the
    /// generation stamped onto the eventual reply.
    pub fn request_recognition(&mut self, target: RecognitionState) -> u64 {
        self.toggle_generation += 1;
        let generation = self.toggle_generation;
        let verb = match target {
            RecognitionState::Active => "start",
            RecognitionState::Inactive => "stop",
        };
        log_info!("Requesting recognition {}", verb);

        let backend = Arc::clone(&self.backend);
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let call = match target {
                RecognitionState::Active => backend.start_recognition().await,
                RecognitionState::Inactive => backend.stop_recognition().await,
            };
            let ok = match call {
                Ok(ok) => ok,
                Err(e) => {
                    log_error!("Recognition {} request failed: {}", verb, e);
                    false
                }
            };
            let _ = tx.send(ControllerMessage::ToggleResolved {
                generation,
                target,
                ok,
            });
        });
        generation
    }

    /// Ask the remote client process to shut itself down.
    pub fn stop_client(&self) {
        log_info!("Requesting client shutdown");
        let backend = Arc::clone(&self.backend);
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let ok = match backend.stop_client().await {
                Ok(ok) => ok,
                Err(e) => {
                    log_error!("Client shutdown request failed: {}", e);
                    false
                }
            };
            let _ = tx.send(ControllerMessage::ClientStopResolved { ok });
        });
    }

    /// Start probing the command server. The status line drops to the
    /// unreachable text immediately; the first probe fires one interval
    /// later and polling stops on the first success.
    pub fn start_health_poller(&mut self, view: &mut dyn PanelView) {
        self.stop_health_poller();
        view.set_server_message(SERVER_UNREACHABLE_MSG);

        let backend = Arc::clone(&self.backend);
        let tx = self.tx.clone();
        let interval = self.poll_interval;
        self.poller = Some(tokio::spawn(async move {
            loop {
                tokio::time::sleep(interval).await;
                let ok = match backend.check_server().await {
                    Ok(ok) => ok,
                    Err(e) => {
                        log_debug!("Health probe failed: {}", e);
                        false
                    }
                };
                if tx.send(ControllerMessage::ServerChecked { ok }).is_err() {
                    break;
                }
            }
        }));
    }

    pub fn stop_health_poller(&mut self) {
        if let Some(poller) = self.poller.take() {
            poller.abort();
        }
    }

    pub fn poller_active(&self) -> bool {
        self.poller.is_some()
    }

    /// Fold one completed backend call into the view. Runs on the UI
    /// task, so everything here is synchronous.
    pub fn apply(&mut self, view: &mut dyn PanelView, message: ControllerMessage) {
        match message {
            ControllerMessage::PresetLoaded { name, values } => {
                log_info!("Configuration {:?} loaded ({} fields)", name, values.len());
                for (field, value) in values {
                    if !view.set_field(&field, &value) {
                        log_warn!(
                            "Configuration {:?} names unknown field {:?}, skipping",
                            name,
                            field
                        );
                    }
                }
            }
            ControllerMessage::PresetLoadFailed { name, error } => {
                // Loading is best-effort; the form simply keeps its values.
                log_error!("Failed to load configuration {:?}: {}", name, error);
            }
            ControllerMessage::SubmitResolved {
                action,
                submitted_name,
                outcome,
            } => {
                let text = submit_feedback(action, &outcome);
                let stamp = view.show_message(&text);
                self.schedule_message_expiry(stamp);
                if outcome.ok {
                    if action == FormAction::Save {
                        if let Some(name) = submitted_name {
                            view.insert_preset_sorted(&name);
                        }
                    }
                } else {
                    log_error!("Form {} rejected: {}", action.as_str(), text);
                }
            }
            ControllerMessage::SubmitFailed { action, error } => {
                log_error!("Form {} failed: {}", action.as_str(), error);
                view.show_alert(NETWORK_ERROR_MSG);
            }
            ControllerMessage::ToggleResolved {
                generation,
                target,
                ok,
            } => {
                if generation != self.toggle_generation {
                    log_debug!(
                        "Dropping stale toggle reply (generation {}, current {})",
                        generation,
                        self.toggle_generation
                    );
                    return;
                }
                if !ok {
                    log_error!(
                        "Recognition {} refused, leaving panel unchanged",
                        match target {
                            RecognitionState::Active => "start",
                            RecognitionState::Inactive => "stop",
                        }
                    );
                    return;
                }
                view.set_recognition_state(target);
                match target {
                    RecognitionState::Active => {
                        view.set_submit_enabled(false);
                        let url = self.backend.video_feed_url(epoch_millis());
                        view.set_video_source(Some(url));
                        log_info!("Recognition active");
                    }
                    RecognitionState::Inactive => {
                        view.set_submit_enabled(true);
                        view.set_video_source(None);
                        log_info!("Recognition inactive");
                    }
                }
            }
            ControllerMessage::ClientStopResolved { ok } => {
                if ok {
                    log_info!("Client stopped, resetting panel");
                    // Replies to anything started before the reset are stale.
                    self.toggle_generation += 1;
                    view.reset();
                    self.start_health_poller(view);
                } else {
                    log_error!("Client refused to stop");
                }
            }
            ControllerMessage::ServerChecked { ok } => {
                if ok {
                    view.set_server_message(SERVER_RUNNING_MSG);
                    self.stop_health_poller();
                    log_info!("Command server reachable, polling stopped");
                } else {
                    view.set_server_message(SERVER_UNREACHABLE_MSG);
                }
            }
            ControllerMessage::HideMessage { stamp } => {
                view.hide_message(stamp);
            }
        }
    }

    fn schedule_message_expiry(&self, stamp: u64) {
        let tx = self.tx.clone();
        let duration = self.message_duration;
        tokio::spawn(async move {
            tokio::time::sleep(duration).await;
            let _ = tx.send(ControllerMessage::HideMessage { stamp });
        });
    }
}

impl Drop for PanelController {
    fn drop(&mut self) {
        self.stop_health_poller();
    }
}

/// Pick the transient feedback text for a resolved submission. The
/// server's own words win; the fixed texts only cover replies without
/// them.
fn submit_feedback(action: FormAction, outcome: &SubmitOutcome) -> String {
    if outcome.ok {
        outcome.reply.message.clone().unwrap_or_else(|| {
            match action {
                FormAction::Apply => APPLY_OK_MSG,
                FormAction::Save => SAVE_OK_MSG,
            }
            .to_string()
        })
    } else {
        outcome
            .reply
            .error
            .clone()
            .or_else(|| outcome.reply.message.clone())
            .unwrap_or_else(|| SUBMIT_FAILED_MSG.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::SubmitReply;

    fn outcome(ok: bool, message: Option<&str>, error: Option<&str>) -> SubmitOutcome {
        SubmitOutcome {
            ok,
            reply: SubmitReply {
                status: None,
                message: message.map(String::from),
                error: error.map(String::from),
            },
        }
    }

    #[test]
    fn test_feedback_prefers_server_text() {
        let text = submit_feedback(FormAction::Apply, &outcome(true, Some("Mapped 3 gestures."), None));
        assert_eq!(text, "Mapped 3 gestures.");
    }

    #[test]
    fn test_feedback_falls_back_per_action() {
        assert_eq!(
            submit_feedback(FormAction::Apply, &outcome(true, None, None)),
            APPLY_OK_MSG
        );
        assert_eq!(
            submit_feedback(FormAction::Save, &outcome(true, None, None)),
            SAVE_OK_MSG
        );
    }

    #[test]
    fn test_feedback_surfaces_rejections() {
        assert_eq!(
            submit_feedback(FormAction::Save, &outcome(false, None, Some("No name given."))),
            "No name given."
        );
        assert_eq!(
            submit_feedback(FormAction::Save, &outcome(false, None, None)),
            SUBMIT_FAILED_MSG
        );
    }
}
