// src/app.rs
use std::future;
use std::sync::Arc;

use color_eyre::Result;
use image::DynamicImage;
use ratatui::{
    crossterm::event::{KeyCode, KeyEvent, KeyModifiers},
    DefaultTerminal,
};
use tokio::sync::mpsc;

use crate::backend::{Backend, HttpBackend};
use crate::config::PanelConfig;
use crate::controller::form::FormAction;
use crate::controller::view::PanelView;
use crate::controller::{ControllerMessage, PanelController};
use crate::event::{AppEvent, Event, EventHandler};
use crate::feed::{spawn_feed, FeedHandle};
use crate::log_error;
use crate::ui::frame_view::FrameView;
use crate::ui::state::{Focus, UiState};

/// Application.
#[derive(Debug)]
pub struct App {
    /// Is the application running?
    pub running: bool,
    /// Presentation state; the controller writes it through `PanelView`.
    pub view: UiState,
    /// Most recent feed frame, ready to draw.
    pub frame_view: FrameView,
    controller: PanelController,
    messages: mpsc::UnboundedReceiver<ControllerMessage>,
    feed: Option<FeedHandle>,
    /// Event handler.
    pub events: EventHandler,
}

impl App {
    /// Constructs a new instance of [`App`] against the configured
    /// command server.
    pub fn new(config: PanelConfig) -> Result<Self> {
        let backend: Arc<dyn Backend> = Arc::new(HttpBackend::new(&config.backend_url)?);
        Ok(Self::with_backend(config, backend))
    }

    /// Build the panel around any backend; tests hand in a fake one.
    pub fn with_backend(config: PanelConfig, backend: Arc<dyn Backend>) -> Self {
        let (tx, messages) = mpsc::unbounded_channel();
        let mut view = UiState::new(&config);
        let mut controller = PanelController::new(backend, tx, &config);
        controller.start_health_poller(&mut view);

        Self {
            running: true,
            view,
            frame_view: FrameView::new(),
            controller,
            messages,
            feed: None,
            events: EventHandler::new(),
        }
    }

    /// Run the application's main loop.
    pub async fn run(mut self, mut terminal: DefaultTerminal) -> Result<()> {
        let mut needs_redraw = true;

        while self.running {
            if needs_redraw {
                terminal.draw(|frame| {
                    frame.render_widget(&mut self, frame.area());
                })?;
                needs_redraw = false;
            }

            tokio::select! {
                event = self.events.next() => {
                    match event {
                        Ok(Event::Tick) => {}
                        Ok(Event::Crossterm(event)) => {
                            if let crossterm::event::Event::Key(key_event) = event {
                                self.handle_key_events(key_event)?;
                                needs_redraw = true;
                            }
                        }
                        Ok(Event::App(app_event)) => {
                            self.handle_app_event(app_event);
                            needs_redraw = true;
                        }
                        Err(e) => log_error!("Event error: {}", e),
                    }
                }
                Some(message) = self.messages.recv() => {
                    self.controller.apply(&mut self.view, message);
                    self.reconcile_feed();
                    needs_redraw = true;
                }
                frame = Self::next_frame(&mut self.feed) => {
                    match frame {
                        Some(frame) => self.frame_view.update(frame),
                        None => self.feed = None,
                    }
                    needs_redraw = true;
                }
            }
        }
        Ok(())
    }

    /// Handles the key events and updates the state of [`App`].
    pub fn handle_key_events(&mut self, key_event: KeyEvent) -> Result<()> {
        // A visible alert swallows everything until it is dismissed.
        if self.view.alert_text().is_some() {
            if matches!(key_event.code, KeyCode::Enter | KeyCode::Esc) {
                self.events.send(AppEvent::DismissAlert);
            }
            return Ok(());
        }

        match key_event.code {
            KeyCode::Char('c' | 'C') if key_event.modifiers == KeyModifiers::CONTROL => {
                self.events.send(AppEvent::Quit)
            }
            KeyCode::Esc => self.events.send(AppEvent::Quit),
            KeyCode::Tab | KeyCode::Down => self.events.send(AppEvent::FocusNext),
            KeyCode::BackTab | KeyCode::Up => self.events.send(AppEvent::FocusPrevious),
            KeyCode::Left => self.events.send(AppEvent::CycleLeft),
            KeyCode::Right => self.events.send(AppEvent::CycleRight),
            KeyCode::Enter => {
                if let Some(event) = self.activation_event() {
                    self.events.send(event);
                }
            }
            KeyCode::Backspace => self.view.backspace(),
            KeyCode::Char('q') if self.view.focus != Focus::NameInput => {
                self.events.send(AppEvent::Quit)
            }
            KeyCode::Char(ch) => self.view.type_char(ch),
            _ => {}
        }
        Ok(())
    }

    /// Resolve Enter against the focused control. Disabled controls
    /// resolve to nothing.
    fn activation_event(&self) -> Option<AppEvent> {
        match self.view.focus {
            Focus::PresetSelect => Some(AppEvent::LoadPreset),
            Focus::NameInput | Focus::Mapping(_) => None,
            Focus::ApplyButton => self
                .view
                .submit_enabled()
                .then_some(AppEvent::Submit(FormAction::Apply)),
            Focus::SaveButton => self
                .view
                .submit_enabled()
                .then_some(AppEvent::Submit(FormAction::Save)),
            Focus::ToggleButton => Some(AppEvent::ToggleRecognition),
            Focus::StopClientButton => Some(AppEvent::StopClient),
        }
    }

    fn handle_app_event(&mut self, app_event: AppEvent) {
        match app_event {
            AppEvent::FocusNext => self.view.focus_next(),
            AppEvent::FocusPrevious => self.view.focus_previous(),
            AppEvent::CycleLeft => self.view.cycle(-1),
            AppEvent::CycleRight => self.view.cycle(1),
            AppEvent::LoadPreset => self.load_selected_preset(),
            AppEvent::Submit(action) => {
                // Checked again here: the queue may hold a submit from
                // just before recognition flipped the buttons off.
                if self.view.submit_enabled() {
                    self.controller.submit(action, &self.view.form);
                }
            }
            AppEvent::ToggleRecognition => {
                let target = self.view.recognition_state().toggled();
                self.controller.request_recognition(target);
            }
            AppEvent::StopClient => self.controller.stop_client(),
            AppEvent::DismissAlert => self.view.dismiss_alert(),
            AppEvent::Quit => self.quit(),
        }
    }

    fn load_selected_preset(&mut self) {
        let name = self
            .view
            .form
            .selected_preset_name()
            .unwrap_or_default()
            .to_string();
        self.controller.load_preset(&mut self.view, &name);
    }

    /// Line the feed task up with what the view says should be showing.
    fn reconcile_feed(&mut self) {
        match self.view.video_source() {
            Some(source) => {
                let stale = self.feed.as_ref().map(|feed| feed.url != source).unwrap_or(true);
                if stale {
                    self.feed = Some(spawn_feed(source.to_string()));
                    self.frame_view.clear();
                }
            }
            None => {
                if self.feed.take().is_some() {
                    self.frame_view.clear();
                }
            }
        }
    }

    async fn next_frame(feed: &mut Option<FeedHandle>) -> Option<DynamicImage> {
        match feed {
            Some(handle) => handle.frames.recv().await,
            None => future::pending().await,
        }
    }

    /// Set running to false to quit the application.
    pub fn quit(&mut self) {
        self.running = false;
    }
}
