//! UI Manager for the interactive terminal interface
//!
//! Runs the single cooperative loop that owns the [`SessionController`]:
//! queued completions are applied, keys are translated into controller
//! operations, debounced fits run, and the view is redrawn and reports the
//! terminal pane geometry back to the controller.

use anyhow::Result;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use tracing::{debug, info};

use crossterm::event::{self, Event};

use crate::config::Config;
use crate::session::{Notice, NoticeLevel, SessionController};
use crate::surface::Geometry;

use super::AppState;
use super::tui::{Tui, UiAction, handle_key_event};

/// Pause between loop iterations
const LOOP_TICK: Duration = Duration::from_millis(16);

/// UI Manager for managing the terminal interface
pub struct UIManager {
    /// The multiplexer driven by this loop
    controller: SessionController,
    /// Application state
    app_state: AppState,
    /// TUI terminal handle
    tui: Option<Tui>,
    /// Desired refresh cadence
    refresh_interval: Duration,
    /// Time of the last successful render
    last_render: Instant,
    should_redraw: bool,
    /// Set by the Ctrl+C signal listener
    interrupted: Arc<AtomicBool>,
}

impl UIManager {
    /// Create a new UIManager
    pub fn new(controller: SessionController, config: &Config) -> Self {
        let refresh_interval = Duration::from_millis(config.ui.refresh_rate_ms.clamp(16, 1000));

        Self {
            controller,
            app_state: AppState::new(),
            tui: None,
            refresh_interval,
            last_render: Instant::now(),
            should_redraw: true,
            interrupted: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Run the UI manager
    pub async fn run(&mut self) -> Result<()> {
        info!("Starting UI manager");

        let interrupted = self.interrupted.clone();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("Failed to listen for Ctrl+C: {}", e);
                return;
            }

            tracing::info!("Ctrl+C received, initiating shutdown");
            interrupted.store(true, Ordering::SeqCst);
        });

        self.app_state
            .notify("Ready. Press F1 for keys, Ctrl+N for a new session.");

        let result = self.run_ui_loop().await;
        self.controller.shutdown();

        if let Some(mut tui) = self.tui.take() {
            tui.restore()
                .map_err(|e| anyhow::anyhow!("Failed to restore terminal state: {}", e))?;
        }

        info!("UI manager stopped");
        result
    }

    /// Main UI rendering loop
    async fn run_ui_loop(&mut self) -> Result<()> {
        info!("Starting UI rendering loop");

        self.tui =
            Some(Tui::new().map_err(|e| anyhow::anyhow!("Failed to initialise terminal: {}", e))?);
        self.last_render = Instant::now()
            .checked_sub(self.refresh_interval)
            .unwrap_or_else(Instant::now);

        while !self.app_state.should_quit {
            if self.interrupted.load(Ordering::SeqCst) {
                break;
            }

            // Apply completions from store requests and transports
            self.process_events();

            // Handle terminal input (non-blocking)
            self.poll_terminal_events()?;

            let now = Instant::now();
            if self.controller.poll_resize(now) {
                self.should_redraw = true;
            }

            // Render on dirty state or cadence tick
            if self.should_redraw || now.duration_since(self.last_render) >= self.refresh_interval
            {
                self.render()?;
                self.last_render = now;
            }

            // Prevent busy loop
            tokio::time::sleep(self.sleep_budget()).await;
        }

        Ok(())
    }

    /// Sleep until the next tick or a due resize, whichever comes first
    fn sleep_budget(&self) -> Duration {
        match self.controller.next_resize_deadline() {
            Some(deadline) => deadline
                .saturating_duration_since(Instant::now())
                .min(LOOP_TICK),
            None => LOOP_TICK,
        }
    }

    fn render(&mut self) -> Result<()> {
        let Some(tui) = self.tui.as_mut() else {
            return Ok(());
        };
        let pane = tui
            .draw(&self.app_state, &self.controller)
            .map_err(|e| anyhow::anyhow!("Failed to render frame: {}", e))?;
        self.should_redraw = false;

        // The pane only exists once drawn; report it so a pending surface can attach
        let had_surface = self.controller.surface().is_some();
        self.controller
            .container_ready(Geometry::new(pane.width, pane.height));
        if !had_surface && self.controller.surface().is_some() {
            self.should_redraw = true;
        }
        Ok(())
    }

    /// Process queued controller events
    fn process_events(&mut self) {
        if self.controller.pump() > 0 {
            self.should_redraw = true;
        }

        for notice in self.controller.drain_notices() {
            self.app_state.push_notification(notice);
            self.should_redraw = true;
        }
    }

    /// Poll for keyboard/terminal events and translate into controller actions
    fn poll_terminal_events(&mut self) -> Result<()> {
        while event::poll(Duration::from_millis(0))? {
            match event::read()? {
                Event::Key(key_event) => {
                    let active = self
                        .controller
                        .active_session()
                        .and_then(|id| self.controller.directory().get(id))
                        .cloned();
                    let action = handle_key_event(&mut self.app_state, key_event, active.as_ref());
                    self.should_redraw = true;
                    self.apply_action(action);
                }
                Event::Resize(_, _) => {
                    self.should_redraw = true;
                }
                Event::Mouse(_) | Event::FocusGained | Event::FocusLost | Event::Paste(_) => {}
            }
        }

        Ok(())
    }

    fn apply_action(&mut self, action: UiAction) {
        match action {
            UiAction::None => {}
            UiAction::QuitRequested => {
                info!("User requested quit");
                self.app_state.should_quit = true;
            }
            UiAction::SendInput(line) => {
                if !self.controller.send_input(&line) {
                    let message = if self.controller.active_session().is_none() {
                        "Select or create a session first"
                    } else {
                        "Session is not connected; input dropped"
                    };
                    self.app_state.push_notification(Notice {
                        level: NoticeLevel::Error,
                        message: message.to_string(),
                    });
                }
            }
            UiAction::CreateSession => {
                self.controller.create_session();
                self.app_state.notify("Creating session...");
            }
            UiAction::DeleteActive => {
                if let Some(id) = self.controller.active_session().map(str::to_string) {
                    self.controller.delete_session(&id);
                }
            }
            UiAction::RenameSession { id, name } => {
                self.controller.rename_session(&id, &name);
            }
            UiAction::RefreshSessions => {
                self.controller.list_sessions();
                self.app_state.notify("Reloading sessions...");
            }
            UiAction::ToggleTheme => {
                let theme = self.controller.toggle_theme();
                self.app_state
                    .notify(format!("Switching to {} theme", theme));
            }
            UiAction::CyclePrevious => {
                self.controller.cycle_previous();
            }
            UiAction::CycleNext => {
                self.controller.cycle_next();
            }
            UiAction::SelectIndex(index) => {
                if !self.controller.select_index(index) {
                    debug!("No session to select at index {}", index);
                }
            }
            UiAction::Scroll(delta) => self.controller.scroll(delta),
        }
    }

    /// Controller driven by this loop
    pub fn controller(&self) -> &SessionController {
        &self.controller
    }
}
