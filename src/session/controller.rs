//! Session Controller for the multiplexed session view
//!
//! Owns the session directory, the theme preference and at most one
//! [`ActiveBinding`] (transport + surface + resize coordinator for the
//! foreground session). All asynchronous completions come back as
//! [`ControllerEvent`]s and are applied by [`SessionController::handle_event`];
//! each carries a binding id or request ticket that is checked against the
//! current state before anything is applied.

use std::collections::VecDeque;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, error, info, warn};

use super::action_channel::{ActionChannel, ControllerEvent, RequestTicket};
use super::directory::SessionDirectory;
use super::preferences::PreferenceStore;
use crate::remote::{SessionRecord, SessionStore, StoreError};
use crate::surface::{Geometry, ResizeCoordinator, TerminalOptions, TerminalSurface, Theme};
use crate::transport::{
    BindingId, ConnectionStatus, Connector, FrameSink, InboundFrame, Transport, TransportError,
    TransportEvent,
};

/// Delay before the single attach retry
const ATTACH_RETRY_DELAY: Duration = Duration::from_millis(16);
/// First attempt plus one retry
const MAX_ATTACH_ATTEMPTS: u8 = 2;
const MARKER_RULE_WIDTH: usize = 48;

/// Controller tuning taken from the configuration
#[derive(Debug, Clone)]
pub struct ControllerSettings {
    pub resize_debounce: Duration,
    pub terminal: TerminalOptions,
    pub default_theme: Theme,
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self {
            resize_debounce: Duration::from_millis(100),
            terminal: TerminalOptions::default(),
            default_theme: Theme::Dark,
        }
    }
}

/// Observable controller state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerState {
    Idle,
    Bound,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Error,
}

/// User-facing message produced by a completed operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

/// Frames received before the surface exists, in arrival order
type PendingFrames = VecDeque<String>;

enum SurfaceSlot {
    Pending(PendingFrames),
    Attached {
        surface: TerminalSurface,
        resize: ResizeCoordinator,
    },
}

/// The foreground session's live resources
struct ActiveBinding {
    id: BindingId,
    session_id: String,
    transport: Box<dyn Transport>,
    slot: SurfaceSlot,
    ended: bool,
}

impl ActiveBinding {
    /// Write to the surface, or queue until the surface exists
    fn render(&mut self, text: &str) {
        match &mut self.slot {
            SurfaceSlot::Pending(frames) => frames.push_back(text.to_string()),
            SurfaceSlot::Attached { surface, .. } => {
                if let Err(e) = surface.write(text) {
                    warn!("Dropped output for binding {}: {}", self.id, e);
                }
            }
        }
    }

    /// Detach resize, close the transport, then dispose the surface
    fn teardown(mut self) {
        if let SurfaceSlot::Attached { resize, .. } = &mut self.slot {
            resize.detach();
        }
        self.transport.close();
        if let SurfaceSlot::Attached { surface, .. } = &mut self.slot {
            surface.dispose();
        }
        debug!(
            "Tore down binding {} for session {}",
            self.id, self.session_id
        );
    }
}

fn user_marker(text: &str) -> String {
    let rule = "─".repeat(MARKER_RULE_WIDTH);
    format!(
        "\n\x1b[36m{rule}\x1b[0m\n\x1b[1;36mUser:\x1b[0m {text}\n\x1b[36m{rule}\x1b[0m\n"
    )
}

fn error_marker(content: &str) -> String {
    let line_end = if content.ends_with('\n') { "" } else { "\n" };
    format!("\x1b[31m[error]\x1b[0m {content}{line_end}")
}

fn closed_marker(reason: Option<&str>) -> String {
    match reason {
        Some(reason) => format!("\n\x1b[2m[connection closed: {reason}]\x1b[0m\n"),
        None => "\n\x1b[2m[connection closed]\x1b[0m\n".to_string(),
    }
}

/// Multiplexes N logical sessions onto one surface and one transport
pub struct SessionController {
    store: Arc<dyn SessionStore>,
    connector: Arc<dyn Connector>,
    settings: ControllerSettings,
    channel: ActionChannel,
    directory: SessionDirectory,
    preferences: PreferenceStore,
    active: Option<ActiveBinding>,
    last_binding: BindingId,
    container: Option<Geometry>,
    /// Bumped on every successful selection
    selection: u64,
    list_ticket: u64,
    notices: Vec<Notice>,
}

impl SessionController {
    /// Create a controller with the default theme and an empty directory
    pub fn new(
        store: Arc<dyn SessionStore>,
        connector: Arc<dyn Connector>,
        settings: ControllerSettings,
    ) -> Self {
        let preferences = PreferenceStore::new(settings.default_theme);
        Self {
            store,
            connector,
            settings,
            channel: ActionChannel::new(),
            directory: SessionDirectory::new(),
            preferences,
            active: None,
            last_binding: BindingId::new(0),
            container: None,
            selection: 0,
            list_ticket: 0,
            notices: Vec::new(),
        }
    }

    /// Load the theme preference, then request the session listing
    pub async fn start(
        store: Arc<dyn SessionStore>,
        connector: Arc<dyn Connector>,
        settings: ControllerSettings,
    ) -> Self {
        let preferences = PreferenceStore::load(store.as_ref(), settings.default_theme).await;
        let mut controller = Self::new(store, connector, settings);
        controller.preferences = preferences;
        controller.list_sessions();
        info!(
            "Session controller started ({} theme)",
            controller.preferences.get()
        );
        controller
    }

    fn spawn_request<F, Fut>(&self, request: F)
    where
        F: FnOnce(Arc<dyn SessionStore>) -> Fut,
        Fut: Future<Output = ControllerEvent> + Send + 'static,
    {
        let tx = self.channel.event_tx();
        let future = request(self.store.clone());
        tokio::spawn(async move {
            let event = future.await;
            if tx.send(event).is_err() {
                debug!("Controller gone, dropping store completion");
            }
        });
    }

    /// Refresh the directory from the store. Only the latest listing is applied.
    pub fn list_sessions(&mut self) -> RequestTicket {
        self.list_ticket += 1;
        let ticket = RequestTicket(self.list_ticket);
        debug!("Requesting session listing {:?}", ticket);
        self.spawn_request(move |store| async move {
            ControllerEvent::SessionsListed {
                ticket,
                result: store.list_sessions().await,
            }
        });
        ticket
    }

    /// Ask the store for a new session; the server assigns its name
    pub fn create_session(&mut self) {
        let selection = self.selection;
        debug!("Requesting new session");
        self.spawn_request(move |store| async move {
            ControllerEvent::SessionCreated {
                selection,
                result: store.create_session("").await,
            }
        });
    }

    /// Make `id` the foreground session. Returns true when a new binding was
    /// opened.
    pub fn select_session(&mut self, id: &str) -> bool {
        if let Some(active) = &self.active {
            if active.session_id == id && !active.ended {
                debug!("Session {} already active", id);
                return false;
            }
        }
        if !self.directory.contains(id) {
            warn!("Cannot select unknown session {}", id);
            return false;
        }

        self.selection += 1;
        // Old binding is fully gone before the new transport exists
        self.teardown();

        let binding = self.last_binding.next();
        self.last_binding = binding;
        let sink = FrameSink::new(binding, self.channel.event_tx());
        let transport = self.connector.open(id, sink);
        self.active = Some(ActiveBinding {
            id: binding,
            session_id: id.to_string(),
            transport,
            slot: SurfaceSlot::Pending(PendingFrames::new()),
            ended: false,
        });
        info!("Selected session {} (binding {})", id, binding);

        self.schedule_attach(binding, 0);
        true
    }

    fn schedule_attach(&self, binding: BindingId, attempt: u8) {
        let event = ControllerEvent::AttachSurface { binding, attempt };
        if attempt == 0 {
            if let Err(e) = self.channel.send_event(event) {
                error!("Failed to queue surface attach: {}", e);
            }
            return;
        }

        let tx = self.channel.event_tx();
        tokio::spawn(async move {
            tokio::time::sleep(ATTACH_RETRY_DELAY).await;
            let _ = tx.send(event);
        });
    }

    fn attach_surface(&mut self, binding: BindingId, attempt: Option<u8>) {
        let container = self.container;
        let theme = self.preferences.get();
        let debounce = self.settings.resize_debounce;

        let Some(active) = self.active.as_mut().filter(|active| active.id == binding) else {
            debug!("Discarding attach for stale binding {}", binding);
            return;
        };
        let SurfaceSlot::Pending(frames) = &mut active.slot else {
            return;
        };

        match TerminalSurface::create(theme, &self.settings.terminal, container) {
            Ok(mut surface) => {
                let buffered = std::mem::take(frames);
                let count = buffered.len();
                for text in buffered {
                    if let Err(e) = surface.write(&text) {
                        warn!("Failed to flush buffered output: {}", e);
                    }
                }
                let observed = container.unwrap_or_else(|| surface.geometry());
                let resize = ResizeCoordinator::attach(binding, observed, debounce);
                active.slot = SurfaceSlot::Attached { surface, resize };
                debug!(
                    "Attached surface for binding {} ({} buffered frames)",
                    binding, count
                );
            }
            Err(e) => match attempt {
                Some(attempt) if attempt + 1 < MAX_ATTACH_ATTEMPTS => {
                    debug!("Surface attach for binding {} deferred: {}", binding, e);
                    self.schedule_attach(binding, attempt + 1);
                }
                Some(_) => warn!(
                    "Surface for binding {} still unavailable ({}); output buffered until the view is ready",
                    binding, e
                ),
                None => debug!("Container attach for binding {} failed: {}", binding, e),
            },
        }
    }

    /// Remove a session from the store; the active binding is torn down on success
    pub fn delete_session(&mut self, id: &str) {
        let id = id.to_string();
        debug!("Requesting delete of session {}", id);
        self.spawn_request(move |store| async move {
            let result = store.delete_session(&id).await;
            ControllerEvent::SessionDeleted { id, result }
        });
    }

    /// Rename a session. Blank names are refused locally.
    pub fn rename_session(&mut self, id: &str, name: &str) -> bool {
        let name = name.trim().to_string();
        if name.is_empty() {
            self.notices.push(Notice::error("Session name cannot be empty"));
            return false;
        }
        let id = id.to_string();
        self.spawn_request(move |store| async move {
            let result = store.rename_session(&id, &name).await;
            ControllerEvent::SessionRenamed { id, result }
        });
        true
    }

    /// Forward one line of input to the active session. Returns true when a
    /// frame was sent.
    pub fn send_input(&mut self, text: &str) -> bool {
        if text.trim().is_empty() {
            return false;
        }
        let Some(active) = self.active.as_mut() else {
            debug!("No bound session, input dropped");
            return false;
        };

        match active.transport.send(text) {
            Ok(()) => {
                active.render(&user_marker(text));
                true
            }
            Err(TransportError::NotOpen) => {
                warn!(
                    "Session {} is not connected, input dropped",
                    active.session_id
                );
                false
            }
            Err(e) => {
                error!("Failed to send input to {}: {}", active.session_id, e);
                false
            }
        }
    }

    pub fn cycle_next(&mut self) -> bool {
        let target = self
            .directory
            .next_after(self.active_session())
            .map(|record| record.id.clone());
        self.select_target(target)
    }

    pub fn cycle_previous(&mut self) -> bool {
        let target = self
            .directory
            .previous_before(self.active_session())
            .map(|record| record.id.clone());
        self.select_target(target)
    }

    fn select_target(&mut self, target: Option<String>) -> bool {
        match target {
            Some(id) => self.select_session(&id),
            None => false,
        }
    }

    /// Select the session at `index` in directory order
    pub fn select_index(&mut self, index: usize) -> bool {
        let target = self
            .directory
            .records()
            .get(index)
            .map(|record| record.id.clone());
        self.select_target(target)
    }

    /// Flip the theme. It is applied once the store confirms the write.
    pub fn toggle_theme(&mut self) -> Theme {
        let theme = self.preferences.requested().toggled();
        match self.preferences.begin_set(theme) {
            Some(ticket) => self.persist_theme(ticket, theme),
            None => debug!("Theme {} queued behind the write in flight", theme),
        }
        theme
    }

    fn persist_theme(&self, ticket: RequestTicket, theme: Theme) {
        debug!("Persisting theme {} {:?}", theme, ticket);
        self.spawn_request(move |store| async move {
            ControllerEvent::ThemePersisted {
                ticket,
                theme,
                result: store.set_theme(theme).await,
            }
        });
    }

    /// Report the terminal pane geometry after a draw
    pub fn container_ready(&mut self, geometry: Geometry) {
        if geometry.is_empty() {
            self.container_lost();
            return;
        }
        let changed = self.container != Some(geometry);
        self.container = Some(geometry);

        let Some(active) = self.active.as_mut() else {
            return;
        };
        if matches!(active.slot, SurfaceSlot::Pending(_)) {
            let binding = active.id;
            self.attach_surface(binding, None);
            return;
        }
        if let SurfaceSlot::Attached { resize, .. } = &mut active.slot {
            if changed {
                resize.observe(geometry, Instant::now());
            }
        }
    }

    /// The terminal pane is no longer on screen
    pub fn container_lost(&mut self) {
        if self.container.take().is_some() {
            debug!("Terminal container lost");
        }
    }

    /// Run a due debounced fit. Returns true when the surface was resized.
    pub fn poll_resize(&mut self, now: Instant) -> bool {
        let Some(active) = self.active.as_mut() else {
            return false;
        };
        let SurfaceSlot::Attached { surface, resize } = &mut active.slot else {
            return false;
        };
        let Some(geometry) = resize.poll(now) else {
            return false;
        };
        match surface.fit(geometry) {
            Ok(fitted) => {
                debug!(
                    "Resized binding {} to {}x{}",
                    active.id, fitted.cols, fitted.rows
                );
                true
            }
            Err(e) => {
                warn!("Resize of binding {} failed: {}", active.id, e);
                false
            }
        }
    }

    pub fn next_resize_deadline(&self) -> Option<Instant> {
        match &self.active.as_ref()?.slot {
            SurfaceSlot::Attached { resize, .. } => resize.next_deadline(),
            SurfaceSlot::Pending(_) => None,
        }
    }

    /// Scroll the active surface into its scrollback
    pub fn scroll(&mut self, delta: i32) {
        if let Some(ActiveBinding {
            slot: SurfaceSlot::Attached { surface, .. },
            ..
        }) = self.active.as_mut()
        {
            if let Err(e) = surface.scroll_by(delta) {
                debug!("Scroll ignored: {}", e);
            }
        }
    }

    /// Wait for the next asynchronous completion
    pub async fn next_event(&mut self) -> Option<ControllerEvent> {
        self.channel.next_event().await
    }

    pub fn try_next_event(&mut self) -> Option<ControllerEvent> {
        self.channel.try_next_event()
    }

    /// Apply every completion that is already queued; returns how many ran
    pub fn pump(&mut self) -> usize {
        let mut handled = 0;
        while let Some(event) = self.channel.try_next_event() {
            self.handle_event(event);
            handled += 1;
        }
        handled
    }

    /// Apply one asynchronous completion
    pub fn handle_event(&mut self, event: ControllerEvent) {
        match event {
            ControllerEvent::Transport { binding, event } => {
                self.on_transport_event(binding, event)
            }
            ControllerEvent::AttachSurface { binding, attempt } => {
                self.attach_surface(binding, Some(attempt))
            }
            ControllerEvent::SessionsListed { ticket, result } => {
                self.on_sessions_listed(ticket, result)
            }
            ControllerEvent::SessionCreated { selection, result } => {
                self.on_session_created(selection, result)
            }
            ControllerEvent::SessionRenamed { id, result } => self.on_session_renamed(id, result),
            ControllerEvent::SessionDeleted { id, result } => self.on_session_deleted(id, result),
            ControllerEvent::ThemePersisted {
                ticket,
                theme,
                result,
            } => self.on_theme_persisted(ticket, theme, result),
        }
    }

    fn on_transport_event(&mut self, binding: BindingId, event: TransportEvent) {
        let Some(active) = self.active.as_mut().filter(|active| active.id == binding) else {
            debug!("Discarding transport event for stale binding {}", binding);
            return;
        };

        match event {
            TransportEvent::Frame(InboundFrame::Output { content }) => active.render(&content),
            TransportEvent::Frame(InboundFrame::Error { content }) => {
                warn!("Session {} reported: {}", active.session_id, content);
                active.render(&error_marker(&content));
            }
            TransportEvent::Closed { reason } => {
                info!(
                    "Connection to session {} closed{}",
                    active.session_id,
                    reason
                        .as_deref()
                        .map(|r| format!(": {}", r))
                        .unwrap_or_default()
                );
                active.ended = true;
                active.render(&closed_marker(reason.as_deref()));
            }
        }
    }

    fn on_sessions_listed(
        &mut self,
        ticket: RequestTicket,
        result: Result<Vec<SessionRecord>, StoreError>,
    ) {
        if ticket.0 != self.list_ticket {
            debug!("Discarding stale session listing {:?}", ticket);
            return;
        }
        match result {
            Ok(records) => {
                info!("Loaded {} sessions", records.len());
                self.directory.replace(records);
            }
            Err(e) => {
                error!("Failed to list sessions: {}", e);
                self.notices
                    .push(Notice::error(format!("Failed to list sessions: {}", e)));
            }
        }
    }

    /// A listing requested before a local change would undo it
    fn invalidate_listings(&mut self) {
        self.list_ticket += 1;
    }

    fn on_session_created(&mut self, selection: u64, result: Result<SessionRecord, StoreError>) {
        match result {
            Ok(record) => {
                info!("Created session {} ({})", record.name, record.id);
                self.invalidate_listings();
                let id = record.id.clone();
                self.notices
                    .push(Notice::info(format!("Created {}", record.name)));
                self.directory.append(record);
                if selection == self.selection {
                    self.select_session(&id);
                } else {
                    debug!("Selection changed while creating {}, not switching", id);
                }
            }
            Err(e) => {
                error!("Failed to create session: {}", e);
                self.notices
                    .push(Notice::error(format!("Failed to create session: {}", e)));
            }
        }
    }

    fn on_session_renamed(&mut self, id: String, result: Result<SessionRecord, StoreError>) {
        match result {
            Ok(record) => {
                self.invalidate_listings();
                if self.directory.rename(&id, record.name.clone()) {
                    info!("Renamed session {} to {}", id, record.name);
                    self.notices
                        .push(Notice::info(format!("Renamed to {}", record.name)));
                } else {
                    debug!("Renamed session {} is no longer listed", id);
                }
            }
            Err(e) => {
                error!("Failed to rename session {}: {}", id, e);
                self.notices
                    .push(Notice::error(format!("Failed to rename session: {}", e)));
            }
        }
    }

    fn on_session_deleted(&mut self, id: String, result: Result<(), StoreError>) {
        match result {
            Ok(()) => {
                self.invalidate_listings();
                let name = self
                    .directory
                    .remove(&id)
                    .map(|record| record.name)
                    .unwrap_or_else(|| id.clone());
                if self.active_session() == Some(id.as_str()) {
                    self.teardown();
                }
                info!("Deleted session {}", id);
                self.notices.push(Notice::info(format!("Deleted {}", name)));
            }
            Err(e) => {
                error!("Failed to delete session {}: {}", id, e);
                self.notices
                    .push(Notice::error(format!("Failed to delete session: {}", e)));
            }
        }
    }

    fn on_theme_persisted(
        &mut self,
        ticket: RequestTicket,
        theme: Theme,
        result: Result<(), StoreError>,
    ) {
        match result {
            Ok(()) => {
                if !self.preferences.complete(ticket, theme) {
                    debug!("Discarding stale theme write {:?}", ticket);
                    return;
                }
                if let Some(ActiveBinding {
                    slot: SurfaceSlot::Attached { surface, .. },
                    ..
                }) = self.active.as_mut()
                {
                    if let Err(e) = surface.apply_theme(theme) {
                        warn!("Failed to apply theme: {}", e);
                    }
                }
                info!("Theme set to {}", theme);
                if let Some((ticket, queued)) = self.preferences.start_queued() {
                    self.persist_theme(ticket, queued);
                }
            }
            Err(e) => {
                if self.preferences.abandon(ticket) {
                    error!("Failed to persist theme {}: {}", theme, e);
                    self.notices
                        .push(Notice::error(format!("Failed to save theme: {}", e)));
                }
            }
        }
    }

    fn teardown(&mut self) {
        if let Some(active) = self.active.take() {
            active.teardown();
        }
    }

    /// Release the active binding
    pub fn shutdown(&mut self) {
        self.teardown();
        info!("Session controller shut down");
    }

    /// Notices produced since the last call
    pub fn drain_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    pub fn state(&self) -> ControllerState {
        if self.active.is_some() {
            ControllerState::Bound
        } else {
            ControllerState::Idle
        }
    }

    pub fn active_session(&self) -> Option<&str> {
        self.active.as_ref().map(|active| active.session_id.as_str())
    }

    pub fn binding_id(&self) -> Option<BindingId> {
        self.active.as_ref().map(|active| active.id)
    }

    pub fn directory(&self) -> &SessionDirectory {
        &self.directory
    }

    /// Committed theme
    pub fn theme(&self) -> Theme {
        self.preferences.get()
    }

    pub fn preferences(&self) -> &PreferenceStore {
        &self.preferences
    }

    pub fn surface(&self) -> Option<&TerminalSurface> {
        match &self.active.as_ref()?.slot {
            SurfaceSlot::Attached { surface, .. } => Some(surface),
            SurfaceSlot::Pending(_) => None,
        }
    }

    /// Frames waiting for the surface to attach
    pub fn pending_frames(&self) -> usize {
        match self.active.as_ref().map(|active| &active.slot) {
            Some(SurfaceSlot::Pending(frames)) => frames.len(),
            _ => 0,
        }
    }

    pub fn connection_status(&self) -> Option<ConnectionStatus> {
        let active = self.active.as_ref()?;
        if active.ended {
            Some(ConnectionStatus::Closed)
        } else {
            Some(active.transport.status())
        }
    }
}

impl Drop for SessionController {
    fn drop(&mut self) {
        self.teardown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::InMemoryStore;
    use crate::transport::MockConnector;
    use crate::transport::mock::ConnectionLogEntry;

    fn controller(sessions: &[&str]) -> (SessionController, MockConnector) {
        let store = InMemoryStore::with_sessions(
            sessions
                .iter()
                .map(|id| SessionRecord::new(*id, format!("Session {}", id)))
                .collect(),
        );
        let connector = MockConnector::new();
        let mut controller = SessionController::new(
            Arc::new(store.clone()),
            Arc::new(connector.clone()),
            ControllerSettings::default(),
        );
        controller.directory.replace(store.sessions());
        (controller, connector)
    }

    #[test]
    fn test_markers() {
        assert!(user_marker("ls").contains("User:\x1b[0m ls"));
        assert_eq!(error_marker("boom\n"), "\x1b[31m[error]\x1b[0m boom\n");
        assert_eq!(error_marker("boom"), "\x1b[31m[error]\x1b[0m boom\n");
        assert!(closed_marker(None).contains("[connection closed]"));
        assert!(closed_marker(Some("eof")).contains("[connection closed: eof]"));
    }

    #[tokio::test]
    async fn test_select_buffers_until_attach() {
        let (mut controller, connector) = controller(&["a"]);

        assert!(controller.select_session("a"));
        let binding = controller.binding_id().unwrap();
        assert_eq!(controller.state(), ControllerState::Bound);

        connector.push_frame(
            binding,
            InboundFrame::Output {
                content: "early\n".to_string(),
            },
        );
        controller.pump();

        // no container yet: the frame waits
        assert!(controller.surface().is_none());
        assert_eq!(controller.pending_frames(), 1);

        controller.container_ready(Geometry::new(80, 24));
        assert!(controller.surface().unwrap().contents().contains("early"));
        assert_eq!(controller.pending_frames(), 0);
    }

    #[tokio::test]
    async fn test_reselect_is_noop() {
        let (mut controller, connector) = controller(&["a"]);
        controller.container_ready(Geometry::new(80, 24));

        assert!(controller.select_session("a"));
        assert!(!controller.select_session("a"));
        assert!(!controller.select_session("missing"));
        assert_eq!(connector.log().len(), 1);
    }

    #[tokio::test]
    async fn test_closed_session_can_be_reselected() {
        let (mut controller, connector) = controller(&["a"]);
        controller.container_ready(Geometry::new(80, 24));
        controller.select_session("a");
        controller.pump();
        let first = controller.binding_id().unwrap();

        connector.remote_close(first);
        controller.pump();
        assert_eq!(controller.connection_status(), Some(ConnectionStatus::Closed));
        assert!(
            controller
                .surface()
                .unwrap()
                .contents()
                .contains("[connection closed]")
        );

        assert!(controller.select_session("a"));
        assert_ne!(controller.binding_id(), Some(first));
        assert_eq!(
            connector.log()[1],
            ConnectionLogEntry::Closed {
                session_id: "a".to_string(),
                binding: first
            }
        );
    }

    #[tokio::test]
    async fn test_resize_is_debounced_after_attach() {
        let (mut controller, _connector) = controller(&["a"]);
        controller.container_ready(Geometry::new(80, 24));
        controller.select_session("a");
        controller.pump();

        controller.container_ready(Geometry::new(90, 24));
        controller.container_ready(Geometry::new(100, 30));
        assert!(controller.next_resize_deadline().is_some());
        assert!(!controller.poll_resize(Instant::now()));

        let later = Instant::now() + Duration::from_secs(1);
        assert!(controller.poll_resize(later));
        assert_eq!(
            controller.surface().unwrap().geometry(),
            Geometry::new(100, 30)
        );
        assert!(!controller.poll_resize(later));
    }

    #[tokio::test]
    async fn test_rename_rejects_blank_name() {
        let (mut controller, _connector) = controller(&["a"]);
        assert!(!controller.rename_session("a", "   "));
        let notices = controller.drain_notices();
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].level, NoticeLevel::Error);
        assert!(controller.drain_notices().is_empty());
    }
}
