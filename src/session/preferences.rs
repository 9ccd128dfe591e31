//! Theme preference shared by every surface of the process

use tracing::{debug, info, warn};

use super::action_channel::RequestTicket;
use crate::remote::{SessionStore, StoreError};
use crate::surface::Theme;

/// Committed theme plus the store writes still to be made.
///
/// Writes go to the store one at a time so the committed value always
/// matches the last write the store acknowledged. A theme requested while a
/// write is in flight waits in a single slot; only the newest request is kept.
#[derive(Debug, Clone)]
pub struct PreferenceStore {
    theme: Theme,
    in_flight: Option<(RequestTicket, Theme)>,
    queued: Option<Theme>,
    next_ticket: u64,
}

impl PreferenceStore {
    pub fn new(theme: Theme) -> Self {
        Self {
            theme,
            in_flight: None,
            queued: None,
            next_ticket: 0,
        }
    }

    /// Read the stored preference, falling back to `default` when the store
    /// has none or cannot be reached
    pub async fn load(store: &dyn SessionStore, default: Theme) -> Self {
        let theme = match store.get_theme().await {
            Ok(Some(theme)) => {
                info!("Loaded theme preference: {}", theme);
                theme
            }
            Ok(None) => {
                debug!("No stored theme, using {}", default);
                default
            }
            Err(e) => {
                warn!("Failed to read theme preference, using {}: {}", default, e);
                default
            }
        };
        Self::new(theme)
    }

    pub fn get(&self) -> Theme {
        self.theme
    }

    /// Theme the user asked for last (queued, in flight or committed)
    pub fn requested(&self) -> Theme {
        self.queued
            .or(self.in_flight.map(|(_, theme)| theme))
            .unwrap_or(self.theme)
    }

    pub fn is_writing(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Request `theme`. Returns the ticket of a write to issue now, or `None`
    /// when it has to wait for the write in flight.
    pub fn begin_set(&mut self, theme: Theme) -> Option<RequestTicket> {
        match self.in_flight {
            Some((_, writing)) => {
                self.queued = (writing != theme).then_some(theme);
                None
            }
            None => {
                self.queued = None;
                Some(self.start_write(theme))
            }
        }
    }

    fn start_write(&mut self, theme: Theme) -> RequestTicket {
        self.next_ticket += 1;
        let ticket = RequestTicket(self.next_ticket);
        self.in_flight = Some((ticket, theme));
        ticket
    }

    /// Commit an acknowledged write. Returns false for a stale ticket.
    pub fn complete(&mut self, ticket: RequestTicket, theme: Theme) -> bool {
        match self.in_flight {
            Some((current, _)) if current == ticket => {
                self.in_flight = None;
                self.theme = theme;
                if self.queued == Some(theme) {
                    self.queued = None;
                }
                true
            }
            _ => false,
        }
    }

    /// Drop a failed write together with anything queued behind it; the
    /// committed theme stays. Returns false for a stale ticket.
    pub fn abandon(&mut self, ticket: RequestTicket) -> bool {
        match self.in_flight {
            Some((current, _)) if current == ticket => {
                self.in_flight = None;
                self.queued = None;
                true
            }
            _ => false,
        }
    }

    /// Start the queued write once nothing is in flight
    pub fn start_queued(&mut self) -> Option<(RequestTicket, Theme)> {
        if self.in_flight.is_some() {
            return None;
        }
        let theme = self.queued.take()?;
        Some((self.start_write(theme), theme))
    }

    /// Persist remotely, then update the value
    pub async fn set(&mut self, store: &dyn SessionStore, theme: Theme) -> Result<(), StoreError> {
        store.set_theme(theme).await?;
        self.theme = theme;
        Ok(())
    }
}

impl Default for PreferenceStore {
    fn default() -> Self {
        Self::new(Theme::default())
    }
}
