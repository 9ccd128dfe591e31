//! Action Channel for asynchronous controller events
//!
//! Everything that completes outside the controller (REST answers, stream
//! frames, deferred attach ticks) comes back through this channel and is
//! applied by the single loop that owns the controller.

use anyhow::Result;
use tokio::sync::mpsc;

use crate::remote::{SessionRecord, StoreError};
use crate::surface::Theme;
use crate::transport::{BindingId, TransportEvent};

/// Identifies one outstanding metadata request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestTicket(pub u64);

/// Completions and notifications for the session controller
#[derive(Debug)]
pub enum ControllerEvent {
    /// Frame or close from the transport of a binding
    Transport {
        binding: BindingId,
        event: TransportEvent,
    },
    /// Deferred surface attach for a freshly selected binding
    AttachSurface { binding: BindingId, attempt: u8 },
    SessionsListed {
        ticket: RequestTicket,
        result: Result<Vec<SessionRecord>, StoreError>,
    },
    /// `selection` is the selection counter at the time of the request
    SessionCreated {
        selection: u64,
        result: Result<SessionRecord, StoreError>,
    },
    SessionRenamed {
        id: String,
        result: Result<SessionRecord, StoreError>,
    },
    SessionDeleted {
        id: String,
        result: Result<(), StoreError>,
    },
    ThemePersisted {
        ticket: RequestTicket,
        theme: Theme,
        result: Result<(), StoreError>,
    },
}

/// Action channel for controller event processing
pub struct ActionChannel {
    event_tx: mpsc::UnboundedSender<ControllerEvent>,
    event_rx: Option<mpsc::UnboundedReceiver<ControllerEvent>>,
}

impl Clone for ActionChannel {
    fn clone(&self) -> Self {
        Self {
            event_tx: self.event_tx.clone(),
            event_rx: None, // Receivers cannot be cloned
        }
    }
}

impl ActionChannel {
    pub fn new() -> Self {
        let (event_tx, event_rx) = mpsc::unbounded_channel();

        Self {
            event_tx,
            event_rx: Some(event_rx),
        }
    }

    pub fn send_event(&self, event: ControllerEvent) -> Result<()> {
        self.event_tx
            .send(event)
            .map_err(|e| anyhow::anyhow!("Failed to send event: {}", e))
    }

    /// Wait for the next event
    pub async fn next_event(&mut self) -> Option<ControllerEvent> {
        if let Some(event_rx) = &mut self.event_rx {
            event_rx.recv().await
        } else {
            None
        }
    }

    /// Next event if one is already queued
    pub fn try_next_event(&mut self) -> Option<ControllerEvent> {
        self.event_rx.as_mut().and_then(|rx| rx.try_recv().ok())
    }

    pub fn event_tx(&self) -> mpsc::UnboundedSender<ControllerEvent> {
        self.event_tx.clone()
    }

    pub fn is_closed(&self) -> bool {
        self.event_tx.is_closed()
    }
}

impl Default for ActionChannel {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_events_arrive_in_order() {
        let mut channel = ActionChannel::new();
        let sender = channel.clone();

        for attempt in 0..3 {
            sender
                .send_event(ControllerEvent::AttachSurface {
                    binding: BindingId::new(1),
                    attempt,
                })
                .unwrap();
        }

        for expected in 0..3 {
            match channel.next_event().await {
                Some(ControllerEvent::AttachSurface { attempt, .. }) => {
                    assert_eq!(attempt, expected)
                }
                other => panic!("unexpected event: {:?}", other),
            }
        }
        assert!(channel.try_next_event().is_none());
    }

    #[test]
    fn test_clone_has_no_receiver() {
        let channel = ActionChannel::new();
        let mut clone = channel.clone();
        assert!(clone.try_next_event().is_none());
        assert!(!clone.is_closed());
    }
}
