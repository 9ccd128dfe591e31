//! Session stream transport module
//!
//! One transport carries the byte stream of exactly one session: input frames
//! out, output/error frames in, and a single close notification at the end.

pub mod mock;
pub mod types;
pub mod websocket;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::mpsc;

use crate::session::action_channel::ControllerEvent;

pub use mock::MockConnector;
pub use types::*;
pub use websocket::{WebSocketConnector, WebSocketTransport};

/// An open (or opening) stream to one session
pub trait Transport: Send {
    /// Send one input frame. Fails with [`TransportError::NotOpen`] when the
    /// stream is not connected.
    fn send(&mut self, content: &str) -> Result<(), TransportError>;

    /// Close the stream. Idempotent; no events are delivered afterwards.
    fn close(&mut self);

    fn status(&self) -> ConnectionStatus;

    fn is_open(&self) -> bool {
        matches!(self.status(), ConnectionStatus::Connected)
    }
}

/// Opens transports for session ids
pub trait Connector: Send + Sync {
    fn open(&self, session_id: &str, sink: FrameSink) -> Box<dyn Transport>;
}

/// Delivery handle handed to a transport.
///
/// Tags every event with the binding it belongs to and stops delivering once
/// cancelled, so a transport that is closed mid-read cannot leak a late event.
#[derive(Debug, Clone)]
pub struct FrameSink {
    binding: BindingId,
    tx: mpsc::UnboundedSender<ControllerEvent>,
    live: Arc<AtomicBool>,
}

impl FrameSink {
    pub fn new(binding: BindingId, tx: mpsc::UnboundedSender<ControllerEvent>) -> Self {
        Self {
            binding,
            tx,
            live: Arc::new(AtomicBool::new(true)),
        }
    }

    pub fn binding(&self) -> BindingId {
        self.binding
    }

    /// Deliver an event; returns false when the sink is cancelled or the
    /// controller is gone.
    pub fn deliver(&self, event: TransportEvent) -> bool {
        if !self.is_live() {
            return false;
        }
        self.tx
            .send(ControllerEvent::Transport {
                binding: self.binding,
                event,
            })
            .is_ok()
    }

    pub fn cancel(&self) {
        self.live.store(false, Ordering::SeqCst);
    }

    pub fn is_live(&self) -> bool {
        self.live.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sink_tags_events_with_binding() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let sink = FrameSink::new(BindingId::new(7), tx);

        assert!(sink.deliver(TransportEvent::Closed { reason: None }));

        match rx.try_recv().unwrap() {
            ControllerEvent::Transport { binding, event } => {
                assert_eq!(binding, BindingId::new(7));
                assert_eq!(event, TransportEvent::Closed { reason: None });
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn test_cancelled_sink_drops_events() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let sink = FrameSink::new(BindingId::new(1), tx);
        let clone = sink.clone();

        sink.cancel();

        assert!(!clone.deliver(TransportEvent::Frame(InboundFrame::Output {
            content: "late".to_string(),
        })));
        assert!(rx.try_recv().is_err());
    }
}
