//! In-process session stream used by tests and offline runs
//! Records every open/close and every input frame instead of touching the network

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use super::types::{
    BindingId, ConnectionStatus, InboundFrame, OutboundFrame, TransportError, TransportEvent,
};
use super::{Connector, FrameSink, Transport};

/// Lifecycle entries recorded by [`MockConnector`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionLogEntry {
    Opened { session_id: String, binding: BindingId },
    Closed { session_id: String, binding: BindingId },
}

#[derive(Debug)]
struct MockLink {
    session_id: String,
    sink: FrameSink,
    open: bool,
    sent: Vec<OutboundFrame>,
}

#[derive(Debug, Default)]
struct MockState {
    log: Vec<ConnectionLogEntry>,
    links: HashMap<BindingId, MockLink>,
    start_disconnected: bool,
}

/// Connector whose transports are driven by the test
#[derive(Debug, Clone, Default)]
pub struct MockConnector {
    state: Arc<Mutex<MockState>>,
}

impl MockConnector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Transports opened from now on report `Connecting` and refuse input
    pub fn start_disconnected(&self, value: bool) {
        self.lock().start_disconnected = value;
    }

    pub fn log(&self) -> Vec<ConnectionLogEntry> {
        self.lock().log.clone()
    }

    /// Number of transports currently open
    pub fn open_count(&self) -> usize {
        self.lock().links.values().filter(|link| link.open).count()
    }

    /// Input frames sent on one binding
    pub fn sent(&self, binding: BindingId) -> Vec<OutboundFrame> {
        self.lock()
            .links
            .get(&binding)
            .map(|link| link.sent.clone())
            .unwrap_or_default()
    }

    /// Input frames sent to a session across all of its bindings
    pub fn sent_to(&self, session_id: &str) -> Vec<OutboundFrame> {
        let state = self.lock();
        let mut bindings: Vec<_> = state
            .links
            .iter()
            .filter(|(_, link)| link.session_id == session_id)
            .collect();
        bindings.sort_by_key(|(binding, _)| **binding);
        bindings
            .into_iter()
            .flat_map(|(_, link)| link.sent.iter().cloned())
            .collect()
    }

    /// Binding of the most recent transport opened for a session
    pub fn latest_binding(&self, session_id: &str) -> Option<BindingId> {
        self.lock()
            .links
            .iter()
            .filter(|(_, link)| link.session_id == session_id)
            .map(|(binding, _)| *binding)
            .max()
    }

    /// Deliver an inbound frame as the remote side would; returns false when
    /// the transport is closed
    pub fn push_frame(&self, binding: BindingId, frame: InboundFrame) -> bool {
        let state = self.lock();
        match state.links.get(&binding) {
            Some(link) if link.open => link.sink.deliver(TransportEvent::Frame(frame)),
            _ => false,
        }
    }

    /// Close the stream from the remote side
    pub fn remote_close(&self, binding: BindingId) -> bool {
        let mut state = self.lock();
        match state.links.get_mut(&binding) {
            Some(link) if link.open => {
                link.open = false;
                link.sink.deliver(TransportEvent::Closed { reason: None })
            }
            _ => false,
        }
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        // A panic inside a test holding the lock must not hide the original failure
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Connector for MockConnector {
    fn open(&self, session_id: &str, sink: FrameSink) -> Box<dyn Transport> {
        let binding = sink.binding();
        let mut state = self.lock();
        let connected = !state.start_disconnected;
        state.log.push(ConnectionLogEntry::Opened {
            session_id: session_id.to_string(),
            binding,
        });
        state.links.insert(
            binding,
            MockLink {
                session_id: session_id.to_string(),
                sink,
                open: true,
                sent: Vec::new(),
            },
        );

        Box::new(MockTransport {
            binding,
            connected,
            closed: false,
            state: self.state.clone(),
        })
    }
}

/// Transport handle returned by [`MockConnector`]
#[derive(Debug)]
pub struct MockTransport {
    binding: BindingId,
    connected: bool,
    closed: bool,
    state: Arc<Mutex<MockState>>,
}

impl MockTransport {
    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Transport for MockTransport {
    fn send(&mut self, content: &str) -> Result<(), TransportError> {
        if self.closed || !self.connected {
            return Err(TransportError::NotOpen);
        }
        let mut state = self.lock();
        match state.links.get_mut(&self.binding) {
            Some(link) if link.open => {
                link.sent.push(OutboundFrame::Input {
                    content: content.to_string(),
                });
                Ok(())
            }
            _ => Err(TransportError::NotOpen),
        }
    }

    fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;

        let binding = self.binding;
        let mut state = self.lock();
        let session_id = match state.links.get_mut(&binding) {
            Some(link) => {
                link.open = false;
                link.sink.cancel();
                link.session_id.clone()
            }
            None => return,
        };
        state.log.push(ConnectionLogEntry::Closed {
            session_id,
            binding,
        });
    }

    fn status(&self) -> ConnectionStatus {
        if self.closed {
            return ConnectionStatus::Closed;
        }
        let remote_open = self
            .lock()
            .links
            .get(&self.binding)
            .map(|link| link.open)
            .unwrap_or(false);
        match (self.connected, remote_open) {
            (_, false) => ConnectionStatus::Closed,
            (false, true) => ConnectionStatus::Connecting,
            (true, true) => ConnectionStatus::Connected,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    #[test]
    fn test_mock_records_lifecycle() {
        let connector = MockConnector::new();
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut transport = connector.open("s1", FrameSink::new(BindingId::new(1), tx));

        transport.send("hello").unwrap();
        transport.close();
        transport.close();

        assert_eq!(
            connector.log(),
            vec![
                ConnectionLogEntry::Opened {
                    session_id: "s1".to_string(),
                    binding: BindingId::new(1)
                },
                ConnectionLogEntry::Closed {
                    session_id: "s1".to_string(),
                    binding: BindingId::new(1)
                },
            ]
        );
        assert_eq!(connector.sent(BindingId::new(1)).len(), 1);
        assert!(matches!(transport.send("late"), Err(TransportError::NotOpen)));
    }

    #[test]
    fn test_push_frame_after_close_is_dropped() {
        let connector = MockConnector::new();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut transport = connector.open("s1", FrameSink::new(BindingId::new(4), tx));
        transport.close();

        let delivered = connector.push_frame(
            BindingId::new(4),
            InboundFrame::Output {
                content: "x".to_string(),
            },
        );
        assert!(!delivered);
        assert!(rx.try_recv().is_err());
    }
}
