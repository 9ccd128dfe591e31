//! WebSocket session stream implementation

use std::sync::Arc;

use futures_util::sink::SinkExt;
use reqwest::Url;
use futures_util::stream::StreamExt;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_tungstenite::{connect_async, tungstenite::protocol::Message};
use tracing::{debug, error, info, warn};

use super::types::{
    ConnectionStatus, TransportError, TransportEvent, decode_frame, encode_input,
};
use super::{Connector, FrameSink, Transport};

/// Opens `{ws_url}/ws/{session_id}` streams
#[derive(Debug, Clone)]
pub struct WebSocketConnector {
    ws_url: String,
}

impl WebSocketConnector {
    pub fn new(ws_url: impl Into<String>) -> Self {
        Self {
            ws_url: ws_url.into(),
        }
    }

    /// `{ws_url}/ws/{session_id}` with the id encoded as one path segment
    pub fn session_url(&self, session_id: &str) -> Result<Url, TransportError> {
        let mut url = Url::parse(&self.ws_url)
            .map_err(|e| TransportError::Connect(format!("invalid URL {}: {}", self.ws_url, e)))?;
        url.path_segments_mut()
            .map_err(|_| TransportError::Connect(format!("invalid URL {}", self.ws_url)))?
            .pop_if_empty()
            .push("ws")
            .push(session_id);
        Ok(url)
    }
}

impl Connector for WebSocketConnector {
    fn open(&self, session_id: &str, sink: FrameSink) -> Box<dyn Transport> {
        let transport = match self.session_url(session_id) {
            Ok(url) => WebSocketTransport::open(url.to_string(), session_id, sink),
            Err(e) => WebSocketTransport::failed(e, session_id, sink),
        };
        Box::new(transport)
    }
}

/// WebSocket stream bound to one session
pub struct WebSocketTransport {
    session_id: String,
    status_tx: Arc<watch::Sender<ConnectionStatus>>,
    status_rx: watch::Receiver<ConnectionStatus>,
    outbound_tx: Option<mpsc::UnboundedSender<String>>,
    sink: FrameSink,
    task: Option<JoinHandle<()>>,
}

impl WebSocketTransport {
    /// Start connecting in the background. Frames are delivered through `sink`
    /// in the order they arrive on the wire.
    pub fn open(url: String, session_id: &str, sink: FrameSink) -> Self {
        let (status_tx, status_rx) = watch::channel(ConnectionStatus::Connecting);
        let status_tx = Arc::new(status_tx);
        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();

        info!(
            "Opening session stream {} for {} at {}",
            sink.binding(),
            session_id,
            url
        );

        let task = tokio::spawn(run_connection(
            url,
            outbound_rx,
            status_tx.clone(),
            sink.clone(),
        ));

        Self {
            session_id: session_id.to_string(),
            status_tx,
            status_rx,
            outbound_tx: Some(outbound_tx),
            sink,
            task: Some(task),
        }
    }

    /// A stream that could not be started; reports the error as its close
    fn failed(error: TransportError, session_id: &str, sink: FrameSink) -> Self {
        let error_msg = error.to_string();
        error!("Cannot open session stream for {}: {}", session_id, error_msg);
        let (status_tx, status_rx) = watch::channel(ConnectionStatus::Error(error_msg.clone()));
        sink.deliver(TransportEvent::Closed {
            reason: Some(error_msg),
        });

        Self {
            session_id: session_id.to_string(),
            status_tx: Arc::new(status_tx),
            status_rx,
            outbound_tx: None,
            sink,
            task: None,
        }
    }
}

impl Transport for WebSocketTransport {
    fn send(&mut self, content: &str) -> Result<(), TransportError> {
        if !self.is_open() {
            return Err(TransportError::NotOpen);
        }

        let message = encode_input(content)?;
        match self.outbound_tx.as_ref() {
            Some(tx) => tx.send(message).map_err(|_| TransportError::NotOpen),
            None => Err(TransportError::NotOpen),
        }
    }

    fn close(&mut self) {
        self.sink.cancel();

        // Dropping the sender tells the connection task to send a close frame.
        if self.outbound_tx.take().is_none() {
            return;
        }

        if let Some(task) = self.task.take() {
            let abort = task.abort_handle();
            tokio::spawn(async move {
                let grace = std::time::Duration::from_secs(2);
                if tokio::time::timeout(grace, task).await.is_err() {
                    debug!("Session stream did not close within {:?}, aborting", grace);
                    abort.abort();
                }
            });
        }

        let _ = self.status_tx.send(ConnectionStatus::Closed);
        info!(
            "Closed session stream {} for {}",
            self.sink.binding(),
            self.session_id
        );
    }

    fn status(&self) -> ConnectionStatus {
        self.status_rx.borrow().clone()
    }
}

impl Drop for WebSocketTransport {
    fn drop(&mut self) {
        self.sink.cancel();
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

/// Status updates stop once the owning handle has closed the stream.
fn publish(status_tx: &watch::Sender<ConnectionStatus>, sink: &FrameSink, status: ConnectionStatus) {
    if sink.is_live() {
        let _ = status_tx.send(status);
    }
}

async fn run_connection(
    url: String,
    mut outbound_rx: mpsc::UnboundedReceiver<String>,
    status_tx: Arc<watch::Sender<ConnectionStatus>>,
    sink: FrameSink,
) {
    let ws_stream = match connect_async(&url).await {
        Ok((ws_stream, _)) => ws_stream,
        Err(e) => {
            let error_msg = format!("Failed to connect to {}: {}", url, e);
            error!("{}", error_msg);
            publish(&status_tx, &sink, ConnectionStatus::Error(error_msg.clone()));
            sink.deliver(TransportEvent::Closed {
                reason: Some(error_msg),
            });
            return;
        }
    };

    if !sink.is_live() {
        debug!("Session stream {} closed while connecting", sink.binding());
        return;
    }

    publish(&status_tx, &sink, ConnectionStatus::Connected);
    info!("Connected session stream {}", sink.binding());

    let (mut write, mut read) = ws_stream.split();

    loop {
        tokio::select! {
            outbound = outbound_rx.recv() => {
                match outbound {
                    Some(text) => {
                        if let Err(e) = write.send(Message::Text(text)).await {
                            let error_msg = format!("Failed to send input frame: {}", e);
                            warn!("{}", error_msg);
                            publish(&status_tx, &sink, ConnectionStatus::Error(error_msg.clone()));
                            sink.deliver(TransportEvent::Closed { reason: Some(error_msg) });
                            break;
                        }
                    }
                    None => {
                        // Local close
                        if let Err(e) = write.send(Message::Close(None)).await {
                            debug!("Error sending close frame: {}", e);
                        }
                        publish(&status_tx, &sink, ConnectionStatus::Closed);
                        break;
                    }
                }
            }
            inbound = read.next() => {
                match inbound {
                    Some(Ok(Message::Text(text))) => match decode_frame(&text) {
                        Ok(frame) => {
                            sink.deliver(TransportEvent::Frame(frame));
                        }
                        Err(e) => warn!("Skipping undecodable frame: {}", e),
                    },
                    Some(Ok(Message::Binary(bytes))) => {
                        match decode_frame(&String::from_utf8_lossy(&bytes)) {
                            Ok(frame) => {
                                sink.deliver(TransportEvent::Frame(frame));
                            }
                            Err(e) => warn!("Skipping undecodable binary frame: {}", e),
                        }
                    }
                    Some(Ok(Message::Close(frame))) => {
                        info!("Session stream {} closed by remote", sink.binding());
                        publish(&status_tx, &sink, ConnectionStatus::Closed);
                        sink.deliver(TransportEvent::Closed {
                            reason: frame
                                .map(|f| f.reason.to_string())
                                .filter(|reason| !reason.is_empty()),
                        });
                        break;
                    }
                    Some(Ok(_)) => {
                        // Ping/pong are answered by tungstenite
                    }
                    Some(Err(e)) => {
                        let error_msg = format!("Session stream error: {}", e);
                        error!("{}", error_msg);
                        publish(&status_tx, &sink, ConnectionStatus::Error(error_msg.clone()));
                        sink.deliver(TransportEvent::Closed { reason: Some(error_msg) });
                        break;
                    }
                    None => {
                        info!("Session stream {} ended", sink.binding());
                        publish(&status_tx, &sink, ConnectionStatus::Closed);
                        sink.deliver(TransportEvent::Closed { reason: None });
                        break;
                    }
                }
            }
        }
    }
}
