use anyhow::{Context, Result};
use futures::{SinkExt, StreamExt};
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tracing::{debug, info, warn};

use super::{Connection, EventSink, Transport, TransportEvent};

/// Outbound command for the connection task
#[derive(Debug)]
enum Outbound {
    Text(String),
    Close,
}

/// WebSocket transport; one spawned task per connection
pub struct WebSocketTransport {
    runtime: Handle,
}

impl WebSocketTransport {
    /// Create a transport bound to the current tokio runtime
    pub fn new() -> Result<Self> {
        let runtime = Handle::try_current().context("WebSocket transport requires a tokio runtime")?;
        Ok(Self { runtime })
    }
}

impl Transport for WebSocketTransport {
    fn open(&self, endpoint: &str, events: EventSink) -> Box<dyn Connection> {
        let (tx, rx) = mpsc::unbounded_channel();
        let endpoint = endpoint.to_string();

        self.runtime.spawn(async move {
            run_connection(endpoint, rx, events).await;
        });

        Box::new(WebSocketConnection { tx })
    }

    fn name(&self) -> &str {
        "websocket"
    }
}

struct WebSocketConnection {
    tx: mpsc::UnboundedSender<Outbound>,
}

impl Connection for WebSocketConnection {
    fn send(&self, text: String) -> Result<()> {
        self.tx
            .send(Outbound::Text(text))
            .map_err(|_| anyhow::anyhow!("WebSocket connection task has ended"))
    }

    fn close(&self) {
        let _ = self.tx.send(Outbound::Close);
    }
}

/// Connect, then pump outbound commands and inbound frames until either side closes
async fn run_connection(
    endpoint: String,
    mut outbound_rx: mpsc::UnboundedReceiver<Outbound>,
    events: EventSink,
) {
    info!("Connecting to interpreter at {}", endpoint);

    let ws_stream = match tokio_tungstenite::connect_async(endpoint.as_str()).await {
        Ok((ws_stream, _response)) => ws_stream,
        Err(e) => {
            warn!("Failed to connect to {}: {}", endpoint, e);
            events.emit(TransportEvent::Error(e.to_string()));
            events.emit(TransportEvent::Closed);
            return;
        }
    };

    info!("Connected to interpreter");
    events.emit(TransportEvent::Open);

    let (mut ws_sender, mut ws_receiver) = ws_stream.split();

    loop {
        tokio::select! {
            outbound = outbound_rx.recv() => match outbound {
                Some(Outbound::Text(text)) => {
                    if let Err(e) = ws_sender.send(WsMessage::Text(text.into())).await {
                        warn!("WebSocket send failed: {}", e);
                        events.emit(TransportEvent::Error(e.to_string()));
                        break;
                    }
                }
                Some(Outbound::Close) | None => {
                    debug!("Closing WebSocket");
                    let _ = ws_sender.send(WsMessage::Close(None)).await;
                    break;
                }
            },
            inbound = ws_receiver.next() => match inbound {
                Some(Ok(WsMessage::Text(text))) => {
                    events.emit(TransportEvent::Message(text.as_str().to_owned()));
                }
                Some(Ok(WsMessage::Binary(data))) => match String::from_utf8(data.to_vec()) {
                    Ok(text) => events.emit(TransportEvent::Message(text)),
                    Err(_) => debug!("Ignoring non-UTF-8 binary frame ({} bytes)", data.len()),
                },
                Some(Ok(WsMessage::Close(frame))) => {
                    debug!("Server closed WebSocket: {:?}", frame);
                    break;
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    warn!("WebSocket receive failed: {}", e);
                    events.emit(TransportEvent::Error(e.to_string()));
                    break;
                }
                None => break,
            },
        }
    }

    info!("WebSocket connection ended");
    events.emit(TransportEvent::Closed);
}
