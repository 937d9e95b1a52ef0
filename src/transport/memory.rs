// In-process transport
//
// Every opened connection is recorded and exposed through a handle that can
// inspect what the session sent and script what the "server" does: open,
// deliver messages, fail, close. Nothing is emitted until the handle says so.

use anyhow::Result;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use super::{Connection, EventSink, Transport, TransportEvent};

/// Scriptable side of one in-memory connection
#[derive(Clone, Debug)]
pub struct MemoryConnectionHandle {
    endpoint: String,
    events: EventSink,
    sent: Arc<Mutex<Vec<String>>>,
    closed: Arc<AtomicBool>,
}

impl MemoryConnectionHandle {
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Report the connection as established
    pub fn open(&self) {
        self.events.emit(TransportEvent::Open);
    }

    /// Deliver an inbound text message
    pub fn deliver(&self, text: impl Into<String>) {
        self.events.emit(TransportEvent::Message(text.into()));
    }

    /// Report a transport error followed by the connection closing
    pub fn fail(&self, reason: impl Into<String>) {
        self.closed.store(true, Ordering::SeqCst);
        self.events.emit(TransportEvent::Error(reason.into()));
        self.events.emit(TransportEvent::Closed);
    }

    /// Close from the server side
    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
        self.events.emit(TransportEvent::Closed);
    }

    /// Messages the session has sent, in order
    pub fn sent(&self) -> Vec<String> {
        self.sent.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Sent messages parsed as JSON (unparsable entries are skipped)
    pub fn sent_json(&self) -> Vec<serde_json::Value> {
        self.sent()
            .iter()
            .filter_map(|text| serde_json::from_str(text).ok())
            .collect()
    }

    /// `type` field of every sent message
    pub fn sent_types(&self) -> Vec<String> {
        self.sent_json()
            .iter()
            .filter_map(|v| v.get("type").and_then(|t| t.as_str()).map(str::to_owned))
            .collect()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

struct MemoryConnection {
    sent: Arc<Mutex<Vec<String>>>,
    closed: Arc<AtomicBool>,
}

impl Connection for MemoryConnection {
    fn send(&self, text: String) -> Result<()> {
        if self.closed.load(Ordering::SeqCst) {
            anyhow::bail!("Memory connection is closed");
        }
        self.sent.lock().unwrap_or_else(|e| e.into_inner()).push(text);
        Ok(())
    }

    fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}

/// Transport that keeps every connection in memory
#[derive(Clone, Default)]
pub struct MemoryTransport {
    connections: Arc<Mutex<Vec<MemoryConnectionHandle>>>,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every connection opened so far, oldest first
    pub fn connections(&self) -> Vec<MemoryConnectionHandle> {
        self.connections
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn connection_count(&self) -> usize {
        self.connections
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .len()
    }

    /// Most recently opened connection
    pub fn last(&self) -> Option<MemoryConnectionHandle> {
        self.connections
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .last()
            .cloned()
    }
}

impl Transport for MemoryTransport {
    fn open(&self, endpoint: &str, events: EventSink) -> Box<dyn Connection> {
        let sent = Arc::new(Mutex::new(Vec::new()));
        let closed = Arc::new(AtomicBool::new(false));

        self.connections
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(MemoryConnectionHandle {
                endpoint: endpoint.to_string(),
                events,
                sent: Arc::clone(&sent),
                closed: Arc::clone(&closed),
            });

        Box::new(MemoryConnection { sent, closed })
    }

    fn name(&self) -> &str {
        "memory"
    }
}
