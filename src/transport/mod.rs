//! Duplex message transport used by a session
//!
//! A `Transport` opens connections; each `Connection` accepts outbound text
//! messages and reports everything else (open, inbound message, error, close)
//! through the `EventSink` it was opened with.

pub mod memory;
pub mod websocket;

use anyhow::Result;
use std::fmt;
use std::sync::Arc;

pub use memory::{MemoryConnectionHandle, MemoryTransport};
pub use websocket::WebSocketTransport;

/// Lifecycle and data events reported by a connection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    /// Connection established; sends are now delivered
    Open,
    /// One inbound text message
    Message(String),
    /// Transport-level failure (a `Closed` follows when the connection ends)
    Error(String),
    /// Connection ended, for whatever reason
    Closed,
}

/// Callback target for transport events
#[derive(Clone)]
pub struct EventSink(Arc<dyn Fn(TransportEvent) + Send + Sync>);

impl EventSink {
    pub fn new(f: impl Fn(TransportEvent) + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    pub fn emit(&self, event: TransportEvent) {
        (self.0)(event)
    }
}

impl fmt::Debug for EventSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("EventSink")
    }
}

/// One open (or opening) connection
pub trait Connection: Send {
    /// Queue a text message for delivery
    fn send(&self, text: String) -> Result<()>;

    /// Close the connection; no further sends are delivered
    ///
    /// Like `Transport::open`, this must not emit events on the calling thread.
    fn close(&self);
}

/// Connection factory
///
/// `open` must return without blocking and must not emit events on the
/// calling thread before it returns; the session holds its state lock
/// across the call.
pub trait Transport: Send + Sync {
    fn open(&self, endpoint: &str, events: EventSink) -> Box<dyn Connection>;

    /// Get transport name for logging
    fn name(&self) -> &str;
}
