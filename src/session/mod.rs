//! Turn interpreter session
//!
//! This module provides the `TurnSession` abstraction that manages:
//! - The transport connection to the interpreter backend
//! - Session control messages (start/pause/resume/stop)
//! - Local VAD boundary hints and PCM audio framing
//! - Queueing outbound messages until the transport is open
//! - Dispatching inbound events to registered callbacks

mod callbacks;
mod config;
mod queue;
mod session;
mod state;
mod stats;

pub use callbacks::Callbacks;
pub use config::SessionConfig;
pub use queue::OutboundQueue;
pub use session::{TurnSession, CONNECTION_ERROR, STATUS_LISTENING, STATUS_PAUSED};
pub use state::{ConnectionState, RecordingState, SessionState};
pub use stats::{SessionStats, TranscriptEntry};
