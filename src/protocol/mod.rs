//! Interpreter wire protocol
//!
//! JSON objects discriminated by a `type` field, exchanged over one
//! persistent duplex channel:
//! - client → server: `start`, `audio`, `vad`, `pause`, `resume`, `stop`
//! - server → client: `status`, `partial`, `final`, `error`

pub mod events;
pub mod messages;

pub use events::{FinalTranscript, InboundEvent, StatusUpdate};
pub use messages::{ClientMessage, Direction, ServerMessage, TurnMode};
