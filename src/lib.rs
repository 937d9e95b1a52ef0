pub mod audio;
pub mod config;
pub mod protocol;
pub mod session;
pub mod transport;
pub mod vad;

pub use audio::{AudioFile, AudioFrame, AudioSource, AudioSourceConfig, FileSource};
pub use config::Config;
pub use protocol::{ClientMessage, Direction, FinalTranscript, InboundEvent, ServerMessage, StatusUpdate, TurnMode};
pub use session::{
    Callbacks, ConnectionState, RecordingState, SessionConfig, SessionState, SessionStats, TranscriptEntry,
    TurnSession,
};
pub use transport::{MemoryTransport, Transport, TransportEvent, WebSocketTransport};
pub use vad::{VadConfig, VadEvent, VoiceActivityDetector};
