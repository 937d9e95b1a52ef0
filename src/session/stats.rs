use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::state::SessionState;

/// Statistics about an interpreter session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionStats {
    /// Current observable state
    pub state: SessionState,

    /// Current session identifier, if one was started
    pub session_id: Option<String>,

    /// When the session started
    pub started_at: Option<DateTime<Utc>>,

    /// When the session stopped or its connection closed
    pub ended_at: Option<DateTime<Utc>>,

    /// Seconds from start to end, or to now while active (0 when never started)
    pub duration_secs: f64,

    /// Audio messages handed to the transport or queue
    pub audio_frames_sent: usize,

    /// Samples carried by those audio messages
    pub samples_sent: usize,

    /// PCM bytes carried by those audio messages (before base64)
    pub pcm_bytes_sent: usize,

    /// Messages waiting for the transport to open
    pub queued_messages: usize,

    /// `vad` begin hints sent
    pub utterances_started: usize,

    /// `vad` end hints sent
    pub utterances_ended: usize,

    /// Partial transcripts received
    pub partials_received: usize,

    /// Final transcripts received
    pub finals_received: usize,

    /// Errors reported (server and transport)
    pub errors_received: usize,
}

/// A finalized utterance with its translation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptEntry {
    /// Recognized source text
    pub asr: String,

    /// Translated text
    pub translated_text: String,

    /// Language detected by the backend, if reported
    pub language_id: Option<String>,

    /// When this entry was received
    pub received_at: DateTime<Utc>,
}

/// Running counters kept by the session
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct Counters {
    pub audio_frames_sent: usize,
    pub samples_sent: usize,
    pub pcm_bytes_sent: usize,
    pub utterances_started: usize,
    pub utterances_ended: usize,
    pub partials_received: usize,
    pub finals_received: usize,
    pub errors_received: usize,
}
