use serde::{Deserialize, Serialize};

use crate::vad::VadEvent;

/// How the backend decides which party is speaking
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnMode {
    /// Parties take turns; each utterance flips the direction
    #[default]
    Alternate,
    /// Direction follows the language detected in each utterance
    #[serde(rename = "auto")]
    AutoByLanguageId,
}

/// Translation direction reported with a status update
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    #[serde(rename = "AtoB")]
    AtoB,
    #[serde(rename = "BtoA")]
    BtoA,
}

/// Message sent from the client to the interpreter backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ClientMessage {
    Start {
        #[serde(rename = "sessionId")]
        session_id: String,
        from: String,
        to: String,
        mode: TurnMode,
        #[serde(rename = "sampleRate")]
        sample_rate: u32,
        #[serde(rename = "clientVad")]
        client_vad: bool,
    },
    Audio {
        /// Base64-encoded 16-bit little-endian PCM
        pcm16: String,
        /// Sample count of the original frame
        samples: usize,
    },
    Vad {
        event: VadEvent,
    },
    Pause,
    Resume,
    Stop,
}

impl ClientMessage {
    /// Wire `type` tag, for logging
    pub fn kind(&self) -> &'static str {
        match self {
            ClientMessage::Start { .. } => "start",
            ClientMessage::Audio { .. } => "audio",
            ClientMessage::Vad { .. } => "vad",
            ClientMessage::Pause => "pause",
            ClientMessage::Resume => "resume",
            ClientMessage::Stop => "stop",
        }
    }
}

/// Message received from the interpreter backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ServerMessage {
    Status {
        status: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        dir: Option<Direction>,
    },
    Partial {
        text: String,
    },
    Final {
        asr: String,
        mt: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        lid: Option<String>,
    },
    Error {
        message: String,
    },
    /// Any `type` this client does not understand
    #[serde(other)]
    Unknown,
}
