use serde::{Deserialize, Serialize};

use crate::protocol::TurnMode;
use crate::vad::VadConfig;

/// Configuration for an interpreter session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Interpreter socket endpoint (e.g., "ws://localhost:8080/ws/interpret")
    pub endpoint: String,

    /// Language of party A (opaque identifier, not validated here)
    pub from_language: String,

    /// Language of party B
    pub to_language: String,

    /// Turn-taking mode announced in the `start` message
    pub mode: TurnMode,

    /// Sample rate of frames passed to `push_pcm`
    pub sample_rate: u32,

    /// Run the local VAD and send `vad` boundary hints
    pub client_vad: bool,

    /// Local VAD thresholds
    pub vad: VadConfig,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            endpoint: "ws://localhost:8080/ws/interpret".to_string(),
            from_language: "en".to_string(),
            to_language: "es".to_string(),
            mode: TurnMode::Alternate,
            sample_rate: 16000,
            client_vad: true,
            vad: VadConfig::default(),
        }
    }
}
