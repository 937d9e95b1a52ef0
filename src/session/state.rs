use serde::{Deserialize, Serialize};

/// Transport connection state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connecting,
    Connected,
    Closing,
}

/// Whether frames are accepted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordingState {
    #[default]
    Idle,
    Recording,
    Paused,
}

/// Observable session state, combining connection and recording state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    #[default]
    Idle,
    Connecting,
    Recording,
    Paused,
}

impl SessionState {
    pub fn from_parts(connection: ConnectionState, recording: RecordingState) -> Self {
        match (connection, recording) {
            (_, RecordingState::Idle) => SessionState::Idle,
            (ConnectionState::Disconnected | ConnectionState::Closing, _) => SessionState::Idle,
            (_, RecordingState::Paused) => SessionState::Paused,
            (ConnectionState::Connecting, RecordingState::Recording) => SessionState::Connecting,
            (ConnectionState::Connected, RecordingState::Recording) => SessionState::Recording,
        }
    }
}
