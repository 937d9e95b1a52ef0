use serde::Serialize;
use tracing::debug;

use super::messages::{Direction, ServerMessage};

/// Session or turn state reported by the backend (or synthesized locally)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusUpdate {
    pub value: String,
    pub direction: Option<Direction>,
}

impl StatusUpdate {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            direction: None,
        }
    }
}

/// Finalized transcript with its translation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FinalTranscript {
    pub asr: String,
    pub translated_text: String,
    pub language_id: Option<String>,
}

/// Typed inbound event dispatched to session callbacks
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundEvent {
    Status(StatusUpdate),
    Partial { text: String },
    Final(FinalTranscript),
    Error { message: String },
}

impl InboundEvent {
    /// Parse one transport message
    ///
    /// Invalid JSON, an unknown `type` or a missing required field all yield
    /// `None`; the message is dropped without reaching any callback.
    pub fn parse(text: &str) -> Option<Self> {
        match serde_json::from_str::<ServerMessage>(text) {
            Ok(message) => Self::from_message(message),
            Err(e) => {
                debug!("Dropping malformed inbound message: {}", e);
                None
            }
        }
    }

    pub fn from_message(message: ServerMessage) -> Option<Self> {
        match message {
            ServerMessage::Status { status, dir } => Some(InboundEvent::Status(StatusUpdate {
                value: status,
                direction: dir,
            })),
            ServerMessage::Partial { text } => Some(InboundEvent::Partial { text }),
            ServerMessage::Final { asr, mt, lid } => Some(InboundEvent::Final(FinalTranscript {
                asr,
                translated_text: mt,
                language_id: lid,
            })),
            ServerMessage::Error { message } => Some(InboundEvent::Error { message }),
            ServerMessage::Unknown => {
                debug!("Dropping inbound message with unrecognized type");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_final_maps_fields() {
        let event = InboundEvent::parse(r#"{"type":"final","asr":"hola","mt":"hello","lid":"es"}"#);
        assert_eq!(
            event,
            Some(InboundEvent::Final(FinalTranscript {
                asr: "hola".to_string(),
                translated_text: "hello".to_string(),
                language_id: Some("es".to_string()),
            }))
        );
    }

    #[test]
    fn test_parse_drops_garbage() {
        assert_eq!(InboundEvent::parse("not json"), None);
        assert_eq!(InboundEvent::parse(r#"{"type":"mystery","x":1}"#), None);
        assert_eq!(InboundEvent::parse(r#"{"type":"partial"}"#), None);
        assert_eq!(InboundEvent::parse(r#"{"text":"no type"}"#), None);
    }
}
