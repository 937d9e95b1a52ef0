use serde_json::{json, Value};
use turn_interpreter::protocol::{
    ClientMessage, Direction, FinalTranscript, InboundEvent, ServerMessage, StatusUpdate, TurnMode,
};
use turn_interpreter::vad::VadEvent;

fn to_value(msg: &ClientMessage) -> Value {
    serde_json::to_value(msg).unwrap()
}

#[test]
fn test_start_serialization() {
    let msg = ClientMessage::Start {
        session_id: "session-1".to_string(),
        from: "en".to_string(),
        to: "ja".to_string(),
        mode: TurnMode::Alternate,
        sample_rate: 16000,
        client_vad: true,
    };

    assert_eq!(
        to_value(&msg),
        json!({
            "type": "start",
            "sessionId": "session-1",
            "from": "en",
            "to": "ja",
            "mode": "alternate",
            "sampleRate": 16000,
            "clientVad": true
        })
    );
}

#[test]
fn test_start_auto_mode() {
    let msg = ClientMessage::Start {
        session_id: "s".to_string(),
        from: "en".to_string(),
        to: "fr".to_string(),
        mode: TurnMode::AutoByLanguageId,
        sample_rate: 16000,
        client_vad: false,
    };

    let value = to_value(&msg);
    assert_eq!(value["mode"], "auto");
    assert_eq!(value["clientVad"], false);
}

#[test]
fn test_audio_serialization() {
    let msg = ClientMessage::Audio {
        pcm16: "AAA=".to_string(),
        samples: 1600,
    };

    assert_eq!(
        to_value(&msg),
        json!({ "type": "audio", "pcm16": "AAA=", "samples": 1600 })
    );
}

#[test]
fn test_vad_serialization() {
    assert_eq!(
        to_value(&ClientMessage::Vad { event: VadEvent::Begin }),
        json!({ "type": "vad", "event": "begin" })
    );
    assert_eq!(
        to_value(&ClientMessage::Vad { event: VadEvent::End }),
        json!({ "type": "vad", "event": "end" })
    );
}

#[test]
fn test_control_messages_have_only_type() {
    assert_eq!(to_value(&ClientMessage::Pause), json!({ "type": "pause" }));
    assert_eq!(to_value(&ClientMessage::Resume), json!({ "type": "resume" }));
    assert_eq!(to_value(&ClientMessage::Stop), json!({ "type": "stop" }));
}

#[test]
fn test_status_with_direction() {
    let json = r#"{ "type": "status", "status": "translating", "dir": "BtoA" }"#;

    assert_eq!(
        InboundEvent::parse(json),
        Some(InboundEvent::Status(StatusUpdate {
            value: "translating".to_string(),
            direction: Some(Direction::BtoA),
        }))
    );
}

#[test]
fn test_status_without_direction() {
    let json = r#"{ "type": "status", "status": "listening" }"#;

    assert_eq!(
        InboundEvent::parse(json),
        Some(InboundEvent::Status(StatusUpdate::new("listening")))
    );
}

#[test]
fn test_partial() {
    let json = r#"{ "type": "partial", "text": "good mor" }"#;

    assert_eq!(
        InboundEvent::parse(json),
        Some(InboundEvent::Partial {
            text: "good mor".to_string()
        })
    );
}

#[test]
fn test_final_without_language() {
    let json = r#"{ "type": "final", "asr": "good morning", "mt": "buenos días" }"#;

    assert_eq!(
        InboundEvent::parse(json),
        Some(InboundEvent::Final(FinalTranscript {
            asr: "good morning".to_string(),
            translated_text: "buenos días".to_string(),
            language_id: None,
        }))
    );
}

#[test]
fn test_error_is_verbatim() {
    let json = r#"{ "type": "error", "message": "quota exceeded: 42" }"#;

    assert_eq!(
        InboundEvent::parse(json),
        Some(InboundEvent::Error {
            message: "quota exceeded: 42".to_string()
        })
    );
}

#[test]
fn test_extra_fields_are_ignored() {
    let json = r#"{ "type": "partial", "text": "hi", "seq": 7, "confidence": 0.9 }"#;
    assert!(matches!(InboundEvent::parse(json), Some(InboundEvent::Partial { .. })));
}

#[test]
fn test_unknown_type_is_unknown_variant() {
    let msg: ServerMessage = serde_json::from_str(r#"{ "type": "heartbeat", "t": 1 }"#).unwrap();
    assert_eq!(msg, ServerMessage::Unknown);
    assert_eq!(InboundEvent::from_message(msg), None);
}

#[test]
fn test_malformed_messages_are_dropped() {
    let cases = [
        "",
        "{",
        "[]",
        "42",
        r#"{ "status": "listening" }"#,
        r#"{ "type": "final", "asr": "missing mt" }"#,
        r#"{ "type": "error" }"#,
        r#"{ "type": "status", "status": "x", "dir": "sideways" }"#,
    ];

    for case in cases {
        assert_eq!(InboundEvent::parse(case), None, "should drop {:?}", case);
    }
}
