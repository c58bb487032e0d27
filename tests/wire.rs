use serde_json::{Value, json};
use session_signal::{Coded, EventClass, EventType, GlobalEvent, NO_SESSION, NO_SUBJECT};

#[test]
fn test_every_kind_survives_the_wire() {
    for &event_class in EventClass::ALL {
        for &event in EventType::ALL {
            let evt = GlobalEvent::new(event_class, event)
                .with_subject("auth0|5")
                .with_session("CLASSA-1")
                .with_target(json!({ "page": 3 }));
            let frame = evt.encode().unwrap();

            let raw: Value = serde_json::from_str(&frame).unwrap();
            assert_eq!(raw["eventClass"], event_class.code());
            assert_eq!(raw["event"], event.code());
            assert_eq!(GlobalEvent::decode(&frame).unwrap(), evt);
        }
    }
}

#[test]
fn test_relay_frames_decode() {
    let frame = r#"{"eventClass":"C","event":"MMA","subject":"*","sessionId":"CLASSA-1","target":""}"#;
    let evt = GlobalEvent::decode(frame).unwrap();
    assert!(evt.is_command());
    assert_eq!(evt.event, EventType::MuteMicAll);
    assert!(evt.is_for("anyone"));
    assert!(evt.in_session("CLASSA-1"));
    assert_eq!(evt.target_str(), Some(""));

    let evt = GlobalEvent::decode(r#"{"event":"HW","target":{"reason":"audio"}}"#).unwrap();
    assert_eq!(evt.event_class, EventClass::None);
    assert_eq!(evt.subject, NO_SUBJECT);
    assert_eq!(evt.session_id, NO_SESSION);
    assert_eq!(evt.target, Some(json!({ "reason": "audio" })));
}

#[test]
fn test_garbage_is_an_error() {
    assert!(GlobalEvent::decode("").is_err());
    assert!(GlobalEvent::decode("[1,2,3]").is_err());
    assert!(GlobalEvent::decode(r#"{"event":7}"#).is_err());
}
