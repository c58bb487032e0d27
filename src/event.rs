use std::{borrow::Cow, fmt};

use serde::{Deserialize, Deserializer, Serialize, de::DeserializeOwned};
use serde_json::Value;

use crate::{Coded, Error, Label, Result};

/// Nobody: the event is not about a particular user.
pub const NO_SUBJECT: &str = "-";
/// The event is not scoped to a session.
pub const NO_SESSION: &str = NO_SUBJECT;
/// Explicit "no payload" target. Distinct from a missing target.
pub const NO_TARGET: &str = "";
pub const NO_STREAM: &str = NO_SUBJECT;
/// Everybody in the session.
pub const ANY_SUBJECT: &str = "*";
/// All sessions.
pub const ANY_SESSION: &str = ANY_SUBJECT;
pub const ANY_TARGET: &str = ANY_SUBJECT;
/// The relay server itself. Events with this subject are never echoed locally.
pub const SERVER: &str = "$";

/// Whether an event reports something that happened or asks for something to happen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Label, Coded)]
pub enum EventClass {
    #[code = "N"]
    Notify,
    #[code = "C"]
    Command,
    #[default]
    #[code = "X"]
    None,
    #[code = "?"]
    #[unknown]
    Unknown,
}

/// Every kind of occurrence exchanged over the bus.
///
/// The wire code of each kind is given by its `#[code]` attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Label, Coded)]
pub enum EventType {
    #[code = "AM"]
    AudioMuted,
    #[code = "AU"]
    AudioUnmuted,
    #[code = "CameraOff"]
    CameraOff,
    #[code = "CameraOn"]
    CameraOn,
    #[code = "CV"]
    ChangeView,
    #[code = "CVA"]
    ChangeViewAll,
    #[code = "CH"]
    ClearHelp,
    #[code = "DBG"]
    Debug,
    #[code = "HW"]
    HelpWanted,
    #[code = "HB"]
    Heartbeat,
    #[code = "HR"]
    HeartbeatReply,
    #[code = "LIT"]
    LeaveInstructor,
    #[code = "LS"]
    LeaveSession,
    #[code = "LI"]
    LoggedIn,
    #[code = "LO"]
    LoggedOut,
    #[code = "LOA"]
    LogoutAll,
    #[code = "MS"]
    MediaStatus,
    #[code = "MSA"]
    MediaStatusAll,
    #[code = "MicOff"]
    MicOff,
    #[code = "MicOn"]
    MicOn,
    #[code = "MC"]
    Music,
    #[code = "PV"]
    MusicVolume,
    #[code = "MA"]
    MuteAudio,
    #[code = "MMA"]
    MuteMicAll,
    #[code = "MVA"]
    MuteVideoAll,
    #[code = "N"]
    Navigate,
    #[code = "NL"]
    NavigateAll,
    #[code = "NN"]
    Navigated,
    #[default]
    #[code = "X"]
    None,
    #[code = "QOS"]
    QosAlert,
    #[code = "RE"]
    Record,
    #[code = "AS"]
    SessionActive,
    #[code = "IS"]
    SessionInactive,
    #[code = "SJ"]
    SessionJoined,
    #[code = "SL"]
    SessionLeft,
    #[code = "SH"]
    SetHelpMessage,
    #[code = "SS"]
    ShowStats,
    #[code = "SO"]
    StartOver,
    #[code = "?"]
    #[unknown]
    Unknown,
    #[code = "UA"]
    UnmuteAudio,
    #[code = "UMA"]
    UnmuteMicAll,
    #[code = "UVA"]
    UnmuteVideoAll,
    #[code = "VOM"]
    VideoOptimizationMode,
    #[code = "VC"]
    ViewChanged,
}

impl EventType {
    /// `Logout` shares the `LO` code with [`EventType::LoggedOut`].
    #[allow(non_upper_case_globals)]
    pub const Logout: EventType = EventType::LoggedOut;
}

impl fmt::Display for EventClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

/// A single control-plane message.
///
/// - `event_class`/`event`: what happened (or is requested), travelling as symbolic codes.
/// - `subject`: who the event is about. See [`NO_SUBJECT`], [`ANY_SUBJECT`], [`SERVER`].
/// - `session_id`: the class session it is scoped to. See [`NO_SESSION`], [`ANY_SESSION`].
/// - `target`: kind-specific payload. `None` means the producer never set one and the
///   bus refuses to deliver the event; `Some("")` ([`NO_TARGET`]) is an explicit empty payload.
///
/// Events are values: build a fresh one per occurrence.
///
/// ```rust
/// use session_signal::{EventClass, EventType, GlobalEvent, ANY_SUBJECT};
///
/// let evt = GlobalEvent::new(EventClass::Command, EventType::MuteMicAll)
///     .with_subject(ANY_SUBJECT)
///     .with_session("CLASSA-1");
/// assert_eq!(evt.to_friendly().event, "MuteMicAll");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalEvent {
    #[serde(default, with = "crate::code::wire")]
    pub event_class: EventClass,
    #[serde(default, with = "crate::code::wire")]
    pub event: EventType,
    #[serde(default = "no_subject")]
    pub subject: String,
    #[serde(default = "no_session")]
    pub session_id: String,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "present"
    )]
    pub target: Option<Value>,
}

fn no_subject() -> String {
    NO_SUBJECT.to_string()
}

fn no_session() -> String {
    NO_SESSION.to_string()
}

/// A key that is present on the wire is a target, even when it is `null`.
fn present<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Option<Value>, D::Error> {
    Value::deserialize(deserializer).map(Some)
}

impl Default for GlobalEvent {
    fn default() -> Self {
        GlobalEvent::new(EventClass::None, EventType::None)
    }
}

impl GlobalEvent {
    /// Create an event with no subject, no session and an empty target.
    pub fn new(event_class: EventClass, event: EventType) -> Self {
        Self {
            event_class,
            event,
            subject: no_subject(),
            session_id: no_session(),
            target: Some(Value::String(NO_TARGET.to_string())),
        }
    }

    pub fn notify(event: EventType) -> Self {
        Self::new(EventClass::Notify, event)
    }

    pub fn command(event: EventType) -> Self {
        Self::new(EventClass::Command, event)
    }

    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = subject.into();
        self
    }

    pub fn with_session(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = session_id.into();
        self
    }

    pub fn with_target(mut self, target: impl Into<Value>) -> Self {
        self.target = Some(target.into());
        self
    }

    /// Clear the target. The bus will refuse to deliver the event.
    pub fn without_target(mut self) -> Self {
        self.target = None;
        self
    }

    /// Decode a wire frame.
    ///
    /// Unknown class or kind codes decode to the `Unknown` sentinels.
    pub fn decode(frame: &str) -> Result<Self> {
        serde_json::from_str(frame).map_err(Error::Decode)
    }

    pub fn from_value(value: Value) -> Result<Self> {
        serde_json::from_value(value).map_err(Error::Decode)
    }

    pub fn encode(&self) -> Result<String> {
        serde_json::to_string(self).map_err(Error::Encode)
    }

    /// Logging projection with class and kind rendered as their names.
    pub fn to_friendly(&self) -> FriendlyEvent<'_> {
        FriendlyEvent {
            event_class: self.event_class.label(),
            event: self.event.label(),
            subject: &self.subject,
            session_id: &self.session_id,
            target: self.target.as_ref(),
        }
    }

    pub fn has_target(&self) -> bool {
        self.target.is_some()
    }

    /// The target as a string slice, when it is a JSON string.
    pub fn target_str(&self) -> Option<&str> {
        self.target.as_ref().and_then(Value::as_str)
    }

    /// Deserialize the target into a typed payload.
    pub fn target_as<T: DeserializeOwned>(&self) -> Option<T> {
        self.target
            .as_ref()
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    pub fn is_command(&self) -> bool {
        self.event_class == EventClass::Command
    }

    pub fn is_notify(&self) -> bool {
        self.event_class == EventClass::Notify
    }

    pub fn is_from_server(&self) -> bool {
        self.subject == SERVER
    }

    /// Whether the event addresses `user_id`, directly or through [`ANY_SUBJECT`].
    pub fn is_for(&self, user_id: &str) -> bool {
        self.subject == ANY_SUBJECT || self.subject == user_id
    }

    /// Whether the event applies to session `acronym`, directly or through [`ANY_SESSION`].
    pub fn in_session(&self, acronym: &str) -> bool {
        self.session_id == ANY_SESSION || self.session_id == acronym
    }
}

impl fmt::Display for GlobalEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.to_friendly(), f)
    }
}

/// Logging view of a [`GlobalEvent`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FriendlyEvent<'a> {
    pub event_class: Cow<'static, str>,
    pub event: Cow<'static, str>,
    pub subject: &'a str,
    pub session_id: &'a str,
    pub target: Option<&'a Value>,
}

impl fmt::Display for FriendlyEvent<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match serde_json::to_string(self) {
            Ok(json) => f.write_str(&json),
            Err(_) => write!(f, "{}/{}", self.event_class, self.event),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_new_event_defaults() {
        let evt = GlobalEvent::new(EventClass::Notify, EventType::SessionJoined);
        assert_eq!(evt.subject, NO_SUBJECT);
        assert_eq!(evt.session_id, NO_SESSION);
        assert_eq!(evt.target_str(), Some(NO_TARGET));

        let evt = GlobalEvent::default();
        assert_eq!(evt.event_class, EventClass::None);
        assert_eq!(evt.event, EventType::None);
    }

    #[test]
    fn test_codes_on_the_wire() {
        let evt = GlobalEvent::notify(EventType::SessionJoined)
            .with_subject("auth0|123")
            .with_session("CLASSA-1");
        let value: Value = serde_json::from_str(&evt.encode().unwrap()).unwrap();
        assert_eq!(
            value,
            json!({
                "eventClass": "N",
                "event": "SJ",
                "subject": "auth0|123",
                "sessionId": "CLASSA-1",
                "target": ""
            })
        );
    }

    #[test]
    fn test_missing_target_is_not_serialized() {
        let evt = GlobalEvent::command(EventType::SessionLeft).without_target();
        let value: Value = serde_json::from_str(&evt.encode().unwrap()).unwrap();
        assert!(value.get("target").is_none());
    }

    #[test]
    fn test_null_target_is_present() {
        let evt =
            GlobalEvent::decode(r#"{"eventClass":"C","event":"RE","target":null}"#).unwrap();
        assert_eq!(evt.target, Some(Value::Null));

        let evt = GlobalEvent::decode(r#"{"eventClass":"C","event":"RE"}"#).unwrap();
        assert_eq!(evt.target, None);
        assert_eq!(evt.subject, NO_SUBJECT);
        assert_eq!(evt.session_id, NO_SESSION);
    }

    #[test]
    fn test_unknown_codes_decode_to_sentinels() {
        let evt = GlobalEvent::decode(
            r#"{"eventClass":"Z","event":"NOT-A-KIND","subject":"-","sessionId":"-","target":""}"#,
        )
        .unwrap();
        assert_eq!(evt.event_class, EventClass::Unknown);
        assert_eq!(evt.event, EventType::Unknown);
    }

    #[test]
    fn test_logout_alias() {
        assert_eq!(EventType::Logout, EventType::LoggedOut);
        assert_eq!(EventType::Logout.code(), "LO");
        assert_eq!(EventType::from_code("LO"), Some(EventType::LoggedOut));
    }

    #[test]
    fn test_to_friendly() {
        let evt = GlobalEvent::notify(EventType::LoggedOut)
            .with_subject("auth0|123")
            .with_target(json!({"reason": "expired"}));
        let friendly = evt.to_friendly();
        assert_eq!(friendly.event_class, "Notify");
        assert_eq!(friendly.event, "LoggedOut");
        assert_eq!(friendly.subject, "auth0|123");
        assert_eq!(friendly.target, Some(&json!({"reason": "expired"})));
        assert!(evt.to_string().contains(r#""event":"LoggedOut""#));
    }

    #[test]
    fn test_addressing() {
        let evt = GlobalEvent::command(EventType::MicOff)
            .with_subject("auth0|1")
            .with_session("CLASSA-1");
        assert!(evt.is_for("auth0|1"));
        assert!(!evt.is_for("auth0|2"));
        assert!(evt.in_session("CLASSA-1"));
        assert!(!evt.in_session("CLASSB-1"));
        assert!(evt.is_command());
        assert!(!evt.is_from_server());

        let evt = evt.with_subject(ANY_SUBJECT).with_session(ANY_SESSION);
        assert!(evt.is_for("anyone"));
        assert!(evt.in_session("anywhere"));

        assert!(GlobalEvent::notify(EventType::Record)
            .with_subject(SERVER)
            .is_from_server());
    }

    #[test]
    fn test_codes_are_unique() {
        let mut codes: Vec<_> = EventType::ALL.iter().map(Coded::code).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), EventType::ALL.len());
        assert_eq!(EventClass::ALL.len(), 4);
    }
}
