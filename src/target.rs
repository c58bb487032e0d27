//! Typed values for the targets of well-known event kinds.
//!
//! Targets travel as plain strings. These enums give producers and consumers
//! a checked vocabulary for them:
//!
//! - [`RecordState`] for `Record`
//! - [`MusicAction`] for `Music`
//! - [`ClientView`] for the view events
//!
//! ```rust
//! use session_signal::{EventType, GlobalEvent, RecordState};
//!
//! let evt = GlobalEvent::command(EventType::Record).with_target(RecordState::On);
//! assert_eq!(evt.target_str(), Some("on"));
//! assert_eq!(evt.target_str().and_then(|t| t.parse().ok()), Some(RecordState::On));
//! ```
use std::{fmt, str::FromStr};

use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("'{value}' is not a valid {kind}")]
pub struct ParseTargetError {
    kind: &'static str,
    value: String,
}

macro_rules! target_enum {
    ($(#[$meta:meta])* $name:ident, $kind:literal { $($variant:ident => $code:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $code),+
                }
            }
        }

        impl FromStr for $name {
            type Err = ParseTargetError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($code => Ok($name::$variant),)+
                    _ => Err(ParseTargetError {
                        kind: $kind,
                        value: s.to_string(),
                    }),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl From<$name> for Value {
            fn from(value: $name) -> Value {
                Value::String(value.as_str().to_string())
            }
        }
    };
}

target_enum! {
    /// Recording state, as commanded by the instructor and reported by the relay.
    RecordState, "recording state" {
        On => "on",
        Off => "off",
        Pause => "pause",
        Error => "err",
    }
}

target_enum! {
    /// Music playback commands and notifications.
    MusicAction, "music action" {
        Play => "play",
        Pause => "pause",
        Stop => "stop",
        VolumeUp => "vup",
        VolumeDown => "vdown",
        Loading => "loading",
        Ready => "ready",
    }
}

target_enum! {
    /// Layout shown to participants.
    ClientView, "client view" {
        Group => "group",
        Instructor => "inst",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_values() {
        assert_eq!("pause".parse::<RecordState>(), Ok(RecordState::Pause));
        assert_eq!("err".parse::<RecordState>(), Ok(RecordState::Error));
        assert_eq!("vdown".parse::<MusicAction>(), Ok(MusicAction::VolumeDown));
        assert_eq!("inst".parse::<ClientView>(), Ok(ClientView::Instructor));
    }

    #[test]
    fn test_parse_rejects_unknown_values() {
        let err = "loud".parse::<MusicAction>().unwrap_err();
        assert_eq!(err.to_string(), "'loud' is not a valid music action");
    }

    #[test]
    fn test_into_value() {
        assert_eq!(Value::from(MusicAction::Play), Value::String("play".into()));
        assert_eq!(ClientView::Group.to_string(), "group");
    }
}
