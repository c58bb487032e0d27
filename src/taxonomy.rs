//! Semantic groups of event kinds.
//!
//! UI components react to *categories* of events ("anything that mutes",
//! "anything for every participant") rather than to raw kinds. Each group is a
//! fixed set; groups overlap, e.g. `CameraOff` is both a media and a mute event.
use std::fmt;

use crate::{EventType, Label};

use EventType::*;

const MEDIA_EVENTS: &[EventType] = &[
    MuteMicAll,
    MuteAudio,
    MuteVideoAll,
    UnmuteMicAll,
    UnmuteVideoAll,
    UnmuteAudio,
    AudioMuted,
    AudioUnmuted,
    CameraOff,
    CameraOn,
    MicOff,
    MicOn,
    MediaStatus,
    MediaStatusAll,
    QosAlert,
    SessionActive,
    SessionInactive,
    SessionJoined,
    SessionLeft,
];

const ACTIVE_SESSION_EVENTS: &[EventType] =
    &[SessionActive, SessionInactive, SessionLeft, SessionJoined];

const MUTE_EVENTS: &[EventType] = &[
    MuteMicAll,
    MuteAudio,
    MuteVideoAll,
    AudioMuted,
    MicOff,
    CameraOff,
];

const UNMUTE_EVENTS: &[EventType] = &[
    UnmuteMicAll,
    UnmuteVideoAll,
    UnmuteAudio,
    AudioUnmuted,
    MicOn,
    CameraOn,
];

const MIC_EVENTS: &[EventType] = &[MuteMicAll, UnmuteMicAll, MicOff, MicOn];

const RECORDING_EVENTS: &[EventType] = &[Record];

const MUSIC_EVENTS: &[EventType] = &[Music];

const VIDEO_EVENTS: &[EventType] = &[MuteVideoAll, UnmuteVideoAll, CameraOff, CameraOn];

const HELP_EVENTS: &[EventType] = &[HelpWanted];

// ChangeViewAll is relayed per participant, not as a broadcast.
const ALL_PARTICIPANT_EVENTS: &[EventType] = &[
    NavigateAll,
    LogoutAll,
    MuteMicAll,
    MuteVideoAll,
    UnmuteMicAll,
    UnmuteVideoAll,
    MediaStatusAll,
];

const VIEW_EVENTS: &[EventType] = &[ViewChanged, ChangeView, ChangeViewAll];

const QOS_EVENTS: &[EventType] = &[QosAlert];

/// A named category of event kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Label)]
pub enum EventGroup {
    Media,
    ActiveSession,
    Mute,
    Unmute,
    Mic,
    Recording,
    Music,
    Video,
    Help,
    AllParticipants,
    View,
    Qos,
}

impl EventGroup {
    pub const ALL: &'static [EventGroup] = &[
        EventGroup::Media,
        EventGroup::ActiveSession,
        EventGroup::Mute,
        EventGroup::Unmute,
        EventGroup::Mic,
        EventGroup::Recording,
        EventGroup::Music,
        EventGroup::Video,
        EventGroup::Help,
        EventGroup::AllParticipants,
        EventGroup::View,
        EventGroup::Qos,
    ];

    pub fn members(&self) -> &'static [EventType] {
        match self {
            EventGroup::Media => MEDIA_EVENTS,
            EventGroup::ActiveSession => ACTIVE_SESSION_EVENTS,
            EventGroup::Mute => MUTE_EVENTS,
            EventGroup::Unmute => UNMUTE_EVENTS,
            EventGroup::Mic => MIC_EVENTS,
            EventGroup::Recording => RECORDING_EVENTS,
            EventGroup::Music => MUSIC_EVENTS,
            EventGroup::Video => VIDEO_EVENTS,
            EventGroup::Help => HELP_EVENTS,
            EventGroup::AllParticipants => ALL_PARTICIPANT_EVENTS,
            EventGroup::View => VIEW_EVENTS,
            EventGroup::Qos => QOS_EVENTS,
        }
    }

    #[inline]
    pub fn contains(&self, kind: EventType) -> bool {
        self.members().contains(&kind)
    }
}

impl fmt::Display for EventGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

impl EventType {
    /// Every group this kind belongs to, in [`EventGroup::ALL`] order.
    pub fn groups(&self) -> impl Iterator<Item = EventGroup> + '_ {
        EventGroup::ALL
            .iter()
            .copied()
            .filter(move |group| group.contains(*self))
    }
}

pub fn is_media_event(kind: EventType) -> bool {
    EventGroup::Media.contains(kind)
}

pub fn is_active_session_event(kind: EventType) -> bool {
    EventGroup::ActiveSession.contains(kind)
}

pub fn is_mute_event(kind: EventType) -> bool {
    EventGroup::Mute.contains(kind)
}

pub fn is_unmute_event(kind: EventType) -> bool {
    EventGroup::Unmute.contains(kind)
}

pub fn is_mic_event(kind: EventType) -> bool {
    EventGroup::Mic.contains(kind)
}

pub fn is_recording_event(kind: EventType) -> bool {
    EventGroup::Recording.contains(kind)
}

pub fn is_music_event(kind: EventType) -> bool {
    EventGroup::Music.contains(kind)
}

pub fn is_video_event(kind: EventType) -> bool {
    EventGroup::Video.contains(kind)
}

pub fn is_help_event(kind: EventType) -> bool {
    EventGroup::Help.contains(kind)
}

/// Kinds meant to be broadcast to every participant of a session.
pub fn is_for_all_participants(kind: EventType) -> bool {
    EventGroup::AllParticipants.contains(kind)
}

pub fn is_view_event(kind: EventType) -> bool {
    EventGroup::View.contains(kind)
}

pub fn is_qos_event(kind: EventType) -> bool {
    EventGroup::Qos.contains(kind)
}
