use session_signal::{
    Coded, EventGroup, EventType,
    taxonomy::{
        is_active_session_event, is_for_all_participants, is_help_event, is_media_event,
        is_mic_event, is_music_event, is_mute_event, is_qos_event, is_recording_event,
        is_unmute_event, is_video_event, is_view_event,
    },
};

use EventType::*;

type Predicate = fn(EventType) -> bool;

fn expectations() -> Vec<(&'static str, Predicate, EventGroup, Vec<EventType>)> {
    vec![
        (
            "media",
            is_media_event,
            EventGroup::Media,
            vec![
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
            ],
        ),
        (
            "active session",
            is_active_session_event,
            EventGroup::ActiveSession,
            vec![SessionActive, SessionInactive, SessionLeft, SessionJoined],
        ),
        (
            "mute",
            is_mute_event,
            EventGroup::Mute,
            vec![MuteMicAll, MuteAudio, MuteVideoAll, AudioMuted, MicOff, CameraOff],
        ),
        (
            "unmute",
            is_unmute_event,
            EventGroup::Unmute,
            vec![UnmuteMicAll, UnmuteVideoAll, UnmuteAudio, AudioUnmuted, MicOn, CameraOn],
        ),
        (
            "mic",
            is_mic_event,
            EventGroup::Mic,
            vec![MuteMicAll, UnmuteMicAll, MicOff, MicOn],
        ),
        ("recording", is_recording_event, EventGroup::Recording, vec![Record]),
        ("music", is_music_event, EventGroup::Music, vec![Music]),
        (
            "video",
            is_video_event,
            EventGroup::Video,
            vec![MuteVideoAll, UnmuteVideoAll, CameraOff, CameraOn],
        ),
        ("help", is_help_event, EventGroup::Help, vec![HelpWanted]),
        (
            "all participants",
            is_for_all_participants,
            EventGroup::AllParticipants,
            vec![
                NavigateAll,
                LogoutAll,
                MuteMicAll,
                MuteVideoAll,
                UnmuteMicAll,
                UnmuteVideoAll,
                MediaStatusAll,
            ],
        ),
        (
            "view",
            is_view_event,
            EventGroup::View,
            vec![ViewChanged, ChangeView, ChangeViewAll],
        ),
        ("qos", is_qos_event, EventGroup::Qos, vec![QosAlert]),
    ]
}

#[test]
fn test_predicates_match_groups_for_every_kind() {
    for (name, predicate, group, members) in expectations() {
        for &kind in EventType::ALL {
            let expected = members.contains(&kind);
            assert_eq!(predicate(kind), expected, "{name} predicate on {kind}");
            assert_eq!(group.contains(kind), expected, "{group} group on {kind}");
        }
    }
}

#[test]
fn test_groups_listing_agrees_with_members() {
    for &kind in EventType::ALL {
        let expected: Vec<EventGroup> = expectations()
            .into_iter()
            .filter(|(_, _, _, members)| members.contains(&kind))
            .map(|(_, _, group, _)| group)
            .collect();
        assert_eq!(kind.groups().collect::<Vec<_>>(), expected, "groups of {kind}");
    }
}

#[test]
fn test_sentinels_and_session_control_are_ungrouped() {
    for kind in [None, Unknown, Heartbeat, HeartbeatReply, LoggedIn, LoggedOut, Navigate] {
        assert_eq!(kind.groups().count(), 0, "{kind}");
    }
    assert!(!is_for_all_participants(ChangeViewAll));
}
