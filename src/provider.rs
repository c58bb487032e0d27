//! Collaborators the bus consults: who the user is and which session is active.
//!
//! The bus only reads from these. Credential acquisition and session lookup
//! happen elsewhere; the shared implementations here are in-process holders
//! the application updates as those change.
use std::sync::{Arc, RwLock};

use futures_util::stream::BoxStream;
use serde_json::json;
use tokio::sync::broadcast;

use crate::{ClientView, EventType, GlobalEvent, NO_SUBJECT, receiver::broadcast_stream};

const CHANGES_CAPACITY: usize = 32;

pub type EventStream = BoxStream<'static, GlobalEvent>;

pub trait CredentialProvider: Send + Sync {
    fn is_authenticated(&self) -> bool;

    /// Identifier of the authenticated user, used as the subject of events about them.
    fn current_user_id(&self) -> Option<String>;

    /// Login/logout notifications, relayed by the bus as a sticky feed.
    fn changes(&self) -> Option<EventStream> {
        None
    }
}

pub trait SessionStateProvider: Send + Sync {
    fn is_session_valid(&self) -> bool;

    /// Acronym of the active class session, used as the event session id.
    fn current_session_acronym(&self) -> Option<String>;

    /// Session-state transitions, relayed by the bus as a sticky feed.
    fn changes(&self) -> Option<EventStream> {
        None
    }
}

/// Credential holder shared between the login flow and the bus.
///
/// `login`/`logout` update the state and emit `Notify/LoggedIn` and
/// `Notify/LoggedOut` on [`CredentialProvider::changes`].
#[derive(Clone)]
pub struct SharedCredentials {
    user_id: Arc<RwLock<Option<String>>>,
    changes: broadcast::Sender<GlobalEvent>,
}

impl Default for SharedCredentials {
    fn default() -> Self {
        Self {
            user_id: Arc::new(RwLock::new(None)),
            changes: broadcast::channel(CHANGES_CAPACITY).0,
        }
    }
}

impl SharedCredentials {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn authenticated(user_id: impl Into<String>) -> Self {
        let credentials = Self::default();
        *credentials.write() = Some(user_id.into());
        credentials
    }

    pub fn login(&self, user_id: impl Into<String>) {
        let user_id = user_id.into();
        *self.write() = Some(user_id.clone());
        let evt = GlobalEvent::notify(EventType::LoggedIn)
            .with_subject(user_id.as_str())
            .with_target(json!({ "sub": user_id }));
        let _ = self.changes.send(evt);
    }

    pub fn logout(&self) {
        let previous = self.write().take();
        let evt = GlobalEvent::notify(EventType::LoggedOut)
            .with_subject(previous.as_deref().unwrap_or(NO_SUBJECT));
        let _ = self.changes.send(evt);
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Option<String>> {
        self.user_id.write().unwrap_or_else(|e| e.into_inner())
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Option<String>> {
        self.user_id.read().unwrap_or_else(|e| e.into_inner())
    }
}

impl CredentialProvider for SharedCredentials {
    fn is_authenticated(&self) -> bool {
        self.read().is_some()
    }

    fn current_user_id(&self) -> Option<String> {
        self.read().clone()
    }

    fn changes(&self) -> Option<EventStream> {
        Some(broadcast_stream(self.changes.subscribe()))
    }
}

/// Active-session holder shared between the session views and the bus.
///
/// Joining a session emits `SessionLeft` for the previous one (if any) and
/// `SessionJoined` for the new one; leaving emits `SessionLeft`.
#[derive(Clone)]
pub struct SharedSession {
    acronym: Arc<RwLock<Option<String>>>,
    credentials: Arc<dyn CredentialProvider>,
    changes: broadcast::Sender<GlobalEvent>,
}

impl SharedSession {
    pub fn new(credentials: Arc<dyn CredentialProvider>) -> Self {
        Self {
            acronym: Arc::new(RwLock::new(None)),
            credentials,
            changes: broadcast::channel(CHANGES_CAPACITY).0,
        }
    }

    pub fn join(&self, acronym: impl Into<String>) {
        let acronym = acronym.into();
        let previous = self.write().replace(acronym.clone());
        if let Some(previous) = previous {
            self.emit(
                GlobalEvent::notify(EventType::SessionLeft)
                    .with_session(previous)
                    .with_target(json!({})),
            );
        }
        self.emit(
            GlobalEvent::notify(EventType::SessionJoined)
                .with_session(acronym)
                .with_target(json!({})),
        );
    }

    pub fn leave(&self) {
        let previous = self.write().take();
        if let Some(previous) = previous {
            self.emit(
                GlobalEvent::notify(EventType::SessionLeft)
                    .with_session(previous)
                    .with_target(json!({})),
            );
        }
    }

    /// Announce the layout this participant switched to.
    pub fn change_view(&self, view: ClientView) {
        let acronym = self.read().clone();
        if let Some(acronym) = acronym {
            self.emit(
                GlobalEvent::notify(EventType::ViewChanged)
                    .with_session(acronym)
                    .with_target(view),
            );
        }
    }

    fn emit(&self, evt: GlobalEvent) {
        let subject = self
            .credentials
            .current_user_id()
            .unwrap_or_else(|| NO_SUBJECT.to_string());
        let _ = self.changes.send(evt.with_subject(subject));
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Option<String>> {
        self.acronym.write().unwrap_or_else(|e| e.into_inner())
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Option<String>> {
        self.acronym.read().unwrap_or_else(|e| e.into_inner())
    }
}

impl SessionStateProvider for SharedSession {
    fn is_session_valid(&self) -> bool {
        self.read().is_some()
    }

    fn current_session_acronym(&self) -> Option<String> {
        self.read().clone()
    }

    fn changes(&self) -> Option<EventStream> {
        Some(broadcast_stream(self.changes.subscribe()))
    }
}

#[cfg(test)]
mod tests {
    use futures_util::StreamExt;

    use super::*;

    #[tokio::test]
    async fn test_login_logout_changes() {
        let credentials = SharedCredentials::new();
        let mut changes = credentials.changes().unwrap();
        assert!(!credentials.is_authenticated());

        credentials.login("auth0|123");
        assert!(credentials.is_authenticated());
        assert_eq!(credentials.current_user_id().as_deref(), Some("auth0|123"));

        credentials.logout();
        assert!(!credentials.is_authenticated());

        let login = changes.next().await.unwrap();
        assert_eq!(login.event, EventType::LoggedIn);
        assert_eq!(login.subject, "auth0|123");
        let logout = changes.next().await.unwrap();
        assert_eq!(logout.event, EventType::LoggedOut);
        assert_eq!(logout.subject, "auth0|123");
    }

    #[tokio::test]
    async fn test_session_transitions() {
        let credentials = Arc::new(SharedCredentials::authenticated("auth0|7"));
        let session = SharedSession::new(credentials);
        let mut changes = session.changes().unwrap();
        assert!(!session.is_session_valid());

        session.join("CLASSA-1");
        session.join("CLASSB-1");
        session.change_view(ClientView::Instructor);
        session.leave();
        assert!(!session.is_session_valid());

        let expected = [
            (EventType::SessionJoined, "CLASSA-1"),
            (EventType::SessionLeft, "CLASSA-1"),
            (EventType::SessionJoined, "CLASSB-1"),
            (EventType::ViewChanged, "CLASSB-1"),
            (EventType::SessionLeft, "CLASSB-1"),
        ];
        for (kind, acronym) in expected {
            let evt = changes.next().await.unwrap();
            assert_eq!((evt.event, evt.session_id.as_str()), (kind, acronym));
            assert_eq!(evt.subject, "auth0|7");
            assert!(evt.has_target());
        }
    }
}
