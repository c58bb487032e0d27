use std::sync::Arc;

use serde_json::Value;
use tokio::{select, sync::mpsc::Receiver};

use crate::{
    ConnectivitySignal, DropReason, EventClass, EventType, GlobalEvent, NO_TARGET, SERVER,
    bus::{ConnectionState, Core, Direction},
    transport::TransportEvent,
};

/// Turns transport events into bus state changes and local deliveries.
pub(crate) struct Relay {
    core: Arc<Core>,
    events: Receiver<TransportEvent>,
}

impl Relay {
    pub fn new(core: Arc<Core>, events: Receiver<TransportEvent>) -> Self {
        Relay { core, events }
    }

    pub async fn run(mut self) {
        loop {
            select! {
                biased;
                _ = self.core.shutdown.cancelled() => break,
                event = self.events.recv() => match event {
                    Some(event) => self.handle(event),
                    None => {
                        tracing::warn!(bus_id = %self.core.id, "Transport link closed");
                        self.on_disconnected();
                        break;
                    }
                },
            }
        }
        tracing::debug!(bus_id = %self.core.id, "Relay stopped");
    }

    fn handle(&self, event: TransportEvent) {
        match event {
            TransportEvent::Connected => self.on_connected(),
            TransportEvent::Disconnected => self.on_disconnected(),
            TransportEvent::Frame(frame) => self.on_frame(&frame),
        }
    }

    fn on_connected(&self) {
        let previous = self.core.set_state(ConnectionState::Connected);
        if matches!(
            previous,
            ConnectionState::Connected | ConnectionState::Destroyed
        ) {
            return;
        }
        tracing::info!(bus_id = %self.core.id, "Connected to relay");
        self.announce_session();
        self.core
            .monitors
            .notify(|m| m.on_connectivity(ConnectivitySignal::Restored));
    }

    fn on_disconnected(&self) {
        if self.core.set_state(ConnectionState::Disconnected) != ConnectionState::Connected {
            return;
        }
        tracing::info!(bus_id = %self.core.id, "Disconnected from relay");
        self.core
            .monitors
            .notify(|m| m.on_connectivity(ConnectivitySignal::Lost));
    }

    /// Tell the relay which session this participant is in.
    fn announce_session(&self) {
        if !self.core.session.is_session_valid() || !self.core.is_authenticated() {
            return;
        }
        let acronym = self.core.session.current_session_acronym();
        let user_id = self.core.credentials.current_user_id();
        let (Some(acronym), Some(user_id)) = (acronym, user_id) else {
            return;
        };
        let joined = GlobalEvent::notify(EventType::SessionJoined)
            .with_session(acronym)
            .with_subject(user_id);
        self.core.log_event(Direction::Outbound, &joined);
        self.core.send(&joined);
    }

    fn on_frame(&self, frame: &str) {
        let event = match GlobalEvent::decode(frame) {
            Ok(event) => event,
            Err(e) => {
                tracing::warn!(bus_id = %self.core.id, error = %e, len = frame.len(), "Dropping malformed frame");
                self.core
                    .monitors
                    .notify(|m| m.on_event_dropped(None, DropReason::Malformed));
                return;
            }
        };

        if event.event == EventType::Heartbeat && self.core.config.reply_to_heartbeats {
            self.reply_to_heartbeat(&event);
            return;
        }

        if !event.has_target() {
            tracing::warn!(bus_id = %self.core.id, event = %event.event, "Dropping inbound event without target");
            self.core
                .monitors
                .notify(|m| m.on_event_dropped(Some(&event), DropReason::MissingTarget));
            return;
        }

        if !self.core.is_authenticated() {
            tracing::debug!(bus_id = %self.core.id, event = %event.event, "Not authenticated, inbound event dropped");
            self.core
                .monitors
                .notify(|m| m.on_event_dropped(Some(&event), DropReason::Unauthenticated));
            return;
        }

        self.core.log_event(Direction::Inbound, &event);
        self.core
            .monitors
            .notify(|m| m.on_event_received(&event));
        self.core.deliver(event);
    }

    fn reply_to_heartbeat(&self, heartbeat: &GlobalEvent) {
        let reply = GlobalEvent {
            event_class: EventClass::Notify,
            event: EventType::HeartbeatReply,
            subject: SERVER.to_string(),
            session_id: heartbeat.session_id.clone(),
            target: Some(
                heartbeat
                    .target
                    .clone()
                    .unwrap_or_else(|| Value::from(NO_TARGET)),
            ),
        };
        tracing::trace!(bus_id = %self.core.id, target = ?reply.target, "Heartbeat");
        self.core.send(&reply);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use tokio::sync::mpsc;

    use super::*;
    use crate::{MemoryTransport, Monitor, SharedCredentials, SharedSession, SignalBus};

    #[derive(Default)]
    struct Signals(Mutex<Vec<ConnectivitySignal>>);

    impl Monitor for Signals {
        fn on_connectivity(&self, signal: ConnectivitySignal) {
            self.0.lock().unwrap().push(signal);
        }
    }

    #[tokio::test]
    async fn test_connect_report_after_destroy_is_ignored() {
        let credentials = Arc::new(SharedCredentials::authenticated("auth0|1"));
        let session = Arc::new(SharedSession::new(credentials.clone()));
        session.join("CLASSA-1");
        let signals = Arc::new(Signals::default());
        let (transport, mut remote) = MemoryTransport::new(8);
        let bus = SignalBus::builder(credentials, session)
            .with_monitor(signals.clone())
            .start(transport);
        bus.destroy();

        let (_events_tx, events_rx) = mpsc::channel(1);
        let relay = Relay::new(bus.core().clone(), events_rx);
        relay.handle(TransportEvent::Connected);
        relay.handle(TransportEvent::Disconnected);

        assert_eq!(bus.state(), ConnectionState::Destroyed);
        assert!(signals.0.lock().unwrap().is_empty());
        assert!(remote.try_sent().is_none());
    }
}
