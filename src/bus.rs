use std::{fmt, sync::Arc};

use futures_util::{Stream, StreamExt};
use tokio::{
    sync::{
        broadcast,
        mpsc::{Sender, error::TrySendError},
        watch,
    },
    task::JoinHandle,
};
use tokio_util::{sync::CancellationToken, task::TaskTracker};
use uuid::Uuid;

use crate::{
    Coded, Config, CredentialProvider, DropReason, Error, EventReceiver, GlobalEvent, Label,
    Lifetime, Lifetimes, Monitor, Result, SERVER, SessionStateProvider, Transport,
    internal::{Consumer, Feed, Relay},
    monitor::Monitors,
    transport::Link,
};

/// Where the bus is in its life.
///
/// `Initializing` → (`Connected` ⇄ `Disconnected`) → `Destroyed`.
/// `Destroyed` is final.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConnectionState {
    Initializing,
    Connected,
    Disconnected,
    Destroyed,
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionState::Initializing => write!(f, "initializing"),
            ConnectionState::Connected => write!(f, "connected"),
            ConnectionState::Disconnected => write!(f, "disconnected"),
            ConnectionState::Destroyed => write!(f, "destroyed"),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub(crate) enum Direction {
    Outbound,
    Inbound,
}

impl Direction {
    fn as_str(&self) -> &'static str {
        match self {
            Direction::Outbound => "to server",
            Direction::Inbound => "from server",
        }
    }
}

/// The client endpoint of the session signaling channel.
///
/// Sends commands and notifications to the relay, receives the ones other
/// participants sent, and fans both out to local subscribers. Cloning gives
/// another handle to the same bus.
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use session_signal::{EventType, GlobalEvent, MemoryTransport, SharedCredentials, SharedSession, SignalBus};
///
/// # async fn run() {
/// let credentials = Arc::new(SharedCredentials::authenticated("auth0|42"));
/// let session = Arc::new(SharedSession::new(credentials.clone()));
/// let (transport, _remote) = MemoryTransport::new(16);
///
/// let bus = SignalBus::builder(credentials, session).start(transport);
/// let mut events = bus.subscribe();
/// bus.publish(GlobalEvent::command(EventType::MuteMicAll));
/// assert_eq!(events.recv().await.unwrap().event, EventType::MuteMicAll);
/// bus.destroy();
/// # }
/// ```
#[derive(Clone)]
pub struct SignalBus {
    core: Arc<Core>,
}

pub struct SignalBusBuilder {
    config: Config,
    credentials: Arc<dyn CredentialProvider>,
    session: Arc<dyn SessionStateProvider>,
    monitors: Monitors,
}

impl SignalBusBuilder {
    pub fn with_config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Register an observer of bus activity.
    pub fn with_monitor(mut self, monitor: Arc<dyn Monitor>) -> Self {
        self.monitors.push(monitor);
        self
    }

    /// Open the transport and start relaying.
    ///
    /// The credential and session providers' change streams are registered
    /// as sticky feeds. Must be called from within a Tokio runtime.
    pub fn start<T: Transport>(self, transport: T) -> SignalBus {
        let shutdown = CancellationToken::new();
        let Link { outbound, events } = transport.open(shutdown.child_token());
        let (inbound, _) = broadcast::channel(self.config.inbound_capacity.max(1));
        let (state, _) = watch::channel(ConnectionState::Initializing);

        let core = Arc::new(Core {
            id: Uuid::new_v4(),
            config: self.config,
            credentials: self.credentials,
            session: self.session,
            monitors: self.monitors,
            outbound,
            inbound,
            state,
            lifetimes: Lifetimes::new(),
            shutdown,
            tasks: TaskTracker::new(),
        });
        tracing::info!(bus_id = %core.id, environment = ?core.config.environment, "Signal bus started");

        core.tasks.spawn(Relay::new(core.clone(), events).run());

        let bus = SignalBus { core };
        let feeds = [bus.core.credentials.changes(), bus.core.session.changes()];
        for changes in feeds.into_iter().flatten() {
            bus.listen_to(changes, Lifetime::Sticky);
        }
        bus
    }
}

impl SignalBus {
    pub fn builder(
        credentials: Arc<dyn CredentialProvider>,
        session: Arc<dyn SessionStateProvider>,
    ) -> SignalBusBuilder {
        SignalBusBuilder {
            config: Config::default(),
            credentials,
            session,
            monitors: Monitors::default(),
        }
    }

    /// Identifier of this bus instance, as it appears in logs.
    pub fn id(&self) -> Uuid {
        self.core.id
    }

    pub fn config(&self) -> &Config {
        &self.core.config
    }

    /// Send an event to the relay and echo it to local subscribers.
    ///
    /// Never blocks and never fails:
    /// - an event without target is dropped and logged,
    /// - while disconnected nothing is sent (no queue, no retry),
    /// - events whose subject is [`SERVER`] are not echoed locally.
    pub fn publish(&self, event: GlobalEvent) {
        self.core.publish(event);
    }

    /// Local subscription to authenticated inbound events and local echoes.
    pub fn subscribe(&self) -> EventReceiver {
        EventReceiver::with_shutdown(self.core.inbound.subscribe(), self.core.shutdown.clone())
    }

    /// Relay every item of `source` through [`SignalBus::publish`] until the
    /// stream ends or the `lifetime` domain is cancelled.
    ///
    /// Registering on a domain that is already cancelled yields an inert feed.
    pub fn listen_to<S>(&self, source: S, lifetime: Lifetime) -> JoinHandle<()>
    where
        S: Stream<Item = GlobalEvent> + Send + 'static,
    {
        let cancel = self.core.lifetimes.token(lifetime);
        if cancel.is_cancelled() || self.core.shutdown.is_cancelled() {
            tracing::warn!(bus_id = %self.core.id, %lifetime, "Feed registered after its lifetime ended, ignoring");
        }
        let feed = Feed::new(self.core.clone(), source.boxed(), lifetime, cancel);
        self.core.tasks.spawn(feed.run())
    }

    /// Run `handler` for every event [`SignalBus::subscribe`] would yield.
    ///
    /// An error or panic in the handler is logged and only affects that
    /// event. The consumer stops when the bus is destroyed.
    pub fn on_event<F>(&self, handler: F) -> JoinHandle<()>
    where
        F: FnMut(GlobalEvent) -> Result + Send + 'static,
    {
        let consumer = Consumer::new(self.core.id, self.subscribe(), handler);
        self.core.tasks.spawn(consumer.run())
    }

    /// End every feed registered with [`Lifetime::Transient`].
    ///
    /// Call it when the view scope owning those feeds is torn down. Sticky
    /// feeds are not affected.
    pub fn end_transient(&self) {
        self.core.lifetimes.cancel(Lifetime::Transient);
    }

    /// Stop relaying, end sticky feeds and close the transport. Idempotent.
    pub fn destroy(&self) {
        if self.core.shutdown.is_cancelled() {
            tracing::debug!(bus_id = %self.core.id, "Signal bus already destroyed");
            return;
        }
        tracing::info!(bus_id = %self.core.id, "Destroying signal bus");
        self.core.lifetimes.cancel(Lifetime::Sticky);
        self.core.shutdown.cancel();
        self.core.tasks.close();
        self.core.set_state(ConnectionState::Destroyed);
    }

    #[cfg(test)]
    pub(crate) fn core(&self) -> &Arc<Core> {
        &self.core
    }

    pub fn is_destroyed(&self) -> bool {
        self.core.shutdown.is_cancelled()
    }

    /// Wait until every task of the bus has finished. Resolves only after
    /// [`SignalBus::destroy`].
    pub async fn closed(&self) {
        self.core.tasks.wait().await;
    }

    pub fn state(&self) -> ConnectionState {
        *self.core.state.borrow()
    }

    pub fn is_connected(&self) -> bool {
        self.state() == ConnectionState::Connected
    }

    pub fn watch_state(&self) -> watch::Receiver<ConnectionState> {
        self.core.state.subscribe()
    }

    /// Wait until the bus reaches `state`.
    ///
    /// Fails with [`Error::Destroyed`] if the bus is destroyed first.
    pub async fn wait_for(&self, state: ConnectionState) -> Result {
        let mut rx = self.watch_state();
        let reached = rx
            .wait_for(|s| *s == state || *s == ConnectionState::Destroyed)
            .await
            .map(|s| *s)
            .map_err(|_| Error::Destroyed)?;
        if reached == state {
            Ok(())
        } else {
            Err(Error::Destroyed)
        }
    }
}

impl fmt::Debug for SignalBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignalBus")
            .field("id", &self.core.id)
            .field("state", &self.state())
            .finish()
    }
}

/// State shared by the bus handles and its tasks.
pub(crate) struct Core {
    pub id: Uuid,
    pub config: Config,
    pub credentials: Arc<dyn CredentialProvider>,
    pub session: Arc<dyn SessionStateProvider>,
    pub monitors: Monitors,
    outbound: Sender<String>,
    inbound: broadcast::Sender<GlobalEvent>,
    state: watch::Sender<ConnectionState>,
    pub lifetimes: Lifetimes,
    pub shutdown: CancellationToken,
    tasks: TaskTracker,
}

impl Core {
    pub fn publish(&self, event: GlobalEvent) {
        if self.shutdown.is_cancelled() {
            tracing::debug!(bus_id = %self.id, event = %event.event, "Bus destroyed, event dropped");
            return;
        }
        if !event.has_target() {
            let e = Error::MissingTarget(event.event.label().into());
            tracing::warn!(bus_id = %self.id, error = %e, "Event dropped");
            self.monitors
                .notify(|m| m.on_event_dropped(Some(&event), DropReason::MissingTarget));
            return;
        }

        self.log_event(Direction::Outbound, &event);
        self.send(&event);

        if event.subject != SERVER {
            self.deliver(event);
        }
    }

    /// Hand an event to the transport. Returns whether it was accepted.
    pub fn send(&self, event: &GlobalEvent) -> bool {
        if *self.state.borrow() != ConnectionState::Connected {
            tracing::debug!(bus_id = %self.id, event = %event.event, "Not connected, event not sent");
            self.monitors
                .notify(|m| m.on_event_dropped(Some(event), DropReason::NotConnected));
            return false;
        }

        let frame = match event.encode() {
            Ok(frame) => frame,
            Err(e) => {
                tracing::warn!(bus_id = %self.id, event = %event.event, error = %e, "Event not sent");
                self.monitors
                    .notify(|m| m.on_event_dropped(Some(event), DropReason::Malformed));
                return false;
            }
        };

        match self.outbound.try_send(frame) {
            Ok(()) => {
                self.monitors.notify(|m| m.on_event_sent(event));
                true
            }
            Err(e) => {
                let closed = matches!(e, TrySendError::Closed(_));
                tracing::warn!(bus_id = %self.id, event = %event.event, closed, error = %Error::from(e), "Event not sent");
                self.monitors
                    .notify(|m| m.on_event_dropped(Some(event), DropReason::Backpressure));
                false
            }
        }
    }

    /// Fan an event out to local subscribers.
    pub fn deliver(&self, event: GlobalEvent) {
        // No subscribers is fine.
        let _ = self.inbound.send(event);
    }

    pub fn is_authenticated(&self) -> bool {
        self.credentials.is_authenticated()
    }

    /// Move to `next` unless the bus is destroyed. Returns the previous state.
    pub fn set_state(&self, next: ConnectionState) -> ConnectionState {
        let mut previous = next;
        self.state.send_if_modified(|current| {
            previous = *current;
            if *current == ConnectionState::Destroyed || *current == next {
                return false;
            }
            *current = next;
            true
        });
        if previous != next && previous != ConnectionState::Destroyed {
            tracing::debug!(bus_id = %self.id, from = %previous, to = %next, "Connection state changed");
        }
        previous
    }

    pub fn log_event(&self, direction: Direction, event: &GlobalEvent) {
        let target = event.target.as_ref().unwrap_or(&serde_json::Value::Null);
        tracing::debug!(
            bus_id = %self.id,
            direction = direction.as_str(),
            class = event.event_class.code(),
            kind = event.event.code(),
            name = %event.event,
            subject = %event.subject,
            session = %event.session_id,
            target = %target,
            "(evt)"
        );
    }
}
