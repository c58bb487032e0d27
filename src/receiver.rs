use futures_util::stream::{self, BoxStream, StreamExt};
use tokio::{
    select,
    sync::broadcast::{
        self,
        error::{RecvError, TryRecvError},
    },
};
use tokio_util::sync::CancellationToken;

use crate::GlobalEvent;

/// Local subscription to the bus' inbound stream.
///
/// Yields every authenticated inbound event and every local echo, in arrival
/// order. A subscriber that falls more than
/// [`Config::inbound_capacity`](crate::Config::inbound_capacity) events behind
/// skips the oldest ones and keeps going.
#[derive(Debug)]
pub struct EventReceiver {
    inner: broadcast::Receiver<GlobalEvent>,
    closed: CancellationToken,
}

impl EventReceiver {
    pub(crate) fn new(inner: broadcast::Receiver<GlobalEvent>) -> Self {
        Self::with_shutdown(inner, CancellationToken::new())
    }

    pub(crate) fn with_shutdown(
        inner: broadcast::Receiver<GlobalEvent>,
        closed: CancellationToken,
    ) -> Self {
        Self { inner, closed }
    }

    /// Wait for the next event. Returns `None` once the bus is destroyed and
    /// the events queued before that were taken.
    pub async fn recv(&mut self) -> Option<GlobalEvent> {
        loop {
            let received = select! {
                biased;
                received = self.inner.recv() => received,
                _ = self.closed.cancelled() => return self.try_recv(),
            };
            match received {
                Ok(event) => return Some(event),
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Subscriber lagging, events skipped");
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }

    /// Take the next event if one is already queued.
    pub fn try_recv(&mut self) -> Option<GlobalEvent> {
        loop {
            match self.inner.try_recv() {
                Ok(event) => return Some(event),
                Err(TryRecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Subscriber lagging, events skipped");
                }
                Err(TryRecvError::Empty | TryRecvError::Closed) => return None,
            }
        }
    }

    pub fn into_stream(self) -> BoxStream<'static, GlobalEvent> {
        stream::unfold(self, |mut rx| async move {
            rx.recv().await.map(|event| (event, rx))
        })
        .boxed()
    }
}

/// Adapt a broadcast receiver into a stream that skips lagged events.
pub(crate) fn broadcast_stream(
    receiver: broadcast::Receiver<GlobalEvent>,
) -> BoxStream<'static, GlobalEvent> {
    EventReceiver::new(receiver).into_stream()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::EventType;

    #[tokio::test]
    async fn test_lagging_receiver_keeps_going() {
        let (tx, rx) = broadcast::channel(2);
        let mut rx = EventReceiver::new(rx);
        for kind in [EventType::MicOn, EventType::MicOff, EventType::CameraOn] {
            tx.send(GlobalEvent::notify(kind)).unwrap();
        }
        assert_eq!(rx.recv().await.unwrap().event, EventType::MicOff);
        assert_eq!(rx.try_recv().unwrap().event, EventType::CameraOn);
        assert!(rx.try_recv().is_none());

        drop(tx);
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_shutdown_closes_receiver() {
        let (tx, rx) = broadcast::channel(8);
        let closed = CancellationToken::new();
        let mut rx = EventReceiver::with_shutdown(rx, closed.clone());
        tx.send(GlobalEvent::notify(EventType::Record)).unwrap();
        closed.cancel();
        assert_eq!(rx.recv().await.unwrap().event, EventType::Record);
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_into_stream() {
        let (tx, rx) = broadcast::channel(8);
        let mut stream = EventReceiver::new(rx).into_stream();
        tx.send(GlobalEvent::notify(EventType::Music)).unwrap();
        drop(tx);
        assert_eq!(stream.next().await.unwrap().event, EventType::Music);
        assert!(stream.next().await.is_none());
    }
}
