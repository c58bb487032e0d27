use tokio::sync::mpsc::{self, Receiver, Sender};
use tokio_util::sync::CancellationToken;

use super::{Link, Transport, TransportEvent};
use crate::{GlobalEvent, Result};

/// In-process transport. The [`MemoryRemote`] plays the relay.
///
/// ```rust
/// use session_signal::MemoryTransport;
///
/// let (transport, remote) = MemoryTransport::new(16);
/// # let _ = (transport, remote);
/// ```
#[derive(Debug)]
pub struct MemoryTransport {
    outbound: Sender<String>,
    events: Receiver<TransportEvent>,
}

/// Relay side of a [`MemoryTransport`].
#[derive(Debug)]
pub struct MemoryRemote {
    events: Sender<TransportEvent>,
    sent: Receiver<String>,
}

impl MemoryTransport {
    /// `capacity` bounds both directions; zero is treated as one.
    pub fn new(capacity: usize) -> (MemoryTransport, MemoryRemote) {
        let capacity = capacity.max(1);
        let (outbound_tx, outbound_rx) = mpsc::channel(capacity);
        let (events_tx, events_rx) = mpsc::channel(capacity);
        let transport = MemoryTransport {
            outbound: outbound_tx,
            events: events_rx,
        };
        let remote = MemoryRemote {
            events: events_tx,
            sent: outbound_rx,
        };
        (transport, remote)
    }
}

impl Transport for MemoryTransport {
    fn open(self, _cancel: CancellationToken) -> Link {
        Link {
            outbound: self.outbound,
            events: self.events,
        }
    }
}

impl MemoryRemote {
    pub async fn connect(&self) -> Result<()> {
        self.events.send(TransportEvent::Connected).await?;
        Ok(())
    }

    pub async fn disconnect(&self) -> Result<()> {
        self.events.send(TransportEvent::Disconnected).await?;
        Ok(())
    }

    /// Deliver a raw frame to the bus.
    pub async fn deliver(&self, frame: impl Into<String>) -> Result<()> {
        self.events.send(TransportEvent::Frame(frame.into())).await?;
        Ok(())
    }

    pub async fn deliver_event(&self, event: &GlobalEvent) -> Result<()> {
        self.deliver(event.encode()?).await
    }

    /// Next frame the bus sent. `None` once the bus dropped its link.
    pub async fn next_sent(&mut self) -> Option<String> {
        self.sent.recv().await
    }

    pub async fn next_sent_event(&mut self) -> Option<Result<GlobalEvent>> {
        self.next_sent()
            .await
            .map(|frame| GlobalEvent::decode(&frame))
    }

    /// A frame the bus already sent, without waiting.
    pub fn try_sent(&mut self) -> Option<String> {
        self.sent.try_recv().ok()
    }

    /// Every frame sent so far, without waiting.
    pub fn drain_sent(&mut self) -> Vec<String> {
        let mut frames = Vec::new();
        while let Ok(frame) = self.sent.try_recv() {
            frames.push(frame);
        }
        frames
    }

    /// Whether the bus has dropped its side of the link.
    pub fn is_closed(&self) -> bool {
        self.events.is_closed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::EventType;

    #[tokio::test]
    async fn test_zero_capacity_still_carries_frames() {
        let (transport, mut remote) = MemoryTransport::new(0);
        let mut link = transport.open(CancellationToken::new());

        remote.connect().await.unwrap();
        assert_eq!(link.events.recv().await, Some(TransportEvent::Connected));

        let frame = GlobalEvent::notify(EventType::MicOn).encode().unwrap();
        link.outbound.try_send(frame.clone()).unwrap();
        assert_eq!(remote.next_sent().await, Some(frame));
    }
}
