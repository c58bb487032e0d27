//! The connection the bus exchanges frames over.
//!
//! A transport owns reconnection. The bus only sees the resulting
//! [`TransportEvent`]s and hands outbound frames to the [`Link`].
use tokio::sync::mpsc::{Receiver, Sender};
use tokio_util::sync::CancellationToken;

mod memory;
#[cfg(feature = "websocket")]
mod websocket;

pub use memory::{MemoryRemote, MemoryTransport};
#[cfg(feature = "websocket")]
pub use websocket::WsTransport;

/// What a transport reports to the bus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    Connected,
    Disconnected,
    /// A text frame received from the relay.
    Frame(String),
}

/// Both directions of an open transport.
///
/// Frames sent on `outbound` while the transport is disconnected are dropped
/// by the transport, never replayed after reconnecting.
#[derive(Debug)]
pub struct Link {
    pub outbound: Sender<String>,
    pub events: Receiver<TransportEvent>,
}

pub trait Transport: Send + 'static {
    /// Start connecting. Runs until `cancel` fires or the link is dropped.
    ///
    /// Must be called from within a Tokio runtime.
    fn open(self, cancel: CancellationToken) -> Link;
}
