use std::sync::Arc;

use tokio::sync::mpsc::error::{SendError, TrySendError};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Couldn't decode the wire message: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("Couldn't encode the event: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("Event {0} has no target and can't be sent")]
    MissingTarget(Arc<str>),

    #[error("Couldn't send the frame: {0}")]
    SendError(String),

    #[error("The outbound channel has reached its capacity.")]
    ChannelIsFull,

    #[error("The transport link is closed.")]
    LinkClosed,

    #[error("The bus has been destroyed.")]
    Destroyed,

    #[error("A signal bus is already installed for this process.")]
    AlreadyInstalled,

    #[error("Process-wide state is unavailable: {0}")]
    Poisoned(String),

    #[cfg(feature = "websocket")]
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("Connection attempt timed out after {0:?}")]
    ConnectTimeout(std::time::Duration),
}

impl<T> From<SendError<T>> for Error {
    fn from(e: SendError<T>) -> Self {
        Error::SendError(e.to_string())
    }
}

impl<T> From<TrySendError<T>> for Error {
    fn from(e: TrySendError<T>) -> Self {
        match e {
            TrySendError::Full(_) => Error::ChannelIsFull,
            TrySendError::Closed(_) => Error::LinkClosed,
        }
    }
}

impl<T> From<std::sync::PoisonError<T>> for Error {
    fn from(e: std::sync::PoisonError<T>) -> Self {
        Error::Poisoned(e.to_string())
    }
}
