//! Session signaling bus for live video classes.
//!
//! Participants and instructors exchange small control messages (mute all,
//! navigate everyone, recording on/off, raise a hand, who joined) through a
//! relay. The [`SignalBus`] is the client endpoint: it sends [`GlobalEvent`]s
//! over a [`Transport`], gates inbound ones on authentication, and fans
//! everything out to local subscribers.
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use session_signal::{
//!     Config, EventType, GlobalEvent, Lifetime, SharedCredentials, SharedSession, SignalBus,
//!     WsTransport,
//! };
//!
//! # async fn run() -> session_signal::Result {
//! let config = Config::production();
//! let credentials = Arc::new(SharedCredentials::authenticated("auth0|42"));
//! let session = Arc::new(SharedSession::new(credentials.clone()));
//! session.join("CLASSA-1");
//!
//! let transport = WsTransport::new("wss://relay.example.com/events", &config);
//! let bus = SignalBus::builder(credentials, session)
//!     .with_config(config)
//!     .start(transport);
//!
//! bus.on_event(|evt| {
//!     if evt.event == EventType::MuteMicAll {
//!         println!("muting mic");
//!     }
//!     Ok(())
//! });
//! bus.publish(GlobalEvent::command(EventType::HelpWanted).with_session("CLASSA-1"));
//!
//! bus.destroy();
//! bus.closed().await;
//! # Ok(())
//! # }
//! ```

extern crate self as session_signal;

mod bus;
mod code;
mod config;
mod error;
mod event;
mod label;
mod lifetime;
mod monitor;
mod provider;
mod receiver;
mod target;

pub(crate) mod internal;

pub mod registry;
pub mod taxonomy;
pub mod transport;

#[cfg(feature = "logging")]
pub mod logging;

pub use bus::{ConnectionState, SignalBus, SignalBusBuilder};
pub use code::Coded;
pub use config::{Config, Environment};
pub use error::Error;
pub use event::{
    ANY_SESSION, ANY_SUBJECT, ANY_TARGET, EventClass, EventType, FriendlyEvent, GlobalEvent,
    NO_SESSION, NO_STREAM, NO_SUBJECT, NO_TARGET, SERVER,
};
pub use label::Label;
pub use lifetime::{Lifetime, Lifetimes};
pub use monitor::{ConnectivitySignal, DropReason, Monitor};
pub use provider::{
    CredentialProvider, EventStream, SessionStateProvider, SharedCredentials, SharedSession,
};
pub use receiver::EventReceiver;
pub use session_signal_macros::{Coded, Label};
pub use target::{ClientView, MusicAction, ParseTargetError, RecordState};
pub use taxonomy::EventGroup;
pub use transport::{Link, MemoryRemote, MemoryTransport, Transport, TransportEvent};
#[cfg(feature = "websocket")]
pub use transport::WsTransport;

pub type Result<T = ()> = std::result::Result<T, Error>;

pub mod prelude {
    pub use crate::bus::{ConnectionState, SignalBus};
    pub use crate::error::Error as SignalError;
    pub use crate::event::{EventClass, EventType, GlobalEvent};
    pub use crate::lifetime::Lifetime;
    pub use crate::provider::{CredentialProvider, SessionStateProvider};
    pub use crate::transport::Transport;
}
