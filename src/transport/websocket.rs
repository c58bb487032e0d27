use futures_util::{
    SinkExt, StreamExt,
    stream::{SplitSink, SplitStream},
};
use tokio::{
    net::TcpStream,
    select,
    sync::mpsc::{self, Receiver, Sender},
    time::{sleep, timeout},
};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async, tungstenite::Message};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use super::{Link, Transport, TransportEvent};
use crate::{Config, Error};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// WebSocket client transport with automatic reconnection.
///
/// Each connection attempt is bounded by [`Config::connect_timeout`]; failed
/// attempts are retried with [`Config::backoff`]. Frames the bus hands over
/// while the socket is down are discarded when the next connection opens.
#[derive(Debug, Clone)]
pub struct WsTransport {
    url: String,
    config: Config,
}

enum Outcome {
    Stopped,
    Lost(Error),
}

impl WsTransport {
    pub fn new(url: impl Into<String>, config: &Config) -> Self {
        Self {
            url: url.into(),
            config: config.clone(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    async fn run(
        self,
        mut outbound: Receiver<String>,
        events: Sender<TransportEvent>,
        cancel: CancellationToken,
    ) {
        let transport_id = Uuid::new_v4();
        let mut attempt = 0u32;

        loop {
            if cancel.is_cancelled() || events.is_closed() {
                break;
            }

            let connecting = timeout(self.config.connect_timeout, connect_async(self.url.as_str()));
            let result = select! {
                _ = cancel.cancelled() => break,
                result = connecting => result,
            };

            match result {
                Ok(Ok((stream, _response))) => {
                    attempt = 0;
                    tracing::info!(%transport_id, url = %self.url, "WebSocket connected");
                    let stale = discard_queued(&mut outbound);
                    if stale > 0 {
                        tracing::debug!(%transport_id, stale, "Discarded frames queued while disconnected");
                    }
                    if events.send(TransportEvent::Connected).await.is_err() {
                        break;
                    }

                    let (sink, source) = stream.split();
                    let outcome = pump(sink, source, &mut outbound, &events, &cancel).await;
                    let _ = events.send(TransportEvent::Disconnected).await;
                    match outcome {
                        Outcome::Stopped => break,
                        Outcome::Lost(e) => {
                            tracing::warn!(%transport_id, error = %e, "WebSocket connection lost");
                        }
                    }
                }
                Ok(Err(e)) => {
                    tracing::warn!(%transport_id, attempt, error = %Error::from(e), "WebSocket connection failed");
                }
                Err(_) => {
                    let e = Error::ConnectTimeout(self.config.connect_timeout);
                    tracing::warn!(%transport_id, attempt, error = %e, "WebSocket connection failed");
                }
            }

            let delay = self.config.backoff(attempt);
            attempt = attempt.saturating_add(1);
            select! {
                _ = cancel.cancelled() => break,
                _ = sleep(delay) => {}
            }
        }

        tracing::debug!(%transport_id, "WebSocket transport stopped");
    }
}

impl Transport for WsTransport {
    fn open(self, cancel: CancellationToken) -> Link {
        let capacity = self.config.channel_size.max(1);
        let (outbound_tx, outbound_rx) = mpsc::channel(capacity);
        let (events_tx, events_rx) = mpsc::channel(capacity);
        tokio::spawn(self.run(outbound_rx, events_tx, cancel));
        Link {
            outbound: outbound_tx,
            events: events_rx,
        }
    }
}

async fn pump(
    mut sink: SplitSink<WsStream, Message>,
    mut source: SplitStream<WsStream>,
    outbound: &mut Receiver<String>,
    events: &Sender<TransportEvent>,
    cancel: &CancellationToken,
) -> Outcome {
    loop {
        select! {
            _ = cancel.cancelled() => {
                let _ = sink.close().await;
                return Outcome::Stopped;
            }
            frame = outbound.recv() => match frame {
                Some(frame) => {
                    if let Err(e) = sink.send(Message::text(frame)).await {
                        return Outcome::Lost(e.into());
                    }
                }
                None => {
                    let _ = sink.close().await;
                    return Outcome::Stopped;
                }
            },
            message = source.next() => match message {
                Some(Ok(Message::Text(text))) => {
                    if events.send(TransportEvent::Frame(text.as_str().to_owned())).await.is_err() {
                        return Outcome::Stopped;
                    }
                }
                Some(Ok(Message::Binary(bytes))) => match String::from_utf8(bytes.to_vec()) {
                    Ok(text) => {
                        if events.send(TransportEvent::Frame(text)).await.is_err() {
                            return Outcome::Stopped;
                        }
                    }
                    Err(_) => tracing::warn!(len = bytes.len(), "Ignoring non UTF-8 binary frame"),
                },
                Some(Ok(Message::Close(_))) | None => return Outcome::Lost(Error::LinkClosed),
                Some(Ok(_)) => {}
                Some(Err(e)) => return Outcome::Lost(e.into()),
            },
        }
    }
}

fn discard_queued(outbound: &mut Receiver<String>) -> usize {
    let mut count = 0;
    while outbound.try_recv().is_ok() {
        count += 1;
    }
    count
}
