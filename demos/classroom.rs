//! Joins a class session on a relay and mirrors what happens in it.
//!
//! ```sh
//! RUST_LOG=session_signal=debug cargo run --example classroom -- ws://localhost:3000/events CLASSA-1
//! ```
use std::{sync::Arc, time::Duration};

use futures_util::{StreamExt, stream};
use session_signal::{
    ClientView, Config, ConnectionState, EventType, GlobalEvent, Lifetime, RecordState, Result,
    SharedCredentials, SharedSession, SignalBus, WsTransport, logging, registry, taxonomy,
};

#[tokio::main]
async fn main() -> Result {
    logging::init();

    let mut args = std::env::args().skip(1);
    let url = args
        .next()
        .unwrap_or_else(|| "ws://localhost:3000/events".to_string());
    let acronym = args.next().unwrap_or_else(|| "CLASSA-1".to_string());

    let config = Config::development().with_connect_timeout(Duration::from_secs(5));
    let credentials = Arc::new(SharedCredentials::authenticated("demo|instructor"));
    let session = Arc::new(SharedSession::new(credentials.clone()));
    session.join(acronym.as_str());

    let transport = WsTransport::new(url, &config);
    let bus = SignalBus::builder(credentials.clone(), session.clone())
        .with_config(config)
        .start(transport);
    registry::install(bus.clone())?;

    bus.on_event(|evt| {
        if taxonomy::is_mute_event(evt.event) {
            println!("{} asked to mute ({})", evt.subject, evt.event);
        } else if taxonomy::is_recording_event(evt.event) {
            let state = evt.target_str().and_then(|s| s.parse::<RecordState>().ok());
            println!("recording: {state:?}");
        } else {
            println!("{evt}");
        }
        Ok(())
    });

    // Commands issued from the instructor's page live as long as the page.
    let page_acronym = acronym.clone();
    let page = stream::iter([
        GlobalEvent::command(EventType::Record).with_target(RecordState::On),
        GlobalEvent::command(EventType::ChangeViewAll).with_target(ClientView::Group),
        GlobalEvent::command(EventType::MuteMicAll).with_subject(session_signal::ANY_SUBJECT),
    ])
    .map(move |evt| evt.with_session(page_acronym.as_str()));

    let connected = tokio::time::timeout(
        Duration::from_secs(10),
        bus.wait_for(ConnectionState::Connected),
    )
    .await;
    match connected {
        Ok(Ok(())) => {
            bus.listen_to(page, Lifetime::Transient);
        }
        _ => eprintln!("relay not reachable, only listening"),
    }

    tokio::time::sleep(Duration::from_secs(30)).await;
    bus.end_transient();
    session.change_view(ClientView::Instructor);
    session.leave();

    if let Some(bus) = registry::teardown() {
        bus.closed().await;
    }
    Ok(())
}
