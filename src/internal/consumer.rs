use std::panic::{AssertUnwindSafe, catch_unwind};

use uuid::Uuid;

use crate::{EventReceiver, GlobalEvent, Result};

/// Runs a handler for each locally delivered event.
pub(crate) struct Consumer<F> {
    bus_id: Uuid,
    receiver: EventReceiver,
    handler: F,
}

impl<F> Consumer<F>
where
    F: FnMut(GlobalEvent) -> Result + Send + 'static,
{
    pub fn new(bus_id: Uuid, receiver: EventReceiver, handler: F) -> Self {
        Consumer {
            bus_id,
            receiver,
            handler,
        }
    }

    pub async fn run(mut self) {
        while let Some(event) = self.receiver.recv().await {
            let kind = event.event;
            let handler = &mut self.handler;
            match catch_unwind(AssertUnwindSafe(|| handler(event))) {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    tracing::error!(bus_id = %self.bus_id, event = %kind, error = %e, "Event handler failed");
                }
                Err(_) => {
                    tracing::error!(bus_id = %self.bus_id, event = %kind, "Event handler panicked");
                }
            }
        }
        tracing::debug!(bus_id = %self.bus_id, "Event consumer stopped");
    }
}
