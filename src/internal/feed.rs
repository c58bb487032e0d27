use std::sync::Arc;

use futures_util::{StreamExt, stream::BoxStream};
use tokio::select;
use tokio_util::sync::CancellationToken;

use crate::{GlobalEvent, Lifetime, bus::Core};

/// A registered event source relayed through the bus until its lifetime ends.
pub(crate) struct Feed {
    core: Arc<Core>,
    source: BoxStream<'static, GlobalEvent>,
    lifetime: Lifetime,
    cancel: CancellationToken,
}

impl Feed {
    pub fn new(
        core: Arc<Core>,
        source: BoxStream<'static, GlobalEvent>,
        lifetime: Lifetime,
        cancel: CancellationToken,
    ) -> Self {
        Feed {
            core,
            source,
            lifetime,
            cancel,
        }
    }

    pub async fn run(mut self) {
        let mut relayed = 0usize;
        loop {
            select! {
                biased;
                _ = self.cancel.cancelled() => break,
                _ = self.core.shutdown.cancelled() => break,
                item = self.source.next() => match item {
                    Some(event) => {
                        self.core.publish(event);
                        relayed += 1;
                    }
                    None => break,
                },
            }
        }
        tracing::debug!(bus_id = %self.core.id, lifetime = %self.lifetime, relayed, "Feed ended");
    }
}
