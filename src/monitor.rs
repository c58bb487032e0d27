use std::{
    fmt,
    panic::{AssertUnwindSafe, catch_unwind},
    sync::Arc,
};

use crate::GlobalEvent;

/// Connectivity changes reported to monitors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConnectivitySignal {
    Restored,
    Lost,
}

impl ConnectivitySignal {
    /// Gauge value for analytics sinks: 1 when connected, 0 when not.
    pub fn value(&self) -> u8 {
        match self {
            ConnectivitySignal::Restored => 1,
            ConnectivitySignal::Lost => 0,
        }
    }
}

/// Why the bus refused to deliver an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DropReason {
    /// The event has no target.
    MissingTarget,
    /// The event arrived while the user wasn't authenticated.
    Unauthenticated,
    /// The bus was not connected, so the frame never reached the transport.
    NotConnected,
    /// The outbound channel was full or closed.
    Backpressure,
    /// The frame could not be decoded.
    Malformed,
}

impl fmt::Display for DropReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DropReason::MissingTarget => write!(f, "missing target"),
            DropReason::Unauthenticated => write!(f, "unauthenticated"),
            DropReason::NotConnected => write!(f, "not connected"),
            DropReason::Backpressure => write!(f, "backpressure"),
            DropReason::Malformed => write!(f, "malformed"),
        }
    }
}

/// Observer of bus activity, e.g. an analytics or metrics adapter.
///
/// All methods default to no-ops. They are called inline on the relay path,
/// so keep them cheap. A panicking monitor is caught and logged.
pub trait Monitor: Send + Sync {
    fn on_connectivity(&self, signal: ConnectivitySignal) {
        let _s = signal;
    }

    fn on_event_sent(&self, event: &GlobalEvent) {
        let _e = event;
    }

    fn on_event_received(&self, event: &GlobalEvent) {
        let _e = event;
    }

    fn on_event_dropped(&self, event: Option<&GlobalEvent>, reason: DropReason) {
        let _e = event;
        let _r = reason;
    }
}

#[derive(Clone, Default)]
pub(crate) struct Monitors {
    monitors: Vec<Arc<dyn Monitor>>,
}

impl Monitors {
    pub fn push(&mut self, monitor: Arc<dyn Monitor>) {
        self.monitors.push(monitor);
    }

    pub fn notify(&self, f: impl Fn(&dyn Monitor)) {
        for (id, monitor) in self.monitors.iter().enumerate() {
            let result = catch_unwind(AssertUnwindSafe(|| f(monitor.as_ref())));
            if result.is_err() {
                tracing::error!(monitor_id = id, "Monitor panicked");
            }
        }
    }
}

impl fmt::Debug for Monitors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Monitors")
            .field("len", &self.monitors.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    struct Panicking;
    impl Monitor for Panicking {
        fn on_connectivity(&self, _signal: ConnectivitySignal) {
            panic!("boom");
        }
    }

    #[derive(Default)]
    struct Counting(AtomicUsize);
    impl Monitor for Counting {
        fn on_connectivity(&self, _signal: ConnectivitySignal) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_panicking_monitor_does_not_stop_others() {
        let counting = Arc::new(Counting::default());
        let mut monitors = Monitors::default();
        monitors.push(Arc::new(Panicking));
        monitors.push(counting.clone());

        monitors.notify(|m| m.on_connectivity(ConnectivitySignal::Lost));
        monitors.notify(|m| m.on_connectivity(ConnectivitySignal::Restored));
        assert_eq!(counting.0.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_signal_values() {
        assert_eq!(ConnectivitySignal::Restored.value(), 1);
        assert_eq!(ConnectivitySignal::Lost.value(), 0);
    }
}
