use std::fmt;

use tokio_util::sync::CancellationToken;

/// How long a feed registered with [`SignalBus::listen_to`](crate::SignalBus::listen_to) lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Lifetime {
    /// Lives until the bus is destroyed. Use it for process-wide sources
    /// such as login state or session-state changes.
    Sticky,
    /// Lives until the owning view scope ends. Use it for per-page command
    /// sources that must not outlive their page.
    #[default]
    Transient,
}

impl fmt::Display for Lifetime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Lifetime::Sticky => write!(f, "sticky"),
            Lifetime::Transient => write!(f, "transient"),
        }
    }
}

/// The two cancellation domains feeds are grouped into.
///
/// The tokens are independent: cancelling one never cancels the other.
/// Cancellation is final; a fresh bus is needed to get a live domain back.
#[derive(Debug, Clone, Default)]
pub struct Lifetimes {
    sticky: CancellationToken,
    transient: CancellationToken,
}

impl Lifetimes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Token that fires when the given domain is cancelled.
    pub fn token(&self, lifetime: Lifetime) -> CancellationToken {
        match lifetime {
            Lifetime::Sticky => self.sticky.clone(),
            Lifetime::Transient => self.transient.clone(),
        }
    }

    pub fn cancel(&self, lifetime: Lifetime) {
        if !self.is_cancelled(lifetime) {
            tracing::debug!(%lifetime, "cancelling feeds");
        }
        self.token(lifetime).cancel();
    }

    pub fn is_cancelled(&self, lifetime: Lifetime) -> bool {
        match lifetime {
            Lifetime::Sticky => self.sticky.is_cancelled(),
            Lifetime::Transient => self.transient.is_cancelled(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domains_are_independent() {
        let lifetimes = Lifetimes::new();
        let sticky = lifetimes.token(Lifetime::Sticky);
        let transient = lifetimes.token(Lifetime::Transient);

        lifetimes.cancel(Lifetime::Transient);
        assert!(transient.is_cancelled());
        assert!(!sticky.is_cancelled());
        assert!(!lifetimes.is_cancelled(Lifetime::Sticky));

        let lifetimes = Lifetimes::new();
        lifetimes.cancel(Lifetime::Sticky);
        assert!(lifetimes.is_cancelled(Lifetime::Sticky));
        assert!(!lifetimes.is_cancelled(Lifetime::Transient));
    }

    #[test]
    fn test_cancellation_is_final() {
        let lifetimes = Lifetimes::new();
        lifetimes.cancel(Lifetime::Transient);
        lifetimes.cancel(Lifetime::Transient);
        assert!(lifetimes.token(Lifetime::Transient).is_cancelled());
    }

    #[test]
    fn test_default_lifetime_is_transient() {
        assert_eq!(Lifetime::default(), Lifetime::Transient);
        assert_eq!(Lifetime::Sticky.to_string(), "sticky");
    }
}
