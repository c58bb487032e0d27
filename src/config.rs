use std::time::Duration;

/// Deployment flavour, used to pick connection timeouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    Production,
    #[default]
    Development,
}

/// Runtime configuration for the signal bus and its transports.
///
/// Use the builder methods to customize, [`Config::production`] or
/// [`Config::development`] for presets, or [`Default`] (development).
///
/// # Examples
///
/// ```rust
/// use std::time::Duration;
/// use session_signal::Config;
///
/// let config = Config::production()
///     .with_inbound_capacity(512)
///     .with_reconnect_delay(Duration::from_millis(250));
/// assert_eq!(config.connect_timeout, Duration::from_secs(40));
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    pub environment: Environment,

    /// How long a single connection attempt may take before the transport
    /// gives up and schedules a retry.
    /// Default: 40 s in production, 120 s in development.
    pub connect_timeout: Duration,

    /// Initial wait between reconnection attempts. Doubles after each failed
    /// attempt up to `max_reconnect_delay`.
    /// Default: 500 ms
    pub reconnect_delay: Duration,

    /// Upper bound for the reconnection backoff.
    /// Default: 10 s
    pub max_reconnect_delay: Duration,

    /// Size of the outbound frame channel between the bus and the transport.
    /// Frames that don't fit are dropped, never awaited.
    /// Default: 128
    pub channel_size: usize,

    /// Number of events buffered per local subscriber before a slow
    /// subscriber starts skipping events.
    /// Default: 256
    pub inbound_capacity: usize,

    /// Answer relay heartbeats with a `HeartbeatReply`.
    /// Default: true
    pub reply_to_heartbeats: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config::for_environment(Environment::default())
    }
}

impl Config {
    pub fn for_environment(environment: Environment) -> Self {
        let connect_timeout = match environment {
            Environment::Production => Duration::from_secs(40),
            Environment::Development => Duration::from_secs(120),
        };
        Config {
            environment,
            connect_timeout,
            reconnect_delay: Duration::from_millis(500),
            max_reconnect_delay: Duration::from_secs(10),
            channel_size: 128,
            inbound_capacity: 256,
            reply_to_heartbeats: true,
        }
    }

    pub fn production() -> Self {
        Config::for_environment(Environment::Production)
    }

    pub fn development() -> Self {
        Config::for_environment(Environment::Development)
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn with_reconnect_delay(mut self, delay: Duration) -> Self {
        self.reconnect_delay = delay;
        self
    }

    pub fn with_max_reconnect_delay(mut self, delay: Duration) -> Self {
        self.max_reconnect_delay = delay;
        self
    }

    /// Set the outbound channel size.
    ///
    /// `publish` never waits for capacity: when the channel is full the frame
    /// is dropped and logged.
    pub fn with_channel_size(mut self, size: usize) -> Self {
        self.channel_size = size;
        self
    }

    /// Set how many events each local subscriber may fall behind.
    pub fn with_inbound_capacity(mut self, capacity: usize) -> Self {
        self.inbound_capacity = capacity;
        self
    }

    pub fn with_heartbeat_replies(mut self, enabled: bool) -> Self {
        self.reply_to_heartbeats = enabled;
        self
    }

    /// Backoff to wait after `attempt` consecutive failed connection attempts.
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 1u32.checked_shl(attempt.min(16)).unwrap_or(u32::MAX);
        self.reconnect_delay
            .saturating_mul(factor)
            .min(self.max_reconnect_delay)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_environment_timeouts() {
        assert_eq!(Config::production().connect_timeout, Duration::from_secs(40));
        assert_eq!(
            Config::development().connect_timeout,
            Duration::from_secs(120)
        );
        assert_eq!(Config::default().environment, Environment::Development);
    }

    #[test]
    fn test_backoff_is_capped() {
        let config = Config::default()
            .with_reconnect_delay(Duration::from_millis(100))
            .with_max_reconnect_delay(Duration::from_secs(1));
        assert_eq!(config.backoff(0), Duration::from_millis(100));
        assert_eq!(config.backoff(1), Duration::from_millis(200));
        assert_eq!(config.backoff(3), Duration::from_millis(800));
        assert_eq!(config.backoff(4), Duration::from_secs(1));
        assert_eq!(config.backoff(100), Duration::from_secs(1));
    }
}
