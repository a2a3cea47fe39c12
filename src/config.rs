//! Session configuration.

use std::borrow::Cow;
use std::time::Duration;

/// Default minimum time that must remain in an idle slice to keep working.
pub const DEFAULT_YIELD_THRESHOLD: Duration = Duration::from_millis(1);

/// Default prefix marking a property as an event listener.
pub const DEFAULT_LISTENER_PREFIX: &str = "on";

/// Tunables for a [`RenderSession`](crate::RenderSession).
///
/// ```ignore
/// let config = SessionConfig::default()
///     .with_yield_threshold(Duration::from_micros(500))
///     .with_listener_prefix("on");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// The work loop yields once the slice has less than this left.
    pub yield_threshold: Duration,
    /// Property names starting with this are listeners, not properties.
    pub listener_prefix: Cow<'static, str>,
}

impl SessionConfig {
    pub fn with_yield_threshold(mut self, threshold: Duration) -> Self {
        self.yield_threshold = threshold;
        self
    }

    pub fn with_listener_prefix(mut self, prefix: impl Into<Cow<'static, str>>) -> Self {
        self.listener_prefix = prefix.into();
        self
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            yield_threshold: DEFAULT_YIELD_THRESHOLD,
            listener_prefix: Cow::Borrowed(DEFAULT_LISTENER_PREFIX),
        }
    }
}
