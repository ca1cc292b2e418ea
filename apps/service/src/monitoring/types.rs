use chrono::{DateTime, Local, Timelike};
use std::fmt;

use crate::database::EndpointEntry;

/// Timestamp layout used in notification bodies (second resolution)
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Last observed reachability of an endpoint within one monitoring session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReachabilityState {
    /// Not probed yet in this session
    #[default]
    Unknown,
    Reachable,
    Unreachable,
}

impl ReachabilityState {
    /// Whether an observation is a change from this state.
    ///
    /// `Unknown` differs from both outcomes, so the first probe of a
    /// session always reports.
    pub fn differs_from(self, observed: bool) -> bool {
        self != Self::from(observed)
    }
}

impl From<bool> for ReachabilityState {
    fn from(reachable: bool) -> Self {
        if reachable { Self::Reachable } else { Self::Unreachable }
    }
}

impl fmt::Display for ReachabilityState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReachabilityState::Unknown => write!(f, "unknown"),
            ReachabilityState::Reachable => write!(f, "connected"),
            ReachabilityState::Unreachable => write!(f, "disconnected"),
        }
    }
}

/// A change in reachability, built at the moment it is observed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationEvent {
    pub timestamp: DateTime<Local>,
    pub identifier: String,
    pub label: String,
    pub reachable: bool,
}

impl NotificationEvent {
    pub fn new(entry: &EndpointEntry, reachable: bool, timestamp: DateTime<Local>) -> Self {
        Self {
            timestamp,
            identifier: entry.identifier.clone(),
            label: entry.label.clone(),
            reachable,
        }
    }

    pub fn status_word(&self) -> &'static str {
        if self.reachable { "CONNECTED" } else { "DISCONNECTED" }
    }

    /// `"<label> (<identifier>) Status Change"`
    pub fn subject(&self) -> String {
        format!("{} ({}) Status Change", self.label, self.identifier)
    }

    /// `"<timestamp> - <identifier> (<label>) is CONNECTED|DISCONNECTED"`
    pub fn body(&self) -> String {
        format!(
            "{} - {} ({}) is {}",
            self.timestamp.format(TIMESTAMP_FORMAT),
            self.identifier,
            self.label,
            self.status_word()
        )
    }
}

/// Source of wall-clock time for notification timestamps
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Local>;
}

/// Local system time truncated to whole seconds
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        let now = Local::now();
        now.with_nanosecond(0).unwrap_or(now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn event(reachable: bool) -> NotificationEvent {
        let timestamp = Local.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap();
        NotificationEvent::new(&EndpointEntry::new("10.0.0.1", "gateway"), reachable, timestamp)
    }

    #[test]
    fn unknown_differs_from_both_outcomes() {
        assert!(ReachabilityState::Unknown.differs_from(true));
        assert!(ReachabilityState::Unknown.differs_from(false));
        assert!(!ReachabilityState::Reachable.differs_from(true));
        assert!(ReachabilityState::Reachable.differs_from(false));
        assert!(!ReachabilityState::Unreachable.differs_from(false));
    }

    #[test]
    fn renders_connected_message() {
        let event = event(true);
        assert_eq!(event.body(), "2024-03-09 14:05:07 - 10.0.0.1 (gateway) is CONNECTED");
        assert_eq!(event.subject(), "gateway (10.0.0.1) Status Change");
    }

    #[test]
    fn renders_disconnected_message() {
        assert_eq!(event(false).body(), "2024-03-09 14:05:07 - 10.0.0.1 (gateway) is DISCONNECTED");
    }

    #[test]
    fn system_clock_has_second_resolution() {
        assert_eq!(SystemClock.now().timestamp_subsec_nanos(), 0);
    }
}
