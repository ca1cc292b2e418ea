use chrono::{DateTime, Local};
use std::collections::HashMap;

use super::types::{NotificationEvent, ReachabilityState};
use crate::database::EndpointEntry;

/// Last known reachability per endpoint for one monitoring session
#[derive(Debug, Default)]
pub struct TransitionTracker {
    states: HashMap<String, ReachabilityState>,
}

impl TransitionTracker {
    /// Start a session with every endpoint in the `Unknown` state
    pub fn new(entries: &[EndpointEntry]) -> Self {
        let states = entries
            .iter()
            .map(|entry| (entry.identifier.clone(), ReachabilityState::Unknown))
            .collect();
        Self { states }
    }

    pub fn state(&self, identifier: &str) -> ReachabilityState {
        self.states.get(identifier).copied().unwrap_or_default()
    }

    /// Record a probe outcome.
    ///
    /// Returns the event to deliver when the outcome differs from the
    /// recorded state. The new state is recorded before the event is handed
    /// out, so a failed delivery is never retried on the next cycle.
    pub fn observe(
        &mut self,
        entry: &EndpointEntry,
        observed: bool,
        now: DateTime<Local>,
    ) -> Option<NotificationEvent> {
        let state = self.states.entry(entry.identifier.clone()).or_default();
        if !state.differs_from(observed) {
            return None;
        }

        *state = ReachabilityState::from(observed);
        Some(NotificationEvent::new(entry, observed, now))
    }
}
