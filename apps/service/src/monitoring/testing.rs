//! Scripted collaborators for monitor loop tests.

use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, Local, TimeZone};
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio_util::sync::CancellationToken;

use super::checker::Prober;
use super::types::Clock;
use crate::notify::{Notifier, NotifyError};

/// Replays a fixed sequence of outcomes per identifier.
///
/// A probe requested after every script is drained cancels `stop` instead,
/// so a loop under test ends right after the last scripted outcome.
pub struct ScriptedProber {
    scripts: Mutex<HashMap<String, VecDeque<bool>>>,
    calls: AtomicUsize,
    stop: CancellationToken,
}

impl ScriptedProber {
    pub fn new(stop: CancellationToken) -> Self {
        Self { scripts: Mutex::new(HashMap::new()), calls: AtomicUsize::new(0), stop }
    }

    pub fn script(self, identifier: &str, outcomes: &[bool]) -> Self {
        self.scripts
            .lock()
            .unwrap()
            .insert(identifier.to_string(), outcomes.iter().copied().collect());
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Prober for ScriptedProber {
    async fn probe(&self, identifier: &str) -> bool {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut scripts = self.scripts.lock().unwrap();
        if scripts.values().all(VecDeque::is_empty) {
            self.stop.cancel();
            return false;
        }
        scripts.get_mut(identifier).and_then(VecDeque::pop_front).unwrap_or(false)
    }
}

/// Records every delivery attempt, optionally failing all of them
#[derive(Default)]
pub struct RecordingNotifier {
    fail: bool,
    attempts: Mutex<Vec<(String, String)>>,
}

impl RecordingNotifier {
    pub fn failing() -> Self {
        Self { fail: true, ..Self::default() }
    }

    pub fn attempts(&self) -> Vec<(String, String)> {
        self.attempts.lock().unwrap().clone()
    }

    pub fn bodies(&self) -> Vec<String> {
        self.attempts().into_iter().map(|(_, body)| body).collect()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, subject: &str, body: &str) -> Result<(), NotifyError> {
        self.attempts.lock().unwrap().push((subject.to_string(), body.to_string()));
        if self.fail {
            Err(NotifyError::Send("connection refused".to_string()))
        } else {
            Ok(())
        }
    }
}

/// Clock advancing one second per reading
pub struct SteppingClock {
    start: DateTime<Local>,
    ticks: AtomicUsize,
}

impl Default for SteppingClock {
    fn default() -> Self {
        let start = Local.with_ymd_and_hms(2024, 3, 9, 14, 5, 0).unwrap();
        Self { start, ticks: AtomicUsize::new(0) }
    }
}

impl Clock for SteppingClock {
    fn now(&self) -> DateTime<Local> {
        let tick = self.ticks.fetch_add(1, Ordering::SeqCst) as i64;
        self.start + ChronoDuration::seconds(tick)
    }
}
