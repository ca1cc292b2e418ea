use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::checker::Prober;
use super::executor::TransitionTracker;
use super::types::{Clock, NotificationEvent, SystemClock};
use crate::database::EndpointEntry;
use crate::notify::Notifier;

/// Counters for one monitoring session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MonitorReport {
    /// Fully completed probe cycles
    pub cycles: u64,
    pub probes: u64,
    pub notifications: u64,
    pub failed_notifications: u64,
}

/// How a monitoring session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorOutcome {
    /// Nothing to monitor, the loop never started
    NoEntries,
    /// The session ran until cancelled
    Stopped(MonitorReport),
}

/// Sequential probe loop - probes every endpoint in stored order, reports
/// changes, then sleeps for the configured interval
pub struct MonitorLoop {
    prober: Arc<dyn Prober>,
    notifier: Arc<dyn Notifier>,
    clock: Arc<dyn Clock>,
    interval: Duration,
}

impl MonitorLoop {
    pub fn new(prober: Arc<dyn Prober>, notifier: Arc<dyn Notifier>, interval: Duration) -> Self {
        Self { prober, notifier, clock: Arc::new(SystemClock), interval }
    }

    /// Replace the wall clock used for notification timestamps
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Run until `cancel` fires
    pub async fn run(&self, entries: &[EndpointEntry], cancel: &CancellationToken) -> MonitorOutcome {
        self.run_with(entries, cancel, |_| {}).await
    }

    /// Run until `cancel` fires, handing every status change to `on_change`
    /// before it is delivered.
    ///
    /// Cancellation is checked before and after each probe and raced
    /// against the inter-cycle sleep. A probe that completes after
    /// cancellation is discarded without notifying.
    pub async fn run_with<F>(
        &self,
        entries: &[EndpointEntry],
        cancel: &CancellationToken,
        mut on_change: F,
    ) -> MonitorOutcome
    where
        F: FnMut(&NotificationEvent),
    {
        if entries.is_empty() {
            info!("No entries to monitor");
            return MonitorOutcome::NoEntries;
        }

        info!(
            endpoints = entries.len(),
            interval_secs = self.interval.as_secs_f64(),
            "Starting monitoring"
        );

        let mut tracker = TransitionTracker::new(entries);
        let mut report = MonitorReport::default();

        'session: loop {
            for entry in entries {
                if cancel.is_cancelled() {
                    break 'session;
                }

                let observed = self.prober.probe(&entry.identifier).await;
                if cancel.is_cancelled() {
                    debug!(ip = %entry.identifier, "Discarding probe result after cancellation");
                    break 'session;
                }
                report.probes += 1;

                let Some(event) = tracker.observe(entry, observed, self.clock.now()) else {
                    continue;
                };

                if event.reachable {
                    info!(ip = %event.identifier, machine = %event.label, "Endpoint connected");
                } else {
                    warn!(ip = %event.identifier, machine = %event.label, "Endpoint disconnected");
                }
                on_change(&event);

                report.notifications += 1;
                if let Err(e) = self.notifier.notify(&event.subject(), &event.body()).await {
                    report.failed_notifications += 1;
                    error!(ip = %event.identifier, "Failed to send notification: {}", e);
                }
            }

            report.cycles += 1;
            debug!(cycle = report.cycles, probes = report.probes, "Cycle completed");

            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(self.interval) => {}
            }
        }

        info!(
            cycles = report.cycles,
            notifications = report.notifications,
            failed = report.failed_notifications,
            "Monitoring stopped"
        );
        MonitorOutcome::Stopped(report)
    }
}
