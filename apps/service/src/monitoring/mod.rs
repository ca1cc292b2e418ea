/// Monitoring engine module - reachability probing and status tracking
///
/// This module is responsible for:
/// - Probing endpoints through the platform ping utility
/// - Tracking the last observed state of every endpoint
/// - Running the sequential probe cycle and emitting status changes
pub mod checker;
pub mod executor;
pub mod scheduler;
pub mod types;

#[cfg(test)]
pub(crate) mod testing;

pub use checker::{PingProber, Prober};
pub use executor::TransitionTracker;
pub use scheduler::{MonitorLoop, MonitorOutcome, MonitorReport};
pub use types::{Clock, NotificationEvent, ReachabilityState, SystemClock};
