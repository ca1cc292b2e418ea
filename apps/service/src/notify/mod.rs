//! Delivery of status change alerts.
//!
//! The monitor loop only sees the [`Notifier`] trait. Mail goes out through
//! [`SmtpNotifier`] when a `[notifier]` section is configured, otherwise
//! alerts are written to the log by [`LogNotifier`].

pub mod smtp;

pub use smtp::SmtpNotifier;

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

use crate::config::NotifierConfig;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("invalid email address: {0}")]
    Address(String),

    #[error("invalid transport configuration: {0}")]
    Config(String),

    #[error("failed to build message: {0}")]
    Message(String),

    #[error("send failed: {0}")]
    Send(String),
}

/// Delivers a human-readable alert
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, subject: &str, body: &str) -> Result<(), NotifyError>;
}

/// Notifier used when no mail transport is configured
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, subject: &str, body: &str) -> Result<(), NotifyError> {
        info!(subject = %subject, "{}", body);
        Ok(())
    }
}

/// Build the notifier described by the configuration
pub fn from_config(config: Option<&NotifierConfig>) -> Result<Arc<dyn Notifier>, NotifyError> {
    match config {
        Some(config) => Ok(Arc::new(SmtpNotifier::new(config)?)),
        None => {
            warn!("No [notifier] section configured, status changes will only be logged");
            Ok(Arc::new(LogNotifier))
        }
    }
}
