use async_trait::async_trait;
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{Mailbox, header::ContentType},
    transport::smtp::authentication::Credentials,
};
use std::time::Duration;

use super::{Notifier, NotifyError};
use crate::config::{NotifierConfig, SmtpSecurity};

/// Upper bound for one SMTP conversation
const SMTP_TIMEOUT: Duration = Duration::from_secs(15);

/// Sends plain-text alert mails to a single configured recipient.
///
/// The transport is built up front; the connection is opened lazily for
/// each message.
pub struct SmtpNotifier {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    to: Mailbox,
}

impl SmtpNotifier {
    #[tracing::instrument(
        name = "smtp_notifier_new",
        skip(config),
        fields(host = %config.smtp_host, port = %config.smtp_port, security = ?config.security)
    )]
    pub fn new(config: &NotifierConfig) -> Result<Self, NotifyError> {
        let from: Mailbox = config
            .sender_identity
            .parse()
            .map_err(|e| NotifyError::Address(format!("{}: {e}", config.sender_identity)))?;
        let to: Mailbox = config
            .recipient_identity
            .parse()
            .map_err(|e| NotifyError::Address(format!("{}: {e}", config.recipient_identity)))?;

        let builder = match config.security {
            SmtpSecurity::Tls => AsyncSmtpTransport::<Tokio1Executor>::relay(&config.smtp_host)
                .map_err(|e| NotifyError::Config(e.to_string()))?,
            SmtpSecurity::StartTls => {
                AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)
                    .map_err(|e| NotifyError::Config(e.to_string()))?
            }
            SmtpSecurity::None => AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.smtp_host),
        };

        let mut builder = builder.port(config.smtp_port).timeout(Some(SMTP_TIMEOUT));
        if let Some(secret) = &config.transport_credentials {
            // The sender mailbox doubles as the login name
            let username = from.email.to_string();
            builder = builder.credentials(Credentials::new(username, secret.expose().to_string()));
        }

        tracing::debug!("SMTP notifier initialized");

        Ok(Self { transport: builder.build(), from, to })
    }

    fn message(&self, subject: &str, body: &str) -> Result<Message, NotifyError> {
        Message::builder()
            .from(self.from.clone())
            .to(self.to.clone())
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_string())
            .map_err(|e| NotifyError::Message(e.to_string()))
    }
}

#[async_trait]
impl Notifier for SmtpNotifier {
    #[tracing::instrument(name = "smtp_notify", skip(self, body), fields(to = %self.to, subject = %subject))]
    async fn notify(&self, subject: &str, body: &str) -> Result<(), NotifyError> {
        let message = self.message(subject, body)?;
        self.transport.send(message).await.map_err(|e| NotifyError::Send(e.to_string()))?;
        tracing::info!("Email sent successfully");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Secret;

    fn config() -> NotifierConfig {
        NotifierConfig {
            sender_identity: "alerts@example.com".to_string(),
            recipient_identity: "Ops <ops@example.com>".to_string(),
            transport_credentials: Some(Secret::new("app-password")),
            smtp_host: "smtp.example.com".to_string(),
            smtp_port: 465,
            security: SmtpSecurity::Tls,
        }
    }

    #[test]
    fn builds_from_valid_config() {
        assert!(SmtpNotifier::new(&config()).is_ok());
    }

    #[test]
    fn builds_without_tls_or_credentials() {
        let config = NotifierConfig {
            transport_credentials: None,
            security: SmtpSecurity::None,
            smtp_port: 25,
            ..config()
        };
        assert!(SmtpNotifier::new(&config).is_ok());
    }

    #[test]
    fn rejects_invalid_sender() {
        let config = NotifierConfig { sender_identity: "not-an-address".to_string(), ..config() };
        assert!(matches!(SmtpNotifier::new(&config), Err(NotifyError::Address(_))));
    }

    #[test]
    fn rejects_invalid_recipient() {
        let config = NotifierConfig { recipient_identity: "ops@".to_string(), ..config() };
        assert!(matches!(SmtpNotifier::new(&config), Err(NotifyError::Address(_))));
    }

    #[test]
    fn message_is_plain_text_with_subject() {
        let notifier = SmtpNotifier::new(&config()).unwrap();
        let message = notifier
            .message("gateway (10.0.0.1) Status Change", "2024-03-09 14:05:07 - 10.0.0.1 (gateway) is CONNECTED")
            .unwrap();
        let raw = String::from_utf8(message.formatted()).unwrap();
        assert!(raw.contains("Subject: gateway (10.0.0.1) Status Change"));
        assert!(raw.contains("Content-Type: text/plain"));
        assert!(raw.contains("is CONNECTED"));
    }
}
