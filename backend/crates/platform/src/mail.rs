//! Outbound Email Channel
//!
//! [`Mailer`] accepts a recipient, subject and body and reports delivery
//! failure synchronously. Two transports are provided:
//! - [`SmtpMailer`] - `lettre` async SMTP (STARTTLS relay)
//! - [`LogMailer`] - writes the message to the log (development)
//!
//! [`AppMailer`] picks one of them from [`EmailConfig`].

use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use thiserror::Error;

/// Default SMTP port (STARTTLS)
const DEFAULT_SMTP_PORT: u16 = 587;

/// Default sender when `SMTP_FROM` is not set
const DEFAULT_FROM_ADDRESS: &str = "noreply@reviews.local";

// ============================================================================
// Types
// ============================================================================

/// Mail delivery errors
#[derive(Debug, Error)]
pub enum MailError {
    #[error("SMTP transport error: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),

    #[error("Email address parse error: {0}")]
    Address(#[from] lettre::address::AddressError),

    #[error("Email build error: {0}")]
    Build(String),
}

/// A single plain-text message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMail {
    pub to: String,
    pub subject: String,
    pub body: String,
}

impl OutgoingMail {
    pub fn new(to: impl Into<String>, subject: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            to: to.into(),
            subject: subject.into(),
            body: body.into(),
        }
    }
}

/// Email delivery channel
#[trait_variant::make(Mailer: Send)]
pub trait LocalMailer {
    /// Deliver one message; returns only after the transport accepted it
    async fn send(&self, mail: &OutgoingMail) -> Result<(), MailError>;
}

// ============================================================================
// Configuration
// ============================================================================

/// SMTP configuration
#[derive(Debug, Clone)]
pub struct EmailConfig {
    /// `None` selects the log transport
    pub smtp_host: Option<String>,
    pub smtp_port: u16,
    pub from_address: String,
    pub smtp_user: Option<String>,
    pub smtp_password: Option<String>,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            smtp_host: None,
            smtp_port: DEFAULT_SMTP_PORT,
            from_address: DEFAULT_FROM_ADDRESS.to_string(),
            smtp_user: None,
            smtp_password: None,
        }
    }
}

impl EmailConfig {
    /// Load from environment variables
    ///
    /// | Variable        | Default                 |
    /// |-----------------|-------------------------|
    /// | `SMTP_HOST`     | unset (log transport)   |
    /// | `SMTP_PORT`     | `587`                   |
    /// | `SMTP_FROM`     | `noreply@reviews.local` |
    /// | `SMTP_USER`     | unset                   |
    /// | `SMTP_PASSWORD` | unset                   |
    pub fn from_env() -> Self {
        Self {
            smtp_host: std::env::var("SMTP_HOST").ok().filter(|h| !h.is_empty()),
            smtp_port: std::env::var("SMTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(DEFAULT_SMTP_PORT),
            from_address: std::env::var("SMTP_FROM")
                .unwrap_or_else(|_| DEFAULT_FROM_ADDRESS.to_string()),
            smtp_user: std::env::var("SMTP_USER").ok(),
            smtp_password: std::env::var("SMTP_PASSWORD").ok(),
        }
    }
}

// ============================================================================
// SMTP transport
// ============================================================================

/// `lettre` SMTP mailer
#[derive(Clone)]
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from_address: String,
}

impl SmtpMailer {
    pub fn new(host: &str, config: &EmailConfig) -> Result<Self, MailError> {
        let mut builder =
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)?.port(config.smtp_port);

        if let (Some(user), Some(pass)) = (&config.smtp_user, &config.smtp_password) {
            builder = builder.credentials(Credentials::new(user.clone(), pass.clone()));
        }

        Ok(Self {
            transport: builder.build(),
            from_address: config.from_address.clone(),
        })
    }
}

impl Mailer for SmtpMailer {
    async fn send(&self, mail: &OutgoingMail) -> Result<(), MailError> {
        let message = Message::builder()
            .from(self.from_address.parse()?)
            .to(mail.to.parse()?)
            .subject(mail.subject.clone())
            .header(ContentType::TEXT_PLAIN)
            .body(mail.body.clone())
            .map_err(|e| MailError::Build(e.to_string()))?;

        self.transport.send(message).await?;

        tracing::info!(to = %mail.to, subject = %mail.subject, "Email sent");
        Ok(())
    }
}

// ============================================================================
// Log transport
// ============================================================================

/// Writes messages to the log instead of sending them
#[derive(Debug, Clone, Default)]
pub struct LogMailer;

impl Mailer for LogMailer {
    async fn send(&self, mail: &OutgoingMail) -> Result<(), MailError> {
        tracing::info!(
            to = %mail.to,
            subject = %mail.subject,
            body = %mail.body,
            "Email (log transport)"
        );
        Ok(())
    }
}

// ============================================================================
// Runtime selection
// ============================================================================

/// Transport chosen at startup
#[derive(Clone)]
pub enum AppMailer {
    Smtp(SmtpMailer),
    Log(LogMailer),
}

impl AppMailer {
    pub fn from_config(config: &EmailConfig) -> Result<Self, MailError> {
        match &config.smtp_host {
            Some(host) => Ok(Self::Smtp(SmtpMailer::new(host, config)?)),
            None => {
                tracing::warn!("SMTP_HOST not set, emails will only be logged");
                Ok(Self::Log(LogMailer))
            }
        }
    }
}

impl Mailer for AppMailer {
    async fn send(&self, mail: &OutgoingMail) -> Result<(), MailError> {
        match self {
            Self::Smtp(m) => Mailer::send(m, mail).await,
            Self::Log(m) => Mailer::send(m, mail).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_uses_log_transport() {
        let config = EmailConfig::default();
        assert!(config.smtp_host.is_none());
        assert!(matches!(AppMailer::from_config(&config), Ok(AppMailer::Log(_))));
    }

    #[tokio::test]
    async fn test_log_mailer_accepts_message() {
        let mail = OutgoingMail::new("user@example.com", "Hello", "Body");
        assert!(Mailer::send(&LogMailer, &mail).await.is_ok());
    }

    #[test]
    fn test_mail_error_display() {
        let err = MailError::Build("missing body".to_string());
        assert_eq!(err.to_string(), "Email build error: missing body");
    }
}
