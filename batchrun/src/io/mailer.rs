//! Summary email delivery over SMTP.
//!
//! [`MailTransport`] decouples run orchestration from the wire so tests can
//! script deliveries. The real transport opens one STARTTLS session per send
//! against the fixed relay.

use tracing::{debug, info};

use crate::core::email::{compose_summary, should_notify};
use crate::core::types::{Credentials, EmailStrategy, ScriptOutcome};
use crate::error::RunnerError;

/// SMTP relay used for every summary email.
pub const SMTP_RELAY: &str = "smtp.office365.com";

/// One composed message ready for delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundEmail {
    pub from: String,
    pub recipients: Vec<String>,
    pub subject: String,
    pub body: String,
}

/// Abstraction over the delivery channel.
pub trait MailTransport {
    /// Deliver `email` to every recipient in a single submission.
    fn send(&self, email: &OutboundEmail) -> Result<(), RunnerError>;
}

/// Delivery through `lettre`'s blocking SMTP client with STARTTLS.
pub struct SmtpMailer {
    credentials: Credentials,
}

impl SmtpMailer {
    pub fn new(credentials: Credentials) -> Self {
        Self { credentials }
    }
}

impl MailTransport for SmtpMailer {
    fn send(&self, email: &OutboundEmail) -> Result<(), RunnerError> {
        use lettre::message::header::ContentType;
        use lettre::transport::smtp::authentication::Credentials as SmtpCredentials;
        use lettre::{Message, SmtpTransport, Transport};

        let mut builder = Message::builder()
            .from(email
                .from
                .parse()
                .map_err(|err| delivery_failed(format!("sender {}: {err}", email.from)))?)
            .subject(email.subject.clone())
            .header(ContentType::TEXT_PLAIN);
        for recipient in &email.recipients {
            builder = builder.to(recipient
                .parse()
                .map_err(|err| delivery_failed(format!("recipient {recipient}: {err}")))?);
        }
        let message = builder
            .body(email.body.clone())
            .map_err(delivery_failed)?;

        let mailer = SmtpTransport::starttls_relay(SMTP_RELAY)
            .map_err(delivery_failed)?
            .credentials(SmtpCredentials::new(
                self.credentials.login.clone(),
                self.credentials.password.clone(),
            ))
            .build();
        mailer.send(&message).map_err(delivery_failed)?;
        Ok(())
    }
}

fn delivery_failed(err: impl std::fmt::Display) -> RunnerError {
    RunnerError::NotificationFailed {
        reason: err.to_string(),
    }
}

/// Outcome of the notification step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyOutcome {
    Sent,
    Skipped,
}

/// Everything the notification step needs from a finished batch.
#[derive(Debug, Clone)]
pub struct NotifyRequest<'a> {
    pub project_name: &'a str,
    pub strategy: EmailStrategy,
    pub sender: &'a str,
    pub recipients: &'a [String],
    pub outcomes: &'a [ScriptOutcome],
}

/// Send the summary email when the strategy asks for one.
///
/// Returns [`NotifyOutcome::Skipped`] without touching the transport when no
/// email is due.
pub fn notify_if_needed<T: MailTransport>(
    transport: &T,
    request: &NotifyRequest<'_>,
) -> Result<NotifyOutcome, RunnerError> {
    if !should_notify(request.strategy, request.outcomes) {
        debug!(
            project = request.project_name,
            strategy = %request.strategy,
            "summary email not requested"
        );
        return Ok(NotifyOutcome::Skipped);
    }
    let content = compose_summary(request.project_name, request.outcomes);
    let email = OutboundEmail {
        from: request.sender.to_string(),
        recipients: request.recipients.to_vec(),
        subject: content.subject,
        body: content.body,
    };
    transport.send(&email)?;
    info!(
        project = request.project_name,
        recipients = request.recipients.len(),
        "summary email sent"
    );
    Ok(NotifyOutcome::Sent)
}
