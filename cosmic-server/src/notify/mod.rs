//! Outbound email
//!
//! [`Mailer`] is the delivery seam; [`SmtpMailer`] talks SMTP through
//! lettre and [`DisabledMailer`] stands in when no credentials are
//! configured. [`LeadNotifier`] sends the customer confirmation and admin
//! notification for each new lead. Delivery failures are logged, never
//! returned to the HTTP caller.

pub mod templates;

use crate::leads::{NewBooking, NewContactMessage};
use async_trait::async_trait;
use cosmic_common::config::EmailConfig;
use lettre::message::{header::ContentType, Mailbox};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Implicit-TLS submission port; everything else uses STARTTLS
const SMTPS_PORT: u16 = 465;

#[derive(Debug, Error)]
pub enum MailError {
    #[error("Invalid email address {address}: {reason}")]
    Address { address: String, reason: String },

    #[error("Email build failed: {0}")]
    Build(String),

    #[error("SMTP delivery failed: {0}")]
    Transport(String),

    #[error("Email is not configured")]
    NotConfigured,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OutgoingEmail {
    pub to: String,
    pub subject: String,
    pub html: String,
}

#[async_trait]
pub trait Mailer: Send + Sync {
    fn is_enabled(&self) -> bool;

    async fn send(&self, email: OutgoingEmail) -> Result<(), MailError>;
}

fn parse_mailbox(address: &str) -> Result<Mailbox, MailError> {
    address.parse().map_err(|e: lettre::address::AddressError| MailError::Address {
        address: address.to_string(),
        reason: e.to_string(),
    })
}

pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    pub fn from_config(config: &EmailConfig) -> Result<Self, MailError> {
        let (Some(user), Some(password), Some(from)) = (&config.user, &config.password, &config.from) else {
            return Err(MailError::NotConfigured);
        };

        let builder = if config.port == SMTPS_PORT {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
        }
        .map_err(|e| MailError::Transport(e.to_string()))?;

        let transport = builder
            .port(config.port)
            .credentials(Credentials::new(user.clone(), password.clone()))
            .build();

        info!(host = %config.host, port = config.port, "✓ SMTP mailer configured");
        Ok(Self {
            transport,
            from: parse_mailbox(from)?,
        })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    fn is_enabled(&self) -> bool {
        true
    }

    async fn send(&self, email: OutgoingEmail) -> Result<(), MailError> {
        let message = Message::builder()
            .from(self.from.clone())
            .to(parse_mailbox(&email.to)?)
            .subject(email.subject)
            .header(ContentType::TEXT_HTML)
            .body(email.html)
            .map_err(|e| MailError::Build(e.to_string()))?;

        self.transport
            .send(message)
            .await
            .map_err(|e| MailError::Transport(e.to_string()))?;
        Ok(())
    }
}

/// Mailer used when SMTP credentials are missing
pub struct DisabledMailer;

#[async_trait]
impl Mailer for DisabledMailer {
    fn is_enabled(&self) -> bool {
        false
    }

    async fn send(&self, _email: OutgoingEmail) -> Result<(), MailError> {
        Err(MailError::NotConfigured)
    }
}

/// Row id as shown in notifications
fn display_id(id: Option<&Value>) -> String {
    match id {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => "unknown".to_string(),
        Some(other) => other.to_string(),
    }
}

pub struct LeadNotifier {
    mailer: Arc<dyn Mailer>,
    booking_admin: Option<String>,
    contact_admin: Option<String>,
}

impl LeadNotifier {
    pub fn new(mailer: Arc<dyn Mailer>, config: &EmailConfig) -> Self {
        Self {
            mailer,
            booking_admin: config.booking_notification.clone(),
            contact_admin: config.contact_notification.clone(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.mailer.is_enabled()
    }

    /// Returns the number of emails delivered
    pub async fn booking_created(&self, booking: &NewBooking, id: Option<&Value>) -> usize {
        if !self.mailer.is_enabled() {
            debug!("Email not configured, skipping booking notifications");
            return 0;
        }

        let mut sent = 0;
        let confirmation = OutgoingEmail {
            to: booking.email.clone(),
            subject: templates::BOOKING_CONFIRMATION_SUBJECT.to_string(),
            html: templates::booking_confirmation(booking).into_string(),
        };
        sent += self.deliver(confirmation).await as usize;

        if let Some(admin) = &self.booking_admin {
            let notification = OutgoingEmail {
                to: admin.clone(),
                subject: templates::BOOKING_ADMIN_SUBJECT.to_string(),
                html: templates::booking_admin(booking, &display_id(id)).into_string(),
            };
            sent += self.deliver(notification).await as usize;
        }
        sent
    }

    /// Returns the number of emails delivered
    pub async fn contact_received(&self, message: &NewContactMessage, id: Option<&Value>) -> usize {
        if !self.mailer.is_enabled() {
            debug!("Email not configured, skipping contact notifications");
            return 0;
        }

        let mut sent = 0;
        let confirmation = OutgoingEmail {
            to: message.email.clone(),
            subject: templates::CONTACT_CONFIRMATION_SUBJECT.to_string(),
            html: templates::contact_confirmation(message).into_string(),
        };
        sent += self.deliver(confirmation).await as usize;

        if let Some(admin) = &self.contact_admin {
            let notification = OutgoingEmail {
                to: admin.clone(),
                subject: templates::contact_admin_subject(message),
                html: templates::contact_admin(message, &display_id(id)).into_string(),
            };
            sent += self.deliver(notification).await as usize;
        }
        sent
    }

    async fn deliver(&self, email: OutgoingEmail) -> bool {
        let to = email.to.clone();
        let subject = email.subject.clone();
        match self.mailer.send(email).await {
            Ok(()) => {
                info!(to = %to, subject = %subject, "✓ Email sent");
                true
            }
            Err(e) => {
                warn!(to = %to, subject = %subject, error = %e, "Email delivery failed");
                false
            }
        }
    }
}
