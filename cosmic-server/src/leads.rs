//! Booking and contact-message submissions

use cosmic_common::Row;
use serde::Deserialize;
use serde_json::Value;

/// Status given to every new booking
pub const PENDING: &str = "pending";

/// Booking form as posted by the website
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BookingRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub date_of_birth: Option<String>,
    pub service: Option<String>,
    pub message: Option<String>,
}

/// A booking with its required fields present
#[derive(Debug, Clone, PartialEq)]
pub struct NewBooking {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub date_of_birth: Option<String>,
    pub service: String,
    pub message: Option<String>,
}

/// Contact form as posted by the website
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContactRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub subject: Option<String>,
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewContactMessage {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub subject: Option<String>,
    pub message: String,
}

/// Trimmed value, `None` when absent or blank
fn present(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn optional(value: &Option<String>) -> Value {
    value.clone().map(Value::String).unwrap_or(Value::Null)
}

impl BookingRequest {
    /// `None` unless name, email and service are all present
    pub fn validate(self) -> Option<NewBooking> {
        Some(NewBooking {
            name: present(self.name)?,
            email: present(self.email)?,
            service: present(self.service)?,
            phone: present(self.phone),
            date_of_birth: present(self.date_of_birth),
            message: present(self.message),
        })
    }
}

impl NewBooking {
    pub fn to_row(&self) -> Row {
        let mut row = Row::new();
        row.insert("name".into(), Value::String(self.name.clone()));
        row.insert("email".into(), Value::String(self.email.clone()));
        row.insert("phone".into(), optional(&self.phone));
        row.insert("service".into(), Value::String(self.service.clone()));
        row.insert("message".into(), optional(&self.message));
        row.insert("status".into(), Value::String(PENDING.to_string()));
        if let Some(dob) = &self.date_of_birth {
            row.insert("date_of_birth".into(), Value::String(dob.clone()));
        }
        row
    }
}

impl ContactRequest {
    /// `None` unless name, email and message are all present
    pub fn validate(self) -> Option<NewContactMessage> {
        Some(NewContactMessage {
            name: present(self.name)?,
            email: present(self.email)?,
            message: present(self.message)?,
            phone: present(self.phone),
            subject: present(self.subject),
        })
    }
}

impl NewContactMessage {
    pub fn to_row(&self) -> Row {
        let mut row = Row::new();
        row.insert("name".into(), Value::String(self.name.clone()));
        row.insert("email".into(), Value::String(self.email.clone()));
        row.insert("phone".into(), optional(&self.phone));
        row.insert("message".into(), Value::String(self.message.clone()));
        if let Some(subject) = &self.subject {
            row.insert("subject".into(), Value::String(subject.clone()));
        }
        row
    }

    /// Subject line fragment for the admin notification
    pub fn subject_or_default(&self) -> &str {
        self.subject.as_deref().unwrap_or("No Subject")
    }
}
