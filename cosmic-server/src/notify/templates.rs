//! HTML email bodies
//!
//! maud escapes every spliced value, so customer-supplied text is safe to
//! embed as-is.

use crate::leads::{NewBooking, NewContactMessage};
use maud::{html, Markup, DOCTYPE};

pub const BOOKING_CONFIRMATION_SUBJECT: &str = "Booking Confirmation - Cosmic Astrology";
pub const BOOKING_ADMIN_SUBJECT: &str = "New Booking Received";
pub const CONTACT_CONFIRMATION_SUBJECT: &str = "Message Received - Cosmic Astrology";

pub fn contact_admin_subject(message: &NewContactMessage) -> String {
    format!("New Contact Message: {}", message.subject_or_default())
}

fn layout(heading: &str, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html {
            head {
                meta charset="utf-8";
                title { (heading) }
            }
            body style="font-family: Arial, sans-serif; color: #333; max-width: 600px; margin: 0 auto;" {
                h2 style="color: #6b3fa0;" { (heading) }
                (content)
                hr;
                p style="font-size: 12px; color: #888;" { "Cosmic Astrology" }
            }
        }
    }
}

fn detail(label: &str, value: Option<&str>) -> Markup {
    html! {
        @if let Some(value) = value {
            tr {
                td style="padding: 4px 12px 4px 0;" { strong { (label) } }
                td style="padding: 4px 0;" { (value) }
            }
        }
    }
}

fn booking_details(booking: &NewBooking) -> Markup {
    html! {
        table {
            (detail("Name", Some(booking.name.as_str())))
            (detail("Email", Some(booking.email.as_str())))
            (detail("Phone", booking.phone.as_deref()))
            (detail("Service", Some(booking.service.as_str())))
            (detail("Date of birth", booking.date_of_birth.as_deref()))
            (detail("Message", booking.message.as_deref()))
        }
    }
}

pub fn booking_confirmation(booking: &NewBooking) -> Markup {
    layout(
        "Booking Confirmation",
        html! {
            p { "Dear " (booking.name) "," }
            p {
                "Thank you for booking a consultation with us. We have received your request for "
                strong { (booking.service) }
                " and will contact you shortly to confirm a time."
            }
            (booking_details(booking))
            p { "Warm regards," br; "The Cosmic Astrology team" }
        },
    )
}

pub fn booking_admin(booking: &NewBooking, booking_id: &str) -> Markup {
    layout(
        "New Booking Received",
        html! {
            p { "A new booking was submitted through the website." }
            table { (detail("Booking ID", Some(booking_id))) }
            (booking_details(booking))
        },
    )
}

fn contact_details(message: &NewContactMessage) -> Markup {
    html! {
        table {
            (detail("Name", Some(message.name.as_str())))
            (detail("Email", Some(message.email.as_str())))
            (detail("Phone", message.phone.as_deref()))
            (detail("Subject", message.subject.as_deref()))
        }
        p { strong { "Message:" } }
        p style="white-space: pre-wrap;" { (message.message) }
    }
}

pub fn contact_confirmation(message: &NewContactMessage) -> Markup {
    layout(
        "Message Received",
        html! {
            p { "Dear " (message.name) "," }
            p { "Thank you for reaching out. We have received your message and will get back to you soon." }
            (contact_details(message))
            p { "Warm regards," br; "The Cosmic Astrology team" }
        },
    )
}

pub fn contact_admin(message: &NewContactMessage, message_id: &str) -> Markup {
    layout(
        "New Contact Message",
        html! {
            table { (detail("Message ID", Some(message_id))) }
            (contact_details(message))
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn booking() -> NewBooking {
        NewBooking {
            name: "<script>alert(1)</script>".into(),
            email: "asha@example.com".into(),
            phone: None,
            date_of_birth: Some("1990-01-01".into()),
            service: "Kundali Reading".into(),
            message: None,
        }
    }

    #[test]
    fn test_customer_text_is_escaped() {
        let body = booking_confirmation(&booking()).into_string();
        assert!(!body.contains("<script>"));
        assert!(body.contains("&lt;script&gt;"));
    }

    #[test]
    fn test_missing_details_are_omitted() {
        let body = booking_confirmation(&booking()).into_string();
        assert!(!body.contains("Phone"));
        assert!(body.contains("1990-01-01"));
    }

    #[test]
    fn test_admin_booking_has_id() {
        let body = booking_admin(&booking(), "42").into_string();
        assert!(body.contains("Booking ID"));
        assert!(body.contains("42"));
    }

    #[test]
    fn test_contact_admin_subject() {
        let message = NewContactMessage {
            name: "Ravi".into(),
            email: "ravi@example.com".into(),
            phone: None,
            subject: Some("Gemstones".into()),
            message: "Which stone suits me?".into(),
        };
        assert_eq!(contact_admin_subject(&message), "New Contact Message: Gemstones");
        assert!(contact_admin(&message, "7").into_string().contains("Which stone suits me?"));
    }
}
