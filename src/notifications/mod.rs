//! Follow-up email after a completed session.

pub mod dispatcher;
pub mod mailer;

pub use dispatcher::{FollowUp, NotificationDispatcher, NotificationOutcome};
pub use mailer::{
    transport_from_settings, Delivery, HttpRelayTransport, MailConnection, MailTransport,
    OutboxTransport, OutgoingMail, ScopedConnection, SmtpRelayTransport,
};
