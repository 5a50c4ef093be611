use serde::Serialize;
use tracing::{info, warn};

use crate::bases::NotificationSettings;
use crate::error::MentorError;
use crate::notifications::mailer::{Delivery, MailTransport, OutgoingMail, ScopedConnection};

/// Result of a follow-up dispatch. Failure never invalidates the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum NotificationOutcome {
    Sent,
    /// Accepted into the local outbox; not yet delivered.
    Queued { spool_path: String },
    Failed { reason: String },
    /// Notifications are disabled in config.
    Skipped,
}

/// Score and summary for one follow-up message.
#[derive(Debug, Clone, Copy)]
pub struct FollowUp<'s> {
    pub email: &'s str,
    pub name: &'s str,
    pub score: usize,
    pub total: usize,
    pub summary: &'s str,
}

pub struct NotificationDispatcher<'a> {
    transport: &'a dyn MailTransport,
    settings: &'a NotificationSettings,
    domain: &'a str,
}

impl<'a> NotificationDispatcher<'a> {
    pub fn new(
        transport: &'a dyn MailTransport,
        settings: &'a NotificationSettings,
        domain: &'a str,
    ) -> Self {
        Self {
            transport,
            settings,
            domain,
        }
    }

    pub fn compose(&self, follow_up: &FollowUp<'_>) -> OutgoingMail {
        let subject = format!(
            "Your {} Assessment Results – {}",
            title_case(self.domain),
            follow_up.name
        );
        let body = format!(
            "Hi {name},

Thanks for completing the skill assessment!

Your Quiz Score: {score}/{total}

Feedback Summary:
{summary}

If you're ready to chat about your journey or mentorship options, book a time here:
{link}

{signature}
",
            name = follow_up.name,
            score = follow_up.score,
            total = follow_up.total,
            summary = follow_up.summary,
            link = self.settings.scheduling_link,
            signature = self.settings.signature,
        );
        OutgoingMail {
            from: self.settings.sender.clone(),
            to: follow_up.email.to_string(),
            subject,
            body,
        }
    }

    /// Sends once inside a scoped connection; never retried.
    pub fn notify(&self, follow_up: &FollowUp<'_>) -> NotificationOutcome {
        if !self.settings.enabled {
            info!("Notifications disabled, skipping follow-up");
            return NotificationOutcome::Skipped;
        }
        let mail = self.compose(follow_up);
        match self.deliver(&mail) {
            Ok(Delivery::Sent) => {
                info!(to = %mail.to, "Follow-up email sent");
                NotificationOutcome::Sent
            }
            Ok(Delivery::Spooled(path)) => {
                info!(to = %mail.to, path = %path.display(), "Follow-up email queued in outbox");
                NotificationOutcome::Queued {
                    spool_path: path.display().to_string(),
                }
            }
            Err(err) => {
                warn!(to = %mail.to, error = %err, "Follow-up email failed");
                NotificationOutcome::Failed {
                    reason: err.to_string(),
                }
            }
        }
    }

    fn deliver(&self, mail: &OutgoingMail) -> Result<Delivery, MentorError> {
        let to_error = |e: anyhow::Error| MentorError::Notification(format!("{e:#}"));
        let mut conn = ScopedConnection::open(self.transport).map_err(to_error)?;
        let delivery = conn.send(mail).map_err(to_error)?;
        conn.close().map_err(to_error)?;
        Ok(delivery)
    }
}

fn title_case(text: &str) -> String {
    text.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
