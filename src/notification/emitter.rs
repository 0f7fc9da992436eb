use crate::client::{Email, EmailClient};
use crate::domain::EmailAddress;
use crate::error::{Error, Result};
use crate::model::{Reminder, User};

use super::templates::{self, Rendered};

/// Delivers notifications to users.
///
/// Every method reports success as a plain `bool`; failures are logged by the emitter and
/// never surface as errors, so one bad recipient cannot stop a check.
#[async_trait::async_trait]
pub trait NotificationEmitter: Send + Sync {
    /// Digest of the user's reminders for the day
    async fn send_summary(&self, reminders: &[Reminder], user: &User) -> bool;

    /// Notice that a reminder's own time has arrived
    async fn send_exact(&self, reminder: &Reminder, user: &User) -> bool;

    /// Notice sent `advance_minutes` ahead of a reminder
    async fn send_advance(&self, reminder: &Reminder, user: &User, advance_minutes: u32) -> bool;
}

/// Emitter that delivers through the email API
#[derive(Debug)]
pub struct EmailNotifier {
    client: Option<EmailClient>,
}

impl EmailNotifier {
    pub fn new(client: EmailClient) -> Self {
        Self {
            client: Some(client),
        }
    }

    /// A notifier without credentials. Every send is refused.
    pub fn disabled() -> Self {
        Self { client: None }
    }

    pub fn is_configured(&self) -> bool {
        self.client.is_some()
    }

    /// Send a one-off email outside of any reminder, e.g. to check delivery
    pub async fn send_message(&self, email: &Email) -> Result<()> {
        let client = self.client.as_ref().ok_or(Error::EmailNotConfigured)?;
        client.send(email).await
    }

    async fn deliver(&self, user: &User, rendered: Rendered, tag: &'static str) -> bool {
        let Some(client) = &self.client else {
            tracing::warn!(user.id = %user.id, tag, "Email delivery is not configured, skipping");
            return false;
        };

        let recipient: EmailAddress = match user.email.parse() {
            Ok(recipient) => recipient,
            Err(e) => {
                tracing::error!(user.id = %user.id, error = %e, "Cannot notify user");
                return false;
            }
        };

        let email = Email {
            recipient,
            subject: rendered.subject,
            html_body: rendered.html_body,
            text_body: rendered.text_body,
            tag,
        };

        match client.send(&email).await {
            Ok(()) => {
                tracing::info!(user.id = %user.id, tag, "Notification sent");
                true
            }
            Err(e) => {
                tracing::error!(user.id = %user.id, tag, error.cause_chain = ?e, "Failed to send notification");
                false
            }
        }
    }
}

#[async_trait::async_trait]
impl NotificationEmitter for EmailNotifier {
    async fn send_summary(&self, reminders: &[Reminder], user: &User) -> bool {
        if reminders.is_empty() {
            return false;
        }
        self.deliver(user, templates::summary(reminders), "daily").await
    }

    async fn send_exact(&self, reminder: &Reminder, user: &User) -> bool {
        self.deliver(user, templates::reminder_notice(reminder), "exact")
            .await
    }

    async fn send_advance(&self, reminder: &Reminder, user: &User, advance_minutes: u32) -> bool {
        self.deliver(
            user,
            templates::advance_notice(reminder, advance_minutes),
            "advance",
        )
        .await
    }
}
