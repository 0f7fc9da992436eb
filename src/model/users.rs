use chrono::NaiveTime;

use serde::{Deserialize, Serialize};

use uuid::Uuid;

use crate::domain::{EmailAddress, PersonName};

/// Per-user notification settings.
/// Users that never configured anything get the defaults: email on, digest at 09:00,
/// advance notice 15 minutes ahead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NotificationPreferences {
    pub email_notifications: bool,
    #[serde(with = "super::time_of_day")]
    pub digest_time: NaiveTime,
    pub advance_notification: bool,
    pub advance_minutes: u32,
}

impl NotificationPreferences {
    pub const DEFAULT_DIGEST_HOUR: u32 = 9;
    pub const DEFAULT_ADVANCE_MINUTES: u32 = 15;
    /// Advance windows longer than a day are rejected
    pub const MAX_ADVANCE_MINUTES: u32 = 24 * 60;

    /// Advance window in minutes, or `None` when advance notices are switched off
    pub fn advance_window(&self) -> Option<u32> {
        (self.advance_notification && self.advance_minutes > 0).then_some(self.advance_minutes)
    }
}

impl Default for NotificationPreferences {
    fn default() -> Self {
        Self {
            email_notifications: true,
            digest_time: NaiveTime::from_hms_opt(Self::DEFAULT_DIGEST_HOUR, 0, 0)
                .unwrap_or(NaiveTime::MIN),
            advance_notification: true,
            advance_minutes: Self::DEFAULT_ADVANCE_MINUTES,
        }
    }
}

/// Validated request for a new user
#[derive(Debug)]
pub struct NewUser {
    pub email: EmailAddress,
    pub name: Option<PersonName>,
    pub preferences: NotificationPreferences,
}

/// Partial update of a stored user
#[derive(Debug, Default)]
pub struct UserChanges {
    pub email: Option<EmailAddress>,
    pub name: Option<Option<PersonName>>,
    pub preferences: Option<NotificationPreferences>,
}

/// Stored user record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub preferences: NotificationPreferences,
}

impl User {
    pub fn new(new_user: NewUser) -> Self {
        Self {
            id: Uuid::new_v4(),
            email: new_user.email.into(),
            name: new_user.name.map(Into::into),
            preferences: new_user.preferences,
        }
    }

    pub fn apply(&mut self, changes: UserChanges) {
        if let Some(email) = changes.email {
            self.email = email.into();
        }
        if let Some(name) = changes.name {
            self.name = name.map(Into::into);
        }
        if let Some(preferences) = changes.preferences {
            self.preferences = preferences;
        }
    }
}
