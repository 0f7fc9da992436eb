use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};

use serde::{Deserialize, Serialize};

use uuid::Uuid;

use crate::domain::{EmailAddress, ReminderDate, ReminderTime, ReminderTitle};

/// Validated request for a new reminder
#[derive(Debug)]
pub struct NewReminder {
    pub email: EmailAddress,
    pub title: ReminderTitle,
    pub date: ReminderDate,
    pub time: Option<ReminderTime>,
    pub description: Option<String>,
}

/// Partial update of a stored reminder.
/// `None` leaves a field untouched, `Some(None)` clears an optional field.
#[derive(Debug, Default)]
pub struct ReminderChanges {
    pub email: Option<EmailAddress>,
    pub title: Option<ReminderTitle>,
    pub date: Option<ReminderDate>,
    pub time: Option<Option<ReminderTime>>,
    pub description: Option<Option<String>>,
    pub is_completed: Option<bool>,
}

/// Stored reminder record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Reminder {
    pub id: Uuid,
    /// Owner's address. Matched by value against users, there is no foreign key.
    pub email: String,
    pub title: String,
    pub date: NaiveDate,
    /// `None` for all-day reminders, which only ever show up in the daily digest
    #[serde(default, with = "super::time_of_day::option")]
    pub time: Option<NaiveTime>,
    #[serde(default)]
    pub description: Option<String>,
    pub is_completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Reminder {
    pub fn new(new_reminder: NewReminder) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            email: new_reminder.email.into(),
            title: new_reminder.title.into(),
            date: new_reminder.date.into(),
            time: new_reminder.time.map(Into::into),
            description: non_blank(new_reminder.description),
            is_completed: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply a partial update and refresh `updated_at`
    pub fn apply(&mut self, changes: ReminderChanges) {
        if let Some(email) = changes.email {
            self.email = email.into();
        }
        if let Some(title) = changes.title {
            self.title = title.into();
        }
        if let Some(date) = changes.date {
            self.date = date.into();
        }
        if let Some(time) = changes.time {
            self.time = time.map(Into::into);
        }
        if let Some(description) = changes.description {
            self.description = non_blank(description);
        }
        if let Some(is_completed) = changes.is_completed {
            self.is_completed = is_completed;
        }
        self.updated_at = Utc::now();
    }

    /// Local date and time the reminder is due, if it has a time at all
    pub fn scheduled_at(&self) -> Option<NaiveDateTime> {
        self.time.map(|time| self.date.and_time(time))
    }

    pub fn is_owned_by(&self, email: &str) -> bool {
        self.email.eq_ignore_ascii_case(email)
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
