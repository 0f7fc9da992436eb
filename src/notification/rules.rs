use std::fmt;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike};

use crate::model::{Reminder, User};

use super::NotificationKey;

/// A local date and time at minute resolution, the granularity every rule compares at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Moment {
    pub date: NaiveDate,
    pub time: NaiveTime,
}

impl From<NaiveDateTime> for Moment {
    fn from(value: NaiveDateTime) -> Self {
        let time = value.time();
        let time = NaiveTime::from_hms_opt(time.hour(), time.minute(), 0).unwrap_or(time);
        Self {
            date: value.date(),
            time,
        }
    }
}

impl fmt::Display for Moment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}",
            self.date.format("%Y-%m-%d"),
            self.time.format("%H:%M")
        )
    }
}

/// What to send for a due notification
#[derive(Debug, PartialEq)]
pub enum Notice<'a> {
    /// Every open reminder of the day, sent at the user's digest time
    Digest(Vec<&'a Reminder>),
    /// A reminder whose own time has arrived
    Exact(&'a Reminder),
    /// A reminder starting in `minutes`
    Advance { reminder: &'a Reminder, minutes: u32 },
}

#[derive(Debug, PartialEq)]
pub struct DueNotification<'a> {
    pub key: NotificationKey,
    pub notice: Notice<'a>,
}

/// Work out which notifications are due for `user` at `now`.
///
/// Only open reminders owned by the user are considered. The digest and exact-time rules
/// look at reminders dated today; the advance rule compares the full advance instant, so a
/// notice for a reminder shortly after midnight goes out late on the previous day.
pub fn due_notifications<'a>(
    user: &User,
    reminders: &'a [Reminder],
    now: Moment,
) -> Vec<DueNotification<'a>> {
    let preferences = &user.preferences;
    if !preferences.email_notifications {
        return Vec::new();
    }

    let owned: Vec<&Reminder> = reminders
        .iter()
        .filter(|r| r.is_owned_by(&user.email) && !r.is_completed)
        .collect();
    let today: Vec<&Reminder> = owned.iter().copied().filter(|r| r.date == now.date).collect();

    let mut due = Vec::new();

    if now.time == preferences.digest_time && !today.is_empty() {
        due.push(DueNotification {
            key: NotificationKey::Daily {
                user_id: user.id,
                date: now.date,
            },
            notice: Notice::Digest(today.clone()),
        });
    }

    for reminder in today {
        if reminder.time == Some(now.time) {
            due.push(DueNotification {
                key: NotificationKey::Exact {
                    reminder_id: reminder.id,
                    date: now.date,
                    time: now.time,
                },
                notice: Notice::Exact(reminder),
            });
        }
    }

    if let Some(minutes) = preferences.advance_window() {
        for reminder in owned {
            if advance_moment(reminder, minutes) == Some(now) {
                due.push(DueNotification {
                    key: NotificationKey::Advance {
                        reminder_id: reminder.id,
                        date: now.date,
                        time: now.time,
                    },
                    notice: Notice::Advance { reminder, minutes },
                });
            }
        }
    }

    due
}

/// When the advance notice for `reminder` is due, `None` for all-day reminders
fn advance_moment(reminder: &Reminder, minutes: u32) -> Option<Moment> {
    reminder
        .scheduled_at()?
        .checked_sub_signed(chrono::Duration::minutes(i64::from(minutes)))
        .map(Moment::from)
}
