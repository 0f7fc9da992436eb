use std::collections::HashSet;
use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{NaiveDate, NaiveTime};

use uuid::Uuid;

/// Identity of one logical notification. Each key is delivered at most once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotificationKey {
    /// A user's digest for one day
    Daily { user_id: Uuid, date: NaiveDate },
    /// A reminder's own time arriving
    Exact {
        reminder_id: Uuid,
        date: NaiveDate,
        time: NaiveTime,
    },
    /// The advance notice ahead of a reminder's time
    Advance {
        reminder_id: Uuid,
        date: NaiveDate,
        time: NaiveTime,
    },
}

impl NotificationKey {
    /// Date of the check that produced the key
    pub fn date(&self) -> NaiveDate {
        match self {
            Self::Daily { date, .. } | Self::Exact { date, .. } | Self::Advance { date, .. } => {
                *date
            }
        }
    }

    pub fn category(&self) -> &'static str {
        match self {
            Self::Daily { .. } => "daily",
            Self::Exact { .. } => "exact",
            Self::Advance { .. } => "advance",
        }
    }
}

impl fmt::Display for NotificationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Daily { user_id, date } => {
                write!(f, "daily:{}:{}", user_id, date.format("%Y-%m-%d"))
            }
            Self::Exact {
                reminder_id,
                date,
                time,
            }
            | Self::Advance {
                reminder_id,
                date,
                time,
            } => write!(
                f,
                "{}:{}:{}:{}",
                self.category(),
                reminder_id,
                date.format("%Y-%m-%d"),
                time.format("%H:%M")
            ),
        }
    }
}

#[derive(Debug, Default)]
struct LedgerState {
    /// Keys in the order they were recorded
    keys: Vec<NotificationKey>,
    index: HashSet<NotificationKey>,
    /// Date of the most recent roll over
    date: Option<NaiveDate>,
}

/// In-memory record of notifications already delivered.
///
/// Checks and inserts are separate calls, so two overlapping checks may both send the same
/// notification before either records it. Recording twice is harmless.
#[derive(Debug, Default)]
pub struct SentLedger {
    state: Mutex<LedgerState>,
}

impl SentLedger {
    fn state(&self) -> MutexGuard<'_, LedgerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn contains(&self, key: &NotificationKey) -> bool {
        self.state().index.contains(key)
    }

    /// Record a delivered notification, returning `false` if it was already recorded
    pub fn record(&self, key: NotificationKey) -> bool {
        let mut state = self.state();
        if state.index.insert(key) {
            state.keys.push(key);
            true
        } else {
            false
        }
    }

    /// Forget keys from other days once the date has moved on.
    /// Returns how many keys were dropped.
    pub fn roll_over(&self, today: NaiveDate) -> usize {
        let mut state = self.state();
        if state.date == Some(today) {
            return 0;
        }
        state.date = Some(today);

        let before = state.keys.len();
        state.keys.retain(|key| key.date() == today);
        let LedgerState { keys, index, .. } = &mut *state;
        index.retain(|key| key.date() == today);
        before - keys.len()
    }

    pub fn clear(&self) {
        let mut state = self.state();
        state.keys.clear();
        state.index.clear();
    }

    /// Snapshot of recorded keys, oldest first
    pub fn keys(&self) -> Vec<String> {
        self.state().keys.iter().map(ToString::to_string).collect()
    }
}
