mod reminders;
mod users;

pub use reminders::{NewReminder, Reminder, ReminderChanges};
pub use users::{NewUser, NotificationPreferences, User, UserChanges};

/// Serde format for wall-clock times, always `HH:MM`
pub(crate) mod time_of_day {
    use chrono::NaiveTime;

    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%H:%M";

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&time.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let value = String::deserialize(deserializer)?;
        NaiveTime::parse_from_str(value.trim(), FORMAT).map_err(serde::de::Error::custom)
    }

    /// Same format for optional times; an empty string reads as `None`
    pub mod option {
        use chrono::NaiveTime;

        use serde::{Deserialize, Deserializer, Serializer};

        use super::FORMAT;

        pub fn serialize<S: Serializer>(
            time: &Option<NaiveTime>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match time {
                Some(time) => serializer.serialize_str(&time.format(FORMAT).to_string()),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<NaiveTime>, D::Error> {
            let value: Option<String> = Option::deserialize(deserializer)?;
            match value.as_deref().map(str::trim) {
                None | Some("") => Ok(None),
                Some(value) => NaiveTime::parse_from_str(value, FORMAT)
                    .map(Some)
                    .map_err(serde::de::Error::custom),
            }
        }
    }
}
