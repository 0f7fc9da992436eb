use std::str::FromStr;

use unicode_segmentation::UnicodeSegmentation;

const MAX_LEN: usize = 256;

/// Title of a reminder, shown as the email subject line
#[derive(Debug, Clone, PartialEq)]
pub struct ReminderTitle(String);

impl AsRef<str> for ReminderTitle {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<ReminderTitle> for String {
    fn from(value: ReminderTitle) -> Self {
        value.0
    }
}

impl FromStr for ReminderTitle {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let value = value.trim();
        if value.is_empty() {
            return Err("Title cannot be empty".into());
        }
        if value.graphemes(true).count() > MAX_LEN {
            return Err("Title too long".into());
        }
        Ok(Self(value.to_string()))
    }
}
