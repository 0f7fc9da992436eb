mod email_address;
mod person_name;
mod reminder_schedule;
mod reminder_title;

pub use email_address::EmailAddress;
pub use person_name::PersonName;
pub use reminder_schedule::{ReminderDate, ReminderTime};
pub use reminder_title::ReminderTitle;
