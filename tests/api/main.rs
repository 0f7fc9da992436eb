mod notifications;
mod reminders;
mod users;
