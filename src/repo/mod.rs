use std::sync::Arc;

use sqlx::PgPool;

mod inmemory;
mod reminders;
mod users;

pub use inmemory::{InMemoryReminderRepo, InMemoryUserRepo};
pub use reminders::{PgReminderRepo, ReminderRepo};
pub use users::{PgUserRepo, UserRepo};

/// Store handles shared by the REST controllers and the notification engine
#[derive(Clone)]
pub struct Repos {
    pub reminders: Arc<dyn ReminderRepo>,
    pub users: Arc<dyn UserRepo>,
}

impl Repos {
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            reminders: Arc::new(PgReminderRepo::new(pool.clone())),
            users: Arc::new(PgUserRepo::new(pool)),
        }
    }

    pub fn in_memory() -> Self {
        Self {
            reminders: Arc::new(InMemoryReminderRepo::default()),
            users: Arc::new(InMemoryUserRepo::default()),
        }
    }
}
