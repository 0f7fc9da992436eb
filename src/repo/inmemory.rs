use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::NaiveDate;

use uuid::Uuid;

use crate::error::Result;
use crate::model::{Reminder, User};

use super::{ReminderRepo, UserRepo};

/// Records that can live in an in-memory collection
trait Entity: Clone {
    fn id(&self) -> Uuid;
}

impl Entity for Reminder {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl Entity for User {
    fn id(&self) -> Uuid {
        self.id
    }
}

/// A poisoned lock only means another request panicked mid-write; the data is still usable
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn insert<T: Entity>(val: &T, collection: &Mutex<Vec<T>>) {
    lock(collection).push(val.clone());
}

fn save<T: Entity>(val: &T, collection: &Mutex<Vec<T>>) -> bool {
    let mut collection = lock(collection);
    match collection.iter_mut().find(|item| item.id() == val.id()) {
        Some(item) => {
            *item = val.clone();
            true
        }
        None => false,
    }
}

fn find_by<T: Entity, F: Fn(&T) -> bool>(collection: &Mutex<Vec<T>>, compare: F) -> Vec<T> {
    lock(collection)
        .iter()
        .filter(|item| compare(item))
        .cloned()
        .collect()
}

fn find<T: Entity>(id: Uuid, collection: &Mutex<Vec<T>>) -> Option<T> {
    lock(collection).iter().find(|item| item.id() == id).cloned()
}

fn delete<T: Entity>(id: Uuid, collection: &Mutex<Vec<T>>) -> bool {
    let mut collection = lock(collection);
    let before = collection.len();
    collection.retain(|item| item.id() != id);
    collection.len() != before
}

/// Reminder store held in process memory, in insertion order
#[derive(Debug, Default)]
pub struct InMemoryReminderRepo {
    reminders: Mutex<Vec<Reminder>>,
}

#[async_trait::async_trait]
impl ReminderRepo for InMemoryReminderRepo {
    async fn insert(&self, reminder: &Reminder) -> Result<()> {
        insert(reminder, &self.reminders);
        Ok(())
    }

    async fn save(&self, reminder: &Reminder) -> Result<bool> {
        Ok(save(reminder, &self.reminders))
    }

    async fn find(&self, id: Uuid) -> Result<Option<Reminder>> {
        Ok(find(id, &self.reminders))
    }

    async fn find_all(&self) -> Result<Vec<Reminder>> {
        Ok(find_by(&self.reminders, |_| true))
    }

    async fn find_by_email(&self, email: &str) -> Result<Vec<Reminder>> {
        Ok(find_by(&self.reminders, |r| r.is_owned_by(email)))
    }

    async fn find_by_date(&self, date: NaiveDate) -> Result<Vec<Reminder>> {
        Ok(find_by(&self.reminders, |r| r.date == date))
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        Ok(delete(id, &self.reminders))
    }
}

/// User store held in process memory, in insertion order
#[derive(Debug, Default)]
pub struct InMemoryUserRepo {
    users: Mutex<Vec<User>>,
    current: Mutex<HashMap<String, Uuid>>,
}

#[async_trait::async_trait]
impl UserRepo for InMemoryUserRepo {
    async fn insert(&self, user: &User) -> Result<()> {
        insert(user, &self.users);
        Ok(())
    }

    async fn save(&self, user: &User) -> Result<bool> {
        Ok(save(user, &self.users))
    }

    async fn find(&self, id: Uuid) -> Result<Option<User>> {
        Ok(find(id, &self.users))
    }

    async fn find_all(&self) -> Result<Vec<User>> {
        Ok(find_by(&self.users, |_| true))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        Ok(find_by(&self.users, |u| u.email.eq_ignore_ascii_case(email))
            .into_iter()
            .next())
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let deleted = delete(id, &self.users);
        if deleted {
            lock(&self.current).retain(|_, user_id| *user_id != id);
        }
        Ok(deleted)
    }

    async fn set_current(&self, client_id: &str, user_id: Option<Uuid>) -> Result<()> {
        let mut current = lock(&self.current);
        match user_id {
            Some(user_id) => current.insert(client_id.to_string(), user_id),
            None => current.remove(client_id),
        };
        Ok(())
    }

    async fn current(&self, client_id: &str) -> Result<Option<User>> {
        let user_id = lock(&self.current).get(client_id).copied();
        Ok(user_id.and_then(|id| find(id, &self.users)))
    }
}
