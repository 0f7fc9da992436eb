use chrono::NaiveDate;

use sqlx::PgPool;

use uuid::Uuid;

use crate::error::Result;
use crate::model::Reminder;

/// Reminder store. Implemented once per backend so the engine and the controllers
/// can run against Postgres or against memory in tests.
#[async_trait::async_trait]
pub trait ReminderRepo: Send + Sync {
    /// Insert a new reminder record
    async fn insert(&self, reminder: &Reminder) -> Result<()>;

    /// Overwrite an existing reminder by ID, returning `false` if it does not exist
    async fn save(&self, reminder: &Reminder) -> Result<bool>;

    async fn find(&self, id: Uuid) -> Result<Option<Reminder>>;

    async fn find_all(&self) -> Result<Vec<Reminder>>;

    /// All reminders owned by an address, compared case-insensitively
    async fn find_by_email(&self, email: &str) -> Result<Vec<Reminder>>;

    async fn find_by_date(&self, date: NaiveDate) -> Result<Vec<Reminder>>;

    /// Delete a reminder by ID, returning `false` if it did not exist
    async fn delete(&self, id: Uuid) -> Result<bool>;
}

/// Postgres Reminder Repository
#[derive(Debug, Clone)]
pub struct PgReminderRepo {
    pool: PgPool,
}

impl PgReminderRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl ReminderRepo for PgReminderRepo {
    #[tracing::instrument(name = "Insert reminder", skip(self, reminder), fields(reminder.id = %reminder.id))]
    async fn insert(&self, reminder: &Reminder) -> Result<()> {
        sqlx::query(
            "insert into reminders(id, email, title, date, time, description, is_completed, created_at, updated_at) \
             values ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
        )
        .bind(reminder.id)
        .bind(&reminder.email)
        .bind(&reminder.title)
        .bind(reminder.date)
        .bind(reminder.time)
        .bind(&reminder.description)
        .bind(reminder.is_completed)
        .bind(reminder.created_at)
        .bind(reminder.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    #[tracing::instrument(name = "Save reminder", skip(self, reminder), fields(reminder.id = %reminder.id))]
    async fn save(&self, reminder: &Reminder) -> Result<bool> {
        let result = sqlx::query(
            "update reminders set email=$2, title=$3, date=$4, time=$5, description=$6, \
             is_completed=$7, updated_at=$8 where id=$1",
        )
        .bind(reminder.id)
        .bind(&reminder.email)
        .bind(&reminder.title)
        .bind(reminder.date)
        .bind(reminder.time)
        .bind(&reminder.description)
        .bind(reminder.is_completed)
        .bind(reminder.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    #[tracing::instrument(name = "Fetch reminder by id", skip(self))]
    async fn find(&self, id: Uuid) -> Result<Option<Reminder>> {
        let reminder = sqlx::query_as::<_, Reminder>("select * from reminders where id=$1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(reminder)
    }

    #[tracing::instrument(name = "Fetch all reminders", skip(self))]
    async fn find_all(&self) -> Result<Vec<Reminder>> {
        let reminders =
            sqlx::query_as::<_, Reminder>("select * from reminders order by created_at")
                .fetch_all(&self.pool)
                .await?;
        Ok(reminders)
    }

    #[tracing::instrument(name = "Fetch reminders by email", skip(self))]
    async fn find_by_email(&self, email: &str) -> Result<Vec<Reminder>> {
        let reminders = sqlx::query_as::<_, Reminder>(
            "select * from reminders where lower(email)=lower($1) order by created_at",
        )
        .bind(email)
        .fetch_all(&self.pool)
        .await?;
        Ok(reminders)
    }

    #[tracing::instrument(name = "Fetch reminders by date", skip(self))]
    async fn find_by_date(&self, date: NaiveDate) -> Result<Vec<Reminder>> {
        let reminders = sqlx::query_as::<_, Reminder>(
            "select * from reminders where date=$1 order by created_at",
        )
        .bind(date)
        .fetch_all(&self.pool)
        .await?;
        Ok(reminders)
    }

    #[tracing::instrument(name = "Delete reminder", skip(self))]
    async fn delete(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("delete from reminders where id=$1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
