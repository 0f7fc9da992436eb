use chrono::NaiveTime;

use sqlx::PgPool;

use uuid::Uuid;

use crate::error::Result;
use crate::model::{NotificationPreferences, User};

/// User store, including which user each client context is signed in as
#[async_trait::async_trait]
pub trait UserRepo: Send + Sync {
    async fn insert(&self, user: &User) -> Result<()>;

    /// Overwrite an existing user by ID, returning `false` if it does not exist
    async fn save(&self, user: &User) -> Result<bool>;

    async fn find(&self, id: Uuid) -> Result<Option<User>>;

    async fn find_all(&self) -> Result<Vec<User>>;

    /// First user registered with an address, compared case-insensitively
    async fn find_by_email(&self, email: &str) -> Result<Option<User>>;

    async fn delete(&self, id: Uuid) -> Result<bool>;

    /// Sign a client context in as `user_id`, or out with `None`
    async fn set_current(&self, client_id: &str, user_id: Option<Uuid>) -> Result<()>;

    async fn current(&self, client_id: &str) -> Result<Option<User>>;
}

#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    email: String,
    name: Option<String>,
    email_notifications: bool,
    digest_time: NaiveTime,
    advance_notification: bool,
    advance_minutes: i32,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id,
            email: row.email,
            name: row.name,
            preferences: NotificationPreferences {
                email_notifications: row.email_notifications,
                digest_time: row.digest_time,
                advance_notification: row.advance_notification,
                advance_minutes: u32::try_from(row.advance_minutes).unwrap_or_default(),
            },
        }
    }
}

fn advance_minutes(user: &User) -> i32 {
    i32::try_from(user.preferences.advance_minutes).unwrap_or(i32::MAX)
}

/// Postgres User Repository
#[derive(Debug, Clone)]
pub struct PgUserRepo {
    pool: PgPool,
}

impl PgUserRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl UserRepo for PgUserRepo {
    #[tracing::instrument(name = "Insert user", skip(self, user), fields(user.id = %user.id))]
    async fn insert(&self, user: &User) -> Result<()> {
        sqlx::query(
            "insert into users(id, email, name, email_notifications, digest_time, advance_notification, advance_minutes) \
             values ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(user.id)
        .bind(&user.email)
        .bind(&user.name)
        .bind(user.preferences.email_notifications)
        .bind(user.preferences.digest_time)
        .bind(user.preferences.advance_notification)
        .bind(advance_minutes(user))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    #[tracing::instrument(name = "Save user", skip(self, user), fields(user.id = %user.id))]
    async fn save(&self, user: &User) -> Result<bool> {
        let result = sqlx::query(
            "update users set email=$2, name=$3, email_notifications=$4, digest_time=$5, \
             advance_notification=$6, advance_minutes=$7 where id=$1",
        )
        .bind(user.id)
        .bind(&user.email)
        .bind(&user.name)
        .bind(user.preferences.email_notifications)
        .bind(user.preferences.digest_time)
        .bind(user.preferences.advance_notification)
        .bind(advance_minutes(user))
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    #[tracing::instrument(name = "Fetch user by id", skip(self))]
    async fn find(&self, id: Uuid) -> Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>("select * from users where id=$1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(User::from))
    }

    #[tracing::instrument(name = "Fetch all users", skip(self))]
    async fn find_all(&self) -> Result<Vec<User>> {
        let rows = sqlx::query_as::<_, UserRow>("select * from users")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(User::from).collect())
    }

    #[tracing::instrument(name = "Fetch user by email", skip(self))]
    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            "select * from users where lower(email)=lower($1) limit 1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(User::from))
    }

    #[tracing::instrument(name = "Delete user", skip(self))]
    async fn delete(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("delete from users where id=$1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    #[tracing::instrument(name = "Set current user", skip(self))]
    async fn set_current(&self, client_id: &str, user_id: Option<Uuid>) -> Result<()> {
        match user_id {
            Some(user_id) => {
                sqlx::query(
                    "insert into current_users(client_id, user_id) values ($1, $2) \
                     on conflict (client_id) do update set user_id=excluded.user_id",
                )
                .bind(client_id)
                .bind(user_id)
                .execute(&self.pool)
                .await?;
            }
            None => {
                sqlx::query("delete from current_users where client_id=$1")
                    .bind(client_id)
                    .execute(&self.pool)
                    .await?;
            }
        }
        Ok(())
    }

    #[tracing::instrument(name = "Fetch current user", skip(self))]
    async fn current(&self, client_id: &str) -> Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            "select u.* from users u join current_users c on c.user_id = u.id where c.client_id=$1",
        )
        .bind(client_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(User::from))
    }
}
