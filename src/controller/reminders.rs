use actix_web::dev::HttpServiceFactory;
use actix_web::{delete, get, patch, post, web, HttpResponse};

use chrono::{Duration, NaiveDate};

use serde::Deserialize;

use uuid::Uuid;

use crate::clock::Clock;
use crate::domain::ReminderDate;
use crate::error::{RestError, RestResult};
use crate::model::{NewReminder, Reminder, ReminderChanges};
use crate::repo::Repos;

/// Default look-ahead of the upcoming listing
const DEFAULT_UPCOMING_DAYS: u32 = 7;
const MAX_UPCOMING_DAYS: u32 = 366;

/// JSON body for a new reminder
#[derive(Debug, Deserialize)]
pub struct NewReminderBody {
    email: String,
    title: String,
    date: String,
    #[serde(default)]
    time: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

impl TryFrom<NewReminderBody> for NewReminder {
    type Error = String;

    fn try_from(body: NewReminderBody) -> Result<Self, Self::Error> {
        let time = match body.time.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(time) => Some(time.parse()?),
        };

        Ok(Self {
            email: body.email.parse()?,
            title: body.title.parse()?,
            date: body.date.parse()?,
            time,
            description: body.description,
        })
    }
}

/// JSON body for a partial reminder update. Only present fields change;
/// `null` clears `time` and `description`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReminderPatchBody {
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    date: Option<String>,
    #[serde(default, deserialize_with = "super::double_option")]
    time: Option<Option<String>>,
    #[serde(default, deserialize_with = "super::double_option")]
    description: Option<Option<String>>,
    #[serde(default)]
    is_completed: Option<bool>,
}

impl TryFrom<ReminderPatchBody> for ReminderChanges {
    type Error = String;

    fn try_from(body: ReminderPatchBody) -> Result<Self, Self::Error> {
        let time = match body.time {
            None => None,
            Some(None) => Some(None),
            Some(Some(time)) if time.trim().is_empty() => Some(None),
            Some(Some(time)) => Some(Some(time.parse()?)),
        };

        Ok(Self {
            email: body.email.map(|email| email.parse()).transpose()?,
            title: body.title.map(|title| title.parse()).transpose()?,
            date: body.date.map(|date| date.parse()).transpose()?,
            time,
            description: body.description,
            is_completed: body.is_completed,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    email: Option<String>,
    date: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpcomingQuery {
    email: Option<String>,
    days: Option<u32>,
}

fn parse_date(value: &str) -> RestResult<NaiveDate> {
    value
        .parse::<ReminderDate>()
        .map(Into::into)
        .map_err(RestError::ParseError)
}

async fn find_or_404(repos: &Repos, id: Uuid) -> RestResult<Reminder> {
    repos
        .reminders
        .find(id)
        .await?
        .ok_or_else(|| RestError::NotFound(format!("No reminder with id {}", id)))
}

/// Update a reminder and write it back
async fn update(repos: &Repos, id: Uuid, changes: ReminderChanges) -> RestResult<Reminder> {
    let mut reminder = find_or_404(repos, id).await?;
    reminder.apply(changes);

    if !repos.reminders.save(&reminder).await? {
        return Err(RestError::NotFound(format!("No reminder with id {}", id)));
    }
    Ok(reminder)
}

#[tracing::instrument(name = "Create a reminder", skip(repos))]
#[post("")]
async fn create(repos: web::Data<Repos>, body: web::Json<NewReminderBody>) -> RestResult<HttpResponse> {
    let new_reminder: NewReminder = body.into_inner().try_into().map_err(RestError::ParseError)?;
    let reminder = Reminder::new(new_reminder);

    repos.reminders.insert(&reminder).await?;
    tracing::info!(reminder.id = %reminder.id, "Reminder created");

    Ok(HttpResponse::Created().json(reminder))
}

#[tracing::instrument(name = "List reminders", skip(repos))]
#[get("")]
async fn list(repos: web::Data<Repos>, query: web::Query<ListQuery>) -> RestResult<HttpResponse> {
    let ListQuery { email, date } = query.into_inner();
    let date = date.as_deref().map(parse_date).transpose()?;

    let reminders = match (email, date) {
        (Some(email), date) => repos
            .reminders
            .find_by_email(&email)
            .await?
            .into_iter()
            .filter(|r| date.map_or(true, |date| r.date == date))
            .collect(),
        (None, Some(date)) => repos.reminders.find_by_date(date).await?,
        (None, None) => repos.reminders.find_all().await?,
    };

    Ok(HttpResponse::Ok().json(reminders))
}

/// Open reminders between today and `days` days from now, earliest first
#[tracing::instrument(name = "List upcoming reminders", skip(repos, clock))]
#[get("/upcoming")]
async fn upcoming(
    repos: web::Data<Repos>,
    clock: web::Data<dyn Clock>,
    query: web::Query<UpcomingQuery>,
) -> RestResult<HttpResponse> {
    let UpcomingQuery { email, days } = query.into_inner();
    let days = days.unwrap_or(DEFAULT_UPCOMING_DAYS);
    if days > MAX_UPCOMING_DAYS {
        return Err(RestError::ParseError(format!(
            "days must be at most {}",
            MAX_UPCOMING_DAYS
        )));
    }

    let today = clock.now().date();
    let until = today + Duration::days(i64::from(days));

    let reminders = match email {
        Some(email) => repos.reminders.find_by_email(&email).await?,
        None => repos.reminders.find_all().await?,
    };
    let mut reminders: Vec<Reminder> = reminders
        .into_iter()
        .filter(|r| !r.is_completed && r.date >= today && r.date <= until)
        .collect();
    reminders.sort_by_key(|r| (r.date, r.time));

    Ok(HttpResponse::Ok().json(reminders))
}

#[tracing::instrument(name = "Get a reminder", skip(repos))]
#[get("/{id}")]
async fn read(repos: web::Data<Repos>, path: web::Path<Uuid>) -> RestResult<HttpResponse> {
    let reminder = find_or_404(&repos, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(reminder))
}

#[tracing::instrument(name = "Update a reminder", skip(repos))]
#[patch("/{id}")]
async fn modify(
    repos: web::Data<Repos>,
    path: web::Path<Uuid>,
    body: web::Json<ReminderPatchBody>,
) -> RestResult<HttpResponse> {
    let changes: ReminderChanges = body.into_inner().try_into().map_err(RestError::ParseError)?;
    let reminder = update(&repos, path.into_inner(), changes).await?;

    Ok(HttpResponse::Ok().json(reminder))
}

#[tracing::instrument(name = "Toggle a reminder", skip(repos))]
#[post("/{id}/toggle")]
async fn toggle(repos: web::Data<Repos>, path: web::Path<Uuid>) -> RestResult<HttpResponse> {
    let id = path.into_inner();
    let current = find_or_404(&repos, id).await?;
    let changes = ReminderChanges {
        is_completed: Some(!current.is_completed),
        ..Default::default()
    };
    let reminder = update(&repos, id, changes).await?;

    Ok(HttpResponse::Ok().json(reminder))
}

#[tracing::instrument(name = "Delete a reminder", skip(repos))]
#[delete("/{id}")]
async fn remove(repos: web::Data<Repos>, path: web::Path<Uuid>) -> RestResult<HttpResponse> {
    let id = path.into_inner();
    if !repos.reminders.delete(id).await? {
        return Err(RestError::NotFound(format!("No reminder with id {}", id)));
    }

    Ok(HttpResponse::Ok().json(serde_json::json!({ "success": true, "id": id })))
}

/// Reminder API endpoints
pub fn scope() -> impl HttpServiceFactory {
    // `/upcoming` must come before `/{id}`
    web::scope("/reminders")
        .service(create)
        .service(list)
        .service(upcoming)
        .service(read)
        .service(modify)
        .service(toggle)
        .service(remove)
}
