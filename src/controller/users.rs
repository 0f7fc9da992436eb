use actix_web::dev::HttpServiceFactory;
use actix_web::{delete, get, patch, post, put, web, HttpResponse};

use serde::{Deserialize, Serialize};

use uuid::Uuid;

use crate::domain::{EmailAddress, PersonName, ReminderTime};
use crate::error::{RestError, RestResult};
use crate::model::{NewUser, NotificationPreferences, User, UserChanges};
use crate::repo::Repos;

use super::ClientContext;

/// Notification preferences as sent by clients; absent fields keep their current value
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreferencesBody {
    email_notifications: Option<bool>,
    digest_time: Option<String>,
    advance_notification: Option<bool>,
    advance_minutes: Option<u32>,
}

impl PreferencesBody {
    fn merge_into(self, base: NotificationPreferences) -> Result<NotificationPreferences, String> {
        let mut preferences = base;

        if let Some(enabled) = self.email_notifications {
            preferences.email_notifications = enabled;
        }
        if let Some(digest_time) = self.digest_time {
            preferences.digest_time = digest_time.parse::<ReminderTime>()?.into();
        }
        if let Some(enabled) = self.advance_notification {
            preferences.advance_notification = enabled;
        }
        if let Some(minutes) = self.advance_minutes {
            if minutes > NotificationPreferences::MAX_ADVANCE_MINUTES {
                return Err(format!(
                    "advanceMinutes must be at most {}",
                    NotificationPreferences::MAX_ADVANCE_MINUTES
                ));
            }
            preferences.advance_minutes = minutes;
        }

        Ok(preferences)
    }
}

/// JSON body for registering a user
#[derive(Debug, Deserialize)]
pub struct NewUserBody {
    email: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    preferences: Option<PreferencesBody>,
}

impl TryFrom<NewUserBody> for NewUser {
    type Error = String;

    fn try_from(body: NewUserBody) -> Result<Self, Self::Error> {
        Ok(Self {
            email: body.email.parse()?,
            name: parse_name(body.name)?,
            preferences: body
                .preferences
                .unwrap_or_default()
                .merge_into(NotificationPreferences::default())?,
        })
    }
}

/// JSON body for a partial user update; `"name": null` clears the name
#[derive(Debug, Deserialize)]
pub struct UserPatchBody {
    #[serde(default)]
    email: Option<String>,
    #[serde(default, deserialize_with = "super::double_option")]
    name: Option<Option<String>>,
    #[serde(default)]
    preferences: Option<PreferencesBody>,
}

impl UserPatchBody {
    fn into_changes(self, user: &User) -> Result<UserChanges, String> {
        Ok(UserChanges {
            email: self.email.map(|email| email.parse()).transpose()?,
            name: self.name.map(parse_name).transpose()?,
            preferences: self
                .preferences
                .map(|preferences| preferences.merge_into(user.preferences))
                .transpose()?,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentUserBody {
    user_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    email: Option<String>,
}

#[derive(Debug, Serialize)]
struct CurrentUserResponse {
    success: bool,
    user: Option<User>,
}

/// A blank name is the same as no name
fn parse_name(name: Option<String>) -> Result<Option<PersonName>, String> {
    match name.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(name) => name.parse().map(Some),
    }
}

async fn find_or_404(repos: &Repos, id: Uuid) -> RestResult<User> {
    repos
        .users
        .find(id)
        .await?
        .ok_or_else(|| RestError::NotFound(format!("No user with id {}", id)))
}

/// Register a user, or sign in as the existing user with that address.
/// Either way the user becomes the client's current user.
#[tracing::instrument(name = "Register a user", skip(repos))]
#[post("")]
async fn create(
    repos: web::Data<Repos>,
    client: ClientContext,
    body: web::Json<NewUserBody>,
) -> RestResult<HttpResponse> {
    let new_user: NewUser = body.into_inner().try_into().map_err(RestError::ParseError)?;

    if let Some(existing) = repos.users.find_by_email(new_user.email.as_ref()).await? {
        repos.users.set_current(client.as_ref(), Some(existing.id)).await?;
        return Ok(HttpResponse::Ok().json(existing));
    }

    let user = User::new(new_user);
    repos.users.insert(&user).await?;
    repos.users.set_current(client.as_ref(), Some(user.id)).await?;
    tracing::info!(user.id = %user.id, "User registered");

    Ok(HttpResponse::Created().json(user))
}

/// All users, or the single user registered under `?email=`
#[tracing::instrument(name = "List users", skip(repos))]
#[get("")]
async fn list(repos: web::Data<Repos>, query: web::Query<ListQuery>) -> RestResult<HttpResponse> {
    match &query.email {
        Some(email) => {
            let user = repos
                .users
                .find_by_email(email.trim())
                .await?
                .ok_or_else(|| RestError::NotFound(format!("No user with email {}", email)))?;
            Ok(HttpResponse::Ok().json(user))
        }
        None => Ok(HttpResponse::Ok().json(repos.users.find_all().await?)),
    }
}

#[tracing::instrument(name = "Get the current user", skip(repos))]
#[get("/current")]
async fn current(repos: web::Data<Repos>, client: ClientContext) -> RestResult<HttpResponse> {
    let user = repos.users.current(client.as_ref()).await?;

    Ok(HttpResponse::Ok().json(CurrentUserResponse {
        success: true,
        user,
    }))
}

#[tracing::instrument(name = "Switch the current user", skip(repos))]
#[put("/current")]
async fn switch_current(
    repos: web::Data<Repos>,
    client: ClientContext,
    body: web::Json<CurrentUserBody>,
) -> RestResult<HttpResponse> {
    let user = find_or_404(&repos, body.user_id).await?;
    repos.users.set_current(client.as_ref(), Some(user.id)).await?;

    Ok(HttpResponse::Ok().json(CurrentUserResponse {
        success: true,
        user: Some(user),
    }))
}

#[tracing::instrument(name = "Log out", skip(repos))]
#[delete("/current")]
async fn logout(repos: web::Data<Repos>, client: ClientContext) -> RestResult<HttpResponse> {
    repos.users.set_current(client.as_ref(), None).await?;

    Ok(HttpResponse::Ok().json(CurrentUserResponse {
        success: true,
        user: None,
    }))
}

#[tracing::instrument(name = "Get a user", skip(repos))]
#[get("/{id}")]
async fn read(repos: web::Data<Repos>, path: web::Path<Uuid>) -> RestResult<HttpResponse> {
    let user = find_or_404(&repos, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(user))
}

#[tracing::instrument(name = "Update a user", skip(repos))]
#[patch("/{id}")]
async fn modify(
    repos: web::Data<Repos>,
    path: web::Path<Uuid>,
    body: web::Json<UserPatchBody>,
) -> RestResult<HttpResponse> {
    let mut user = find_or_404(&repos, path.into_inner()).await?;
    let changes = body
        .into_inner()
        .into_changes(&user)
        .map_err(RestError::ParseError)?;

    if let Some(email) = &changes.email {
        ensure_email_available(&repos, email, user.id).await?;
    }

    user.apply(changes);
    if !repos.users.save(&user).await? {
        return Err(RestError::NotFound(format!("No user with id {}", user.id)));
    }

    Ok(HttpResponse::Ok().json(user))
}

#[tracing::instrument(name = "Delete a user", skip(repos))]
#[delete("/{id}")]
async fn remove(repos: web::Data<Repos>, path: web::Path<Uuid>) -> RestResult<HttpResponse> {
    let id = path.into_inner();
    if !repos.users.delete(id).await? {
        return Err(RestError::NotFound(format!("No user with id {}", id)));
    }

    Ok(HttpResponse::Ok().json(serde_json::json!({ "success": true, "id": id })))
}

async fn ensure_email_available(repos: &Repos, email: &EmailAddress, owner: Uuid) -> RestResult<()> {
    match repos.users.find_by_email(email.as_ref()).await? {
        Some(other) if other.id != owner => Err(RestError::ParseError(format!(
            "{} is already registered",
            email
        ))),
        _ => Ok(()),
    }
}

/// User API endpoints
pub fn scope() -> impl HttpServiceFactory {
    // `/current` must come before `/{id}`
    web::scope("/users")
        .service(create)
        .service(list)
        .service(current)
        .service(switch_current)
        .service(logout)
        .service(read)
        .service(modify)
        .service(remove)
}
