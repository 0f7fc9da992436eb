use actix_web::dev::HttpServiceFactory;
use actix_web::{get, post, route, web, HttpResponse};

use chrono::{DateTime, Utc};

use serde::{Deserialize, Serialize};

use crate::client::Email;
use crate::error::{Error, RestError, RestResult};
use crate::notification::{EmailNotifier, NotificationEngine, TickReport};

/// How many keys the test endpoint echoes back
const RECENT_NOTIFICATIONS: usize = 5;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CheckResponse {
    success: bool,
    message: &'static str,
    timestamp: DateTime<Utc>,
    summary: TickReport,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TestResponse {
    success: bool,
    message: &'static str,
    is_running: bool,
    sent_notifications_count: usize,
    sent_notifications: Vec<String>,
    timestamp: DateTime<Utc>,
    summary: TickReport,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct StatusResponse {
    success: bool,
    is_running: bool,
    sent_notifications: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ControlResponse {
    success: bool,
    message: &'static str,
    is_running: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<TickReport>,
}

#[derive(Debug, Serialize)]
struct EmailStatusResponse {
    success: bool,
    message: &'static str,
}

#[derive(Debug, Serialize)]
struct EmailSentResponse {
    success: bool,
    message: &'static str,
    to: String,
}

#[derive(Debug, Deserialize)]
pub struct ControlBody {
    action: String,
}

/// JSON body for a one-off email; at least one of `html` and `text` is required
#[derive(Debug, Deserialize)]
pub struct TestEmailBody {
    to: String,
    subject: String,
    #[serde(default)]
    html: Option<String>,
    #[serde(default)]
    text: Option<String>,
}

impl TryFrom<TestEmailBody> for Email {
    type Error = String;

    fn try_from(body: TestEmailBody) -> Result<Self, Self::Error> {
        let subject = body.subject.trim();
        if subject.is_empty() {
            return Err("subject must not be empty".into());
        }
        if body.html.is_none() && body.text.is_none() {
            return Err("Either html or text is required".into());
        }

        Ok(Self {
            recipient: body.to.trim().parse()?,
            subject: subject.to_string(),
            html_body: body.html.unwrap_or_default(),
            text_body: body.text.unwrap_or_default(),
            tag: "test",
        })
    }
}

/// Engine operations exposed through the control endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Start,
    Stop,
    Check,
    Reset,
}

impl TryFrom<ControlBody> for Action {
    type Error = RestError;

    fn try_from(body: ControlBody) -> RestResult<Self> {
        match body.action.trim().to_lowercase().as_str() {
            "start" => Ok(Self::Start),
            "stop" => Ok(Self::Stop),
            "check" => Ok(Self::Check),
            "reset" => Ok(Self::Reset),
            other => Err(RestError::ParseError(format!(
                "Unknown action '{}', expected one of start, stop, check, reset",
                other
            ))),
        }
    }
}

/// Run one check now and fail loudly if the stores could not be read
async fn checked_tick(engine: &NotificationEngine) -> RestResult<TickReport> {
    let report = engine.tick().await;
    match &report.error {
        Some(error) => Err(RestError::InternalError(format!(
            "Notification check failed: {}",
            error
        ))),
        None => Ok(report),
    }
}

/// Trigger endpoint for external schedulers; runs one check
#[tracing::instrument(name = "Scheduled notification check", skip(engine))]
#[route("/cron", method = "GET", method = "POST")]
pub async fn cron(engine: web::Data<NotificationEngine>) -> RestResult<HttpResponse> {
    let summary = checked_tick(engine.get_ref()).await?;

    Ok(HttpResponse::Ok().json(CheckResponse {
        success: true,
        message: "Notification check completed",
        timestamp: Utc::now(),
        summary,
    }))
}

#[tracing::instrument(name = "Notification status", skip(engine))]
#[get("")]
async fn status(engine: web::Data<NotificationEngine>) -> HttpResponse {
    HttpResponse::Ok().json(StatusResponse {
        success: true,
        is_running: engine.is_running(),
        sent_notifications: engine.sent_notifications(),
    })
}

#[tracing::instrument(name = "Control the notification engine", skip(engine))]
#[post("")]
async fn control(
    engine: web::Data<NotificationEngine>,
    body: web::Json<ControlBody>,
) -> RestResult<HttpResponse> {
    let action: Action = body.into_inner().try_into()?;

    let (message, summary) = match action {
        Action::Start => {
            let message = if engine.start() {
                "Notification engine started"
            } else {
                "Notification engine is already running"
            };
            (message, None)
        }
        Action::Stop => {
            let message = if engine.stop() {
                "Notification engine stopped"
            } else {
                "Notification engine is not running"
            };
            (message, None)
        }
        Action::Check => {
            let summary = checked_tick(engine.get_ref()).await?;
            ("Notification check completed", Some(summary))
        }
        Action::Reset => {
            engine.reset_sent_notifications();
            ("Sent notification records cleared", None)
        }
    };

    Ok(HttpResponse::Ok().json(ControlResponse {
        success: true,
        message,
        is_running: engine.is_running(),
        summary,
    }))
}

/// Manual test trigger. Reports the timer and ledger as they were before running one check.
#[tracing::instrument(name = "Test notification check", skip(engine))]
#[route("/test", method = "GET", method = "POST")]
async fn test_check(engine: web::Data<NotificationEngine>) -> RestResult<HttpResponse> {
    let is_running = engine.is_running();
    let sent = engine.sent_notifications();
    let recent = sent[sent.len().saturating_sub(RECENT_NOTIFICATIONS)..].to_vec();

    let summary = checked_tick(engine.get_ref()).await?;

    Ok(HttpResponse::Ok().json(TestResponse {
        success: true,
        message: "Notification test completed",
        is_running,
        sent_notifications_count: sent.len(),
        sent_notifications: recent,
        timestamp: Utc::now(),
        summary,
    }))
}

/// Fails unless the email API credentials are set
#[tracing::instrument(name = "Check email delivery", skip(notifier))]
#[get("/email")]
async fn email_status(notifier: web::Data<EmailNotifier>) -> RestResult<HttpResponse> {
    if !notifier.is_configured() {
        return Err(Error::EmailNotConfigured.into());
    }

    Ok(HttpResponse::Ok().json(EmailStatusResponse {
        success: true,
        message: "Email delivery is configured",
    }))
}

#[tracing::instrument(name = "Send a test email", skip(notifier, body))]
#[post("/email")]
async fn send_email(
    notifier: web::Data<EmailNotifier>,
    body: web::Json<TestEmailBody>,
) -> RestResult<HttpResponse> {
    let email: Email = body.into_inner().try_into().map_err(RestError::ParseError)?;
    notifier.send_message(&email).await?;

    Ok(HttpResponse::Ok().json(EmailSentResponse {
        success: true,
        message: "Test email sent",
        to: email.recipient.to_string(),
    }))
}

/// Notification engine API endpoints
pub fn scope() -> impl HttpServiceFactory {
    web::scope("/notifications")
        .service(status)
        .service(control)
        .service(test_check)
        .service(email_status)
        .service(send_email)
}
