use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};

use serde::Serialize;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by stores and outbound clients
#[derive(Debug, Error)]
pub enum Error {
    #[error("Email delivery is not configured")]
    EmailNotConfigured,

    #[error("Failed to send email: {0}")]
    SendEmailError(#[from] reqwest::Error),

    #[error(transparent)]
    DatabaseError(#[from] sqlx::Error),
}

pub type RestResult<T> = std::result::Result<T, RestError>;

/// Errors returned from REST endpoints, rendered as `{ success: false, error, details }`
#[derive(Debug, Error)]
pub enum RestError {
    #[error("Parse Error: {0}")]
    ParseError(String),

    #[error("Not Found: {0}")]
    NotFound(String),

    #[error("Internal Server Error: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl RestError {
    fn label(&self) -> &'static str {
        match self {
            Self::ParseError(_) => "Invalid request",
            Self::NotFound(_) => "Not found",
            Self::InternalError(_) | Self::Other(_) => "Internal server error",
        }
    }
}

impl From<Error> for RestError {
    fn from(e: Error) -> Self {
        tracing::error!(error.cause_chain = ?e, "Request failed");
        match e {
            Error::EmailNotConfigured => {
                Self::InternalError("Email delivery is not configured".into())
            }
            Error::SendEmailError(_) => Self::InternalError("Failed to send email".into()),
            Error::DatabaseError(_) => Self::InternalError("Database error".into()),
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    success: bool,
    error: &'a str,
    details: String,
}

impl ResponseError for RestError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::ParseError(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::InternalError(_) | Self::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorBody {
            success: false,
            error: self.label(),
            details: self.to_string(),
        })
    }
}
