use std::future::{ready, Ready};

use actix_web::{dev, FromRequest, HttpRequest};

use crate::error::RestError;

pub const CLIENT_ID_HEADER: &str = "X-Client-Id";

/// Requests without a client header share this context
const DEFAULT_CLIENT_ID: &str = "default";
const MAX_CLIENT_ID_LEN: usize = 128;

/// Identity of the calling client, used to remember one current user per client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientContext(String);

impl ClientContext {
    fn from_request_headers(req: &HttpRequest) -> Result<Self, RestError> {
        let Some(value) = req.headers().get(CLIENT_ID_HEADER) else {
            return Ok(Self(DEFAULT_CLIENT_ID.into()));
        };

        let value = value
            .to_str()
            .map_err(|_| RestError::ParseError(format!("{} must be visible ASCII", CLIENT_ID_HEADER)))?
            .trim();

        if value.is_empty() || value.len() > MAX_CLIENT_ID_LEN {
            return Err(RestError::ParseError(format!(
                "{} must be between 1 and {} characters",
                CLIENT_ID_HEADER, MAX_CLIENT_ID_LEN
            )));
        }

        Ok(Self(value.into()))
    }
}

impl AsRef<str> for ClientContext {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromRequest for ClientContext {
    type Error = RestError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut dev::Payload) -> Self::Future {
        ready(Self::from_request_headers(req))
    }
}
