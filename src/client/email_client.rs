use std::time::Duration;

use anyhow::Context;

use reqwest::Client;

use secrecy::Secret;

use serde::Serialize;

use url::Url;

use crate::domain::EmailAddress;
use crate::error::Result;

const POSTMARK_TOKEN_HEADER: &str = "X-Postmark-Server-Token";

/// Client for a Postmark-compatible transactional email API
#[derive(Debug)]
pub struct EmailClient {
    client: Client,
    sender: EmailAddress,

    api_send_email_url: Url,
    api_auth_token: Secret<String>,
}

impl EmailClient {
    pub fn new(
        sender: EmailAddress,
        api_timeout: Duration,
        api_base_url: Url,
        api_auth_token: Secret<String>,
    ) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(api_timeout)
            .build()
            .context("Failed to build http client")?;

        let api_send_email_url = api_base_url
            .join("email")
            .context("Failed to create send email endpoint URL")?;

        Ok(Self {
            client,
            sender,
            api_send_email_url,
            api_auth_token,
        })
    }

    #[tracing::instrument(
        name = "Send an email via API",
        skip(self, email),
        fields(recipient = %email.recipient, tag = email.tag)
    )]
    pub async fn send(&self, email: &Email) -> Result<()> {
        use secrecy::ExposeSecret;

        self.client
            .post(self.api_send_email_url.clone())
            .header(POSTMARK_TOKEN_HEADER, self.api_auth_token.expose_secret())
            .json(&email.as_request(&self.sender))
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}

/// A rendered email, ready to hand to the API
#[derive(Debug, Clone)]
pub struct Email {
    pub recipient: EmailAddress,
    pub subject: String,
    pub html_body: String,
    pub text_body: String,
    /// Category tag reported back by the API for filtering and statistics
    pub tag: &'static str,
}

impl Email {
    fn as_request<'e>(&'e self, sender: &'e EmailAddress) -> SendEmailRequest<'e> {
        SendEmailRequest {
            from: sender.as_ref(),
            to: self.recipient.as_ref(),
            subject: &self.subject,
            html_body: &self.html_body,
            text_body: &self.text_body,
            tag: self.tag,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct SendEmailRequest<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    html_body: &'a str,
    text_body: &'a str,
    tag: &'a str,
}
