use std::time::Duration;

use reqwest::Client;
use reqwest::StatusCode;
use secrecy::ExposeSecret;
use secrecy::Secret;
use serde::Serialize;
use serde_json::Value;

use crate::domain::RecipientEmail;

/// Client for the transactional email API (Resend). Holds the API key, so
/// handlers never see it.
///
/// A single `Client` is kept for the lifetime of the app; connections to the
/// API are pooled and reused across requests.
pub struct EmailClient {
    http_client: Client,
    base_url: String,
    sender: String,
    authorization_token: Secret<String>,
}

/// Body of `POST /emails`
#[derive(Serialize)]
struct SendEmailRequest<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: &'a str,
    html: &'a str,
}

/// Whatever the API answered with, successful or not
#[derive(Debug)]
pub struct RelayResult {
    pub status: StatusCode,
    pub body: Value,
}

#[derive(thiserror::Error, Debug)]
pub enum SendError {
    #[error("Failed to reach the email API: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Email API responded with a body that is not JSON")]
    UnreadableBody {
        status: StatusCode,
        #[source]
        source: serde_json::Error,
    },
}

impl EmailClient {
    pub fn new(
        base_url: String,
        sender: String,
        authorization_token: Secret<String>,
        timeout: Option<Duration>,
    ) -> Result<Self, reqwest::Error> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http_client = builder.build()?;
        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
            sender,
            authorization_token,
        })
    }

    /// Send a single email. A non-2xx answer is not an error here: its status
    /// and body are returned as-is for the caller to relay.
    pub async fn send_email(
        &self,
        recipient: &RecipientEmail,
        subject: &str,
        html_content: &str,
    ) -> Result<RelayResult, SendError> {
        let url = format!("{}/emails", self.base_url);
        let body = SendEmailRequest {
            from: &self.sender,
            to: [recipient.as_ref()],
            subject,
            html: html_content,
        };

        let resp = self
            .http_client
            .post(&url)
            .bearer_auth(self.authorization_token.expose_secret())
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        let bytes = resp.bytes().await?;
        let body = serde_json::from_slice(&bytes)
            .map_err(|source| SendError::UnreadableBody { status, source })?;

        Ok(RelayResult { status, body })
    }
}
