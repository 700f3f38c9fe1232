use std::fmt::Debug;

use actix_web::body::BoxBody;
use actix_web::http::header;
use actix_web::http::StatusCode;
use actix_web::web;
use actix_web::HttpResponse;
use actix_web::ResponseError;
use serde_json::json;
use serde_json::Value;

use super::error_chain_fmt;
use crate::cors::ALLOWED_METHODS;
use crate::domain::EmailRequest;
use crate::domain::EmailRequestError;
use crate::email_client::EmailClient;
use crate::email_client::SendError;

/// Per-app knobs for request validation
#[derive(Clone, Debug)]
pub struct RelayOptions {
    pub validate_recipient: bool,
}

#[derive(thiserror::Error)]
pub enum RelayError {
    #[error(transparent)]
    InvalidRequest(#[from] EmailRequestError),
    // the parser's own message is what the caller gets
    #[error("{0}")]
    MalformedBody(#[source] serde_json::Error),
    #[error("Payload exceeds the maximum allowed size")]
    PayloadTooLarge,
    #[error(transparent)]
    Upstream(#[from] SendError),
    #[error(transparent)]
    UnexpectedError(#[from] anyhow::Error),
}

impl Debug for RelayError {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

impl RelayError {
    /// Sort out body extraction failures; only an oversized body is the
    /// caller's fault.
    fn from_payload_error(e: actix_web::Error) -> Self {
        match e.as_response_error().status_code() {
            StatusCode::PAYLOAD_TOO_LARGE => Self::PayloadTooLarge,
            _ => Self::UnexpectedError(anyhow::anyhow!("Failed to read request body: {e}")),
        }
    }
}

impl ResponseError for RelayError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Self::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Upstream(SendError::UnreadableBody { .. }) => StatusCode::BAD_GATEWAY,
            Self::MalformedBody(_)
            | Self::Upstream(SendError::Transport(_))
            | Self::UnexpectedError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Always `{"error": <Display>}`; the cause chain stays in the logs
    fn error_response(&self) -> HttpResponse<BoxBody> {
        let mut body = json!({ "error": self.to_string() });
        if let Self::Upstream(SendError::UnreadableBody { status, .. }) = self {
            body["upstream_status"] = status.as_u16().into();
        }
        HttpResponse::build(self.status_code()).json(body)
    }
}

/// `POST /{any}`
///
/// Relay `{ to, subject, html }` to the email API and answer with whatever it
/// answered: 200 and its body on success, its own status and body otherwise.
///
/// # Request example
///
/// ```sh
///     curl -v -H 'Content-Type: application/json' \
///         --data '{"to":"a@b.com","subject":"S","html":"<p>H</p>"}' \
///         http://127.0.0.1:8000
/// ```
///
/// The body is taken as raw bytes rather than `web::Json`, since a body that
/// isn't JSON must produce a 500 rather than actix's default 400.
#[tracing::instrument(
    name = "Relaying email",
    skip(body, email_client, options),
    fields(
        recipient = tracing::field::Empty,
        upstream_status = tracing::field::Empty,
    )
)]
pub async fn relay(
    body: Result<web::Bytes, actix_web::Error>,
    email_client: web::Data<EmailClient>,
    options: web::Data<RelayOptions>,
) -> Result<HttpResponse, RelayError> {
    let body = body.map_err(RelayError::from_payload_error)?;
    let body: Value = serde_json::from_slice(&body).map_err(RelayError::MalformedBody)?;
    let email = EmailRequest::parse(&body, options.validate_recipient)?;

    tracing::Span::current().record("recipient", tracing::field::display(email.to.as_ref()));

    let result = email_client
        .send_email(&email.to, &email.subject, &email.html)
        .await
        .map_err(|e| {
            tracing::error!(
                error.cause_chain=?e,
                error.message=%e,
                "email API call failed"
            );
            e
        })?;

    tracing::Span::current().record("upstream_status", result.status.as_u16());

    // reqwest and actix don't share a `StatusCode` type
    let status = match result.status.is_success() {
        true => StatusCode::OK,
        false => StatusCode::from_u16(result.status.as_u16())
            .map_err(|e| RelayError::UnexpectedError(e.into()))?,
    };
    if !status.is_success() {
        tracing::warn!(
            upstream_status = status.as_u16(),
            "email API rejected the request"
        );
    }

    Ok(HttpResponse::build(status).json(result.body))
}

/// `OPTIONS /{any}`
///
/// Browser preflight; the CORS middleware supplies the headers.
pub async fn preflight() -> HttpResponse { HttpResponse::NoContent().finish() }

/// Every other method
pub async fn method_not_allowed() -> HttpResponse {
    HttpResponse::MethodNotAllowed()
        .insert_header((header::ALLOW, ALLOWED_METHODS))
        .json(json!({ "error": "Method Not Allowed" }))
}
