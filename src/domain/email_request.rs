use serde_json::Value;

use super::RecipientEmail;

/// An inbound relay request, after presence checks
#[derive(Debug)]
pub struct EmailRequest {
    pub to: RecipientEmail,
    pub subject: String,
    pub html: String,
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum EmailRequestError {
    #[error("Missing to, subject, or html")]
    MissingFields,
    #[error("{0}")]
    InvalidRecipient(String),
}

/// A field counts as present only if it is a non-empty string; `null`, `""`,
/// numbers etc. are all treated as missing.
fn required_field(
    body: &Value,
    key: &str,
) -> Option<String> {
    body.get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
}

impl EmailRequest {
    /// Extract `to`, `subject` and `html` from an already decoded JSON body.
    /// Anything that isn't an object is missing all three.
    pub fn parse(
        body: &Value,
        validate_recipient: bool,
    ) -> Result<Self, EmailRequestError> {
        let (Some(to), Some(subject), Some(html)) = (
            required_field(body, "to"),
            required_field(body, "subject"),
            required_field(body, "html"),
        ) else {
            return Err(EmailRequestError::MissingFields);
        };

        let to = match validate_recipient {
            true => RecipientEmail::parse(to).map_err(EmailRequestError::InvalidRecipient)?,
            false => RecipientEmail::new(to).map_err(|_| EmailRequestError::MissingFields)?,
        };

        Ok(Self { to, subject, html })
    }
}
