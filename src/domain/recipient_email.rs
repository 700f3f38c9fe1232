use validator::ValidateEmail;

/// The `to` of an inbound request. Always non-empty; only syntactically
/// checked when constructed via `parse`.
#[derive(Debug, Clone, PartialEq)]
pub struct RecipientEmail(String);

impl RecipientEmail {
    /// Accept any non-empty string. The upstream API is left to reject what it
    /// can't deliver to.
    pub fn new(email: String) -> Result<Self, String> {
        match email.is_empty() {
            true => Err("Empty recipient".to_string()),
            false => Ok(Self(email)),
        }
    }

    /// Accept only syntactically valid addresses
    pub fn parse(email: String) -> Result<Self, String> {
        ValidateEmail::validate_email(&email)
            .then(|| Self(email.clone()))
            .ok_or(format!("Invalid recipient: {email:?}"))
    }
}

impl AsRef<str> for RecipientEmail {
    fn as_ref(&self) -> &str { &self.0 }
}
