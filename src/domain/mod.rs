mod email_request;
mod recipient_email;
// allow external `use` statements to skip `email_request` etc
pub use email_request::EmailRequest;
pub use email_request::EmailRequestError;
pub use recipient_email::RecipientEmail;
