//! HTTP relay in front of a transactional email API (Resend).
//!
//! A browser frontend POSTs `{ to, subject, html }`; the relay forwards it with a
//! server-held API key and hands back the upstream status and body, with CORS
//! headers on every response.

pub mod configuration;
pub mod cors;
pub mod domain;
pub mod email_client;
pub mod routes;
pub mod startup;
pub mod telemetry;
