use std::env;
use std::env::current_dir;
use std::fmt::Display;
use std::time::Duration;

use config::Config;
use config::ConfigError;
use secrecy::Secret;
use serde::Deserialize;
use serde_aux::field_attributes::deserialize_number_from_string;
use serde_aux::field_attributes::deserialize_option_number_from_string;

use crate::email_client::EmailClient;

/// Global configuration, loaded from `configuration/*.yaml` and `APP_*` env
/// vars. See `get_configuration`.
#[derive(Deserialize, Clone)]
pub struct Settings {
    pub application: ApplicationSettings,
    pub email_client: EmailClientSettings,
}

/// Server configuration
#[derive(Deserialize, Clone)]
pub struct ApplicationSettings {
    /// Should be localhost on dev machine, 0.0.0.0 on prod
    pub host: String,

    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub port: u16,

    /// Value of `Access-Control-Allow-Origin`; either `*` or a single origin
    pub allowed_origin: String,

    /// Reject recipients that are not syntactically valid email addresses.
    /// Off by default, in which case `to` is only checked for presence.
    pub validate_recipient: bool,

    /// Upper bound on the inbound request body
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub max_payload_bytes: usize,
}

/// Upstream (Resend) configuration
#[derive(Deserialize, Clone)]
pub struct EmailClientSettings {
    pub base_url: String,

    /// Fixed `from` of every relayed email. Free-form (`Name <addr>` is
    /// allowed), so it is not parsed as a bare address.
    pub sender: String,

    /// Resend API key, sent as a bearer token. Never logged.
    pub authorization_token: Secret<String>,

    /// Upper bound on the upstream call. Unset by default, in which case the
    /// call is only bounded by the hosting environment's request lifetime.
    #[serde(default, deserialize_with = "deserialize_option_number_from_string")]
    pub timeout_milliseconds: Option<u64>,
}

impl EmailClientSettings {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_milliseconds.map(Duration::from_millis)
    }

    pub fn client(&self) -> Result<EmailClient, reqwest::Error> {
        EmailClient::new(
            self.base_url.clone(),
            self.sender.clone(),
            self.authorization_token.clone(),
            self.timeout(),
        )
    }
}

#[derive(Debug, PartialEq)]
pub enum Environment {
    Local,
    Production,
}

impl Display for Environment {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Environment::Local => "local",
                Environment::Production => "production",
            }
        )
    }
}

impl TryFrom<String> for Environment {
    type Error = String;
    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.to_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "production" => Ok(Self::Production),
            e => Err(format!("Invalid environment: {e}")),
        }
    }
}

/// Load yaml configuration files at `<project_root>/configuration`:
/// `base.yaml`, then `{APP_ENVIRONMENT}.yaml` (default `local`), then env
/// vars.
///
/// All fields must be present after layering, otherwise initialisation fails
/// and the server does not start. In production the API key is expected to
/// come from `APP_EMAIL_CLIENT__AUTHORIZATION_TOKEN`.
pub fn get_configuration() -> Result<Settings, ConfigError> {
    let cfg_dir = current_dir()
        .map_err(|e| ConfigError::Message(format!("could not get current dir: {e}")))?
        .join("configuration");

    let env: Environment = env::var("APP_ENVIRONMENT")
        .unwrap_or_else(|_| "local".to_string())
        .try_into()
        .map_err(ConfigError::Message)?;

    let settings = Config::builder()
        .add_source(config::File::from(cfg_dir.join("base.yaml")))
        .add_source(config::File::from(cfg_dir.join(format!("{env}.yaml"))))
        .add_source(
            // env vars are always strings; `serde-aux` takes care of the numeric fields
            //
            // `APP_APPLICATION__PORT=5001` -> `Settings.application.port`
            config::Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;

    settings.try_deserialize::<Settings>()
}
