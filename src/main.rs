use email_relay::configuration::get_configuration;
use email_relay::startup::Application;
use email_relay::telemetry::get_subscriber;
use email_relay::telemetry::init_subscriber;

/// Initialise telemetry, load config, and start the server
#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let subscriber = get_subscriber("email-relay", "info", std::io::stdout);
    init_subscriber(subscriber);

    let cfg = get_configuration()?;
    let app = Application::build(cfg).await?;
    tracing::info!(port = app.get_port(), "listening");

    app.run_until_stopped().await?;
    Ok(())
}
