use tracing::subscriber::set_global_default;
use tracing::Subscriber;
use tracing_bunyan_formatter::BunyanFormattingLayer;
use tracing_bunyan_formatter::JsonStorageLayer;
use tracing_log::LogTracer;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::Registry;

/// Compose a bunyan (JSON) subscriber. `RUST_LOG` takes precedence over
/// `filter_level`.
///
/// Note: `sink` must be a closure (e.g. `std::io::stdout`), not a return value.
pub fn get_subscriber<Sink>(
    name: &str,
    filter_level: &str,
    sink: Sink,
) -> impl Subscriber + Send + Sync
where
    // sink must implement `MakeWriter` for all choices of the lifetime parameter `'a`
    Sink: for<'a> MakeWriter<'a> + Send + Sync + 'static,
{
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter_level));
    let fmt_layer = BunyanFormattingLayer::new(name.to_string(), sink);
    Registry::default()
        .with(env_filter)
        .with(JsonStorageLayer)
        .with(fmt_layer)
}

/// Register `subscriber` globally. Must be called once, before the app is
/// built.
pub fn init_subscriber(subscriber: impl Subscriber + Send + Sync) {
    // required for `actix_web` (`log`) records to reach the subscriber
    LogTracer::init().expect("failed to set logger");
    set_global_default(subscriber).expect("failed to set subscriber");
}
