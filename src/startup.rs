use std::net::TcpListener;

use actix_web::dev::Server;
use actix_web::web;
use actix_web::web::Data;
use actix_web::App;
use actix_web::HttpServer;
use actix_web_lab::middleware::from_fn;
use anyhow::Context;
use tracing_actix_web::TracingLogger;

use crate::configuration::Settings;
use crate::cors::attach_cors_headers;
use crate::cors::CorsPolicy;
use crate::email_client::EmailClient;
use crate::routes::method_not_allowed;
use crate::routes::preflight;
use crate::routes::relay;
use crate::routes::RelayOptions;

/// Wrapper for actix's `Server` with access to the bound port. Not to be
/// confused with actix's `App`!
pub struct Application {
    /// Left private; use `get_port` to access
    port: u16,
    server: Server,
}

impl Application {
    /// Bind the listener and build the server (and email client) from `cfg`
    pub async fn build(cfg: Settings) -> Result<Self, anyhow::Error> {
        let addr = format!("{}:{}", cfg.application.host, cfg.application.port);
        let listener =
            TcpListener::bind(&addr).with_context(|| format!("could not bind to {addr}"))?;

        // with port 0, the OS picks the port; it is saved in the `port` field
        let port = listener.local_addr()?.port();

        let email_client = cfg
            .email_client
            .client()
            .context("could not build email client")?;
        let cors = CorsPolicy::new(&cfg.application.allowed_origin)
            .with_context(|| format!("invalid origin: {:?}", cfg.application.allowed_origin))?;
        let options = RelayOptions {
            validate_recipient: cfg.application.validate_recipient,
        };

        let server = run(
            listener,
            email_client,
            cors,
            options,
            cfg.application.max_payload_bytes,
        )?;

        Ok(Self { port, server })
    }

    pub fn get_port(&self) -> u16 { self.port }

    /// Because this consumes `self`, this should be the final function call (or
    /// passed to `tokio::spawn`)
    pub async fn run_until_stopped(self) -> Result<(), std::io::Error> { self.server.await }
}

/// The server is not responsible for binding to an address, it only listens to
/// an already bound address.
///
/// Every path is served by the same resource: `POST` relays, `OPTIONS`
/// answers preflights, anything else is 405.
pub fn run(
    listener: TcpListener,
    email_client: EmailClient,
    cors: CorsPolicy,
    options: RelayOptions,
    max_payload_bytes: usize,
) -> Result<Server, anyhow::Error> {
    // `Data` is an `Arc` internally; every worker gets a clone of the same client
    let email_client = Data::new(email_client);
    let cors = Data::new(cors);
    let options = Data::new(options);

    // the closure runs once per worker, hence the clones
    let server = HttpServer::new(move || {
        App::new()
            // the last `wrap` is the outermost; CORS headers are added inside the request span
            .wrap(from_fn(attach_cors_headers))
            .wrap(TracingLogger::default())
            .service(
                web::resource("/{tail:.*}")
                    .route(web::post().to(relay))
                    .route(web::method(actix_web::http::Method::OPTIONS).to(preflight))
                    .default_service(web::to(method_not_allowed)),
            )
            .app_data(web::PayloadConfig::new(max_payload_bytes))
            .app_data(email_client.clone())
            .app_data(cors.clone())
            .app_data(options.clone())
    })
    .listen(listener)?
    .run();

    Ok(server)
}
