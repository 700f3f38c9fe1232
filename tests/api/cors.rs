use std::net::TcpListener;

use reqwest::Method;
use reqwest::Response;
use wiremock::matchers::any;
use wiremock::Mock;
use wiremock::ResponseTemplate;

use crate::helpers::spawn_app;
use crate::helpers::spawn_app_with;
use crate::helpers::valid_email;

fn assert_cors(
    resp: &Response,
    origin: &str,
) {
    let headers = resp.headers();
    assert_eq!(
        headers.get("Access-Control-Allow-Origin").unwrap(),
        origin,
        "{}",
        resp.status()
    );
    assert_eq!(
        headers.get("Access-Control-Allow-Methods").unwrap(),
        "POST, OPTIONS"
    );
    assert_eq!(
        headers.get("Access-Control-Allow-Headers").unwrap(),
        "Content-Type"
    );
}

/// Browsers can only read error bodies if the headers are there too, so every
/// outcome is checked
#[tokio::test]
async fn every_response_carries_cors_headers() {
    let app = spawn_app().await;

    Mock::given(any())
        .respond_with(
            ResponseTemplate::new(422).set_body_json(serde_json::json!({ "error": "nope" })),
        )
        .mount(&app.email_server)
        .await;

    let preflight = app.request(Method::OPTIONS, "/").await;
    assert_cors(&preflight, "*");

    let not_allowed = app.request(Method::GET, "/").await;
    assert_cors(&not_allowed, "*");

    let missing = app.post_email(&serde_json::json!({ "to": "a@b.com" })).await;
    assert_eq!(missing.status().as_u16(), 400);
    assert_cors(&missing, "*");

    let malformed = app.post_raw("not json").await;
    assert_eq!(malformed.status().as_u16(), 500);
    assert_cors(&malformed, "*");

    let rejected = app.post_email(&valid_email()).await;
    assert_eq!(rejected.status().as_u16(), 422);
    assert_cors(&rejected, "*");

    let small = spawn_app_with(|cfg| cfg.application.max_payload_bytes = 1024).await;
    let oversized = serde_json::json!({ "to": "a@b.com", "subject": "S", "html": "x".repeat(4096) });
    let too_large = small.post_email(&oversized).await;
    assert_eq!(too_large.status().as_u16(), 413);
    assert_cors(&too_large, "*");

    let garbled = spawn_app().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>ok</html>"))
        .mount(&garbled.email_server)
        .await;
    let unreadable = garbled.post_email(&valid_email()).await;
    assert_eq!(unreadable.status().as_u16(), 502);
    assert_cors(&unreadable, "*");

    // nothing listens on a port that was bound and released
    let closed_port = {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let offline = spawn_app_with(|cfg| {
        cfg.email_client.base_url = format!("http://127.0.0.1:{closed_port}");
    })
    .await;
    let unreachable = offline.post_email(&valid_email()).await;
    assert_eq!(unreachable.status().as_u16(), 500);
    assert_cors(&unreachable, "*");
}

#[tokio::test]
async fn configured_origin() {
    let origin = "https://order.example.com";
    let app = spawn_app_with(|cfg| cfg.application.allowed_origin = origin.to_string()).await;

    Mock::given(any())
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "id": "1" })))
        .mount(&app.email_server)
        .await;

    let preflight = app.request(Method::OPTIONS, "/").await;
    assert_cors(&preflight, origin);
    assert_eq!(preflight.headers().get("Vary").unwrap(), "Origin");

    let ok = app.post_email(&valid_email()).await;
    assert_eq!(ok.status().as_u16(), 200);
    assert_cors(&ok, origin);
}
