use reqwest::Method;
use wiremock::matchers::any;
use wiremock::Mock;
use wiremock::ResponseTemplate;

use crate::helpers::spawn_app;

#[tokio::test]
async fn preflight_is_empty_204() {
    let app = spawn_app().await;

    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&app.email_server)
        .await;

    for path in ["/", "/send", "/a/b/c"] {
        let resp = app.request(Method::OPTIONS, path).await;
        assert_eq!(resp.status().as_u16(), 204, "{path}");
        assert!(resp.text().await.unwrap().is_empty(), "{path}");
    }
}

#[tokio::test]
async fn other_methods_are_405() {
    let app = spawn_app().await;

    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&app.email_server)
        .await;

    for method in [
        Method::GET,
        Method::PUT,
        Method::PATCH,
        Method::DELETE,
        Method::HEAD,
    ] {
        let resp = app.request(method.clone(), "/").await;
        assert_eq!(resp.status().as_u16(), 405, "{method}");
        assert_eq!(
            resp.headers().get("Allow").unwrap(),
            "POST, OPTIONS",
            "{method}"
        );
    }
}

#[tokio::test]
async fn method_not_allowed_body_is_json() {
    let app = spawn_app().await;

    let resp = app.request(Method::GET, "/").await;
    assert_eq!(resp.status().as_u16(), 405);

    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "Method Not Allowed");
}

#[tokio::test]
async fn relay_answers_on_any_path() {
    let app = spawn_app().await;

    Mock::given(any())
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "id": "1" })))
        .expect(1)
        .mount(&app.email_server)
        .await;

    let resp = app
        .api_client
        .post(format!("{}/api/send-order", app.addr))
        .json(&crate::helpers::valid_email())
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);
}
