use actix_web::body::MessageBody;
use actix_web::dev::ServiceRequest;
use actix_web::dev::ServiceResponse;
use actix_web::http::header;
use actix_web::http::header::HeaderMap;
use actix_web::http::header::HeaderValue;
use actix_web::http::header::InvalidHeaderValue;
use actix_web::web;
use actix_web_lab::middleware::Next;

/// Methods a browser may use against the relay
pub const ALLOWED_METHODS: &str = "POST, OPTIONS";

/// Cross-origin headers attached to every response, so that browsers can read
/// error bodies too (instead of reporting an opaque network failure).
#[derive(Clone, Debug)]
pub struct CorsPolicy {
    allowed_origin: HeaderValue,
}

impl Default for CorsPolicy {
    fn default() -> Self {
        Self {
            allowed_origin: HeaderValue::from_static("*"),
        }
    }
}

impl CorsPolicy {
    /// `allowed_origin` is either `*` or a single origin
    pub fn new(allowed_origin: &str) -> Result<Self, InvalidHeaderValue> {
        Ok(Self {
            allowed_origin: HeaderValue::from_str(allowed_origin.trim())?,
        })
    }

    fn is_wildcard(&self) -> bool { self.allowed_origin == "*" }

    pub fn apply(
        &self,
        headers: &mut HeaderMap,
    ) {
        headers.insert(
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            self.allowed_origin.clone(),
        );
        headers.insert(
            header::ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static(ALLOWED_METHODS),
        );
        headers.insert(
            header::ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static("Content-Type"),
        );
        // caches must not serve one origin's response to another
        if !self.is_wildcard() {
            headers.insert(header::VARY, HeaderValue::from_static("Origin"));
        }
    }
}

/// Attach the app's `CorsPolicy` to every response, errors included.
///
/// For more details, refer to the documentation for
/// `actix_web_lab::middleware::from_fn`
pub async fn attach_cors_headers(
    req: ServiceRequest,
    next: Next<impl MessageBody + 'static>,
) -> Result<ServiceResponse<impl MessageBody>, actix_web::Error> {
    let policy = req
        .app_data::<web::Data<CorsPolicy>>()
        .map(|p| p.get_ref().clone())
        .unwrap_or_default();

    // errors that escape the inner services have not been rendered yet; render them here so
    // they get the headers as well
    let http_req = req.request().clone();
    let mut resp = match next.call(req).await {
        Ok(resp) => resp.map_into_left_body(),
        Err(e) => ServiceResponse::new(http_req, e.error_response()).map_into_right_body(),
    };

    policy.apply(resp.headers_mut());
    Ok(resp)
}
