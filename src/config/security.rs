use std::env;
use std::sync::OnceLock;

use axum::extract::Request;
use axum::http::HeaderValue;
use axum::middleware::Next;
use axum::response::Response;

const NOSNIFF: &str = "nosniff";
const DENY: &str = "DENY";
const XSS_BLOCK: &str = "1; mode=block";
const HSTS_VALUE: &str = "max-age=31536000; includeSubDomains";
const CSP_API_VALUE: &str = "default-src 'none'; frame-ancestors 'none'";
const REFERRER_POLICY_VALUE: &str = "strict-origin-when-cross-origin";
const PERMISSIONS_POLICY_VALUE: &str = "geolocation=(), microphone=(), camera=()";

static INCLUDE_HSTS: OnceLock<bool> = OnceLock::new();

fn include_hsts() -> bool {
    *INCLUDE_HSTS.get_or_init(|| {
        let is_production = env::var("RUST_ENV")
            .map(|v| v.to_lowercase() == "production")
            .unwrap_or(false);

        if is_production {
            tracing::info!("Security: HSTS header enabled (production mode)");
        } else {
            tracing::info!("Security: HSTS header disabled (development mode)");
        }

        is_production
    })
}

/// Adds the standard security response headers. HSTS is only sent in
/// production, where the service sits behind HTTPS.
pub async fn security_headers(request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;
    let headers = response.headers_mut();

    headers.insert("x-content-type-options", HeaderValue::from_static(NOSNIFF));
    headers.insert("x-frame-options", HeaderValue::from_static(DENY));
    headers.insert("x-xss-protection", HeaderValue::from_static(XSS_BLOCK));
    headers.insert(
        "content-security-policy",
        HeaderValue::from_static(CSP_API_VALUE),
    );
    headers.insert(
        "referrer-policy",
        HeaderValue::from_static(REFERRER_POLICY_VALUE),
    );
    headers.insert(
        "permissions-policy",
        HeaderValue::from_static(PERMISSIONS_POLICY_VALUE),
    );

    if include_hsts() {
        headers.insert(
            "strict-transport-security",
            HeaderValue::from_static(HSTS_VALUE),
        );
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request as HttpRequest;
    use axum::routing::get;
    use axum::{middleware, Router};
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_security_headers_are_applied() {
        let app = Router::new()
            .route("/", get(|| async { "ok" }))
            .layer(middleware::from_fn(security_headers));

        let response = app
            .oneshot(HttpRequest::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        let headers = response.headers();
        assert_eq!(headers["x-content-type-options"], NOSNIFF);
        assert_eq!(headers["x-frame-options"], DENY);
        assert_eq!(headers["content-security-policy"], CSP_API_VALUE);
        assert_eq!(headers["referrer-policy"], REFERRER_POLICY_VALUE);
    }
}
