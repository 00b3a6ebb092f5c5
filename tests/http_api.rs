//! Router-level tests: response shapes of the verification endpoint, CORS on
//! the gateway callback routes, and the admin gate at the HTTP boundary.

mod common;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use http_body_util::BodyExt;
use rust_decimal::Decimal;
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use common::{test_app, upcoming_event, ADMIN_EMAIL};
use pavilion_server::routes::create_routes;
use pavilion_server::services::CheckoutOutcome;

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn json_request(method: Method, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn health_reports_service_name() {
    let app = test_app();
    let router = create_routes(app.state);

    let response = router
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["service"], "pavilion-api");
}

#[tokio::test]
async fn verify_requires_a_reference() {
    let app = test_app();
    let router = create_routes(app.state);

    let response = router
        .oneshot(json_request(Method::POST, "/payments/verify", json!({})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn verify_unknown_reference_is_404() {
    let app = test_app();
    let router = create_routes(app.state);

    let response = router
        .oneshot(json_request(
            Method::POST,
            "/payments/verify",
            json!({ "tx_ref": "pav-missing" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn verify_callback_settles_and_reports_completed() {
    let app = test_app();
    let router = create_routes(app.state.clone());

    let (_, tier) = app
        .state
        .events
        .create_event(upcoming_event("Gala", Decimal::new(20000, 2), Some(10)))
        .await
        .unwrap();
    let CheckoutOutcome::Redirect { order, .. } = app
        .state
        .checkout
        .begin_checkout(tier.id, Uuid::new_v4(), "buyer@example.com".to_string(), 2)
        .await
        .unwrap()
    else {
        panic!("expected redirect");
    };

    let response = router
        .clone()
        .oneshot(json_request(
            Method::POST,
            "/payments/verify",
            json!({ "tx_ref": order.tx_ref }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["status"], "completed");
    assert_eq!(body["order"]["payment_status"], "completed");

    // Replay of the same callback reports the same terminal state.
    let replay = router
        .oneshot(json_request(
            Method::POST,
            "/payments/verify",
            json!({ "order_id": order.id }),
        ))
        .await
        .unwrap();
    assert_eq!(replay.status(), StatusCode::OK);
    let body = body_json(replay).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["status"], "completed");
}

#[tokio::test]
async fn verify_preflight_allows_any_origin() {
    let app = test_app();
    let router = create_routes(app.state);

    let response = router
        .oneshot(
            Request::builder()
                .method(Method::OPTIONS)
                .uri("/payments/verify")
                .header(header::ORIGIN, "https://checkout.gateway.test")
                .header("access-control-request-method", "POST")
                .header("access-control-request-headers", "content-type")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()["access-control-allow-origin"],
        "*"
    );
}

#[tokio::test]
async fn banks_endpoint_proxies_gateway_json() {
    let app = test_app();
    let router = create_routes(app.state);

    let response = router
        .oneshot(
            Request::builder()
                .uri("/payments/banks")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert!(body["data"].is_array());
}

#[tokio::test]
async fn unknown_order_lookup_is_404() {
    let app = test_app();
    let router = create_routes(app.state);

    let response = router
        .oneshot(
            Request::builder()
                .uri(format!("/orders/{}", Uuid::new_v4()))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn admin_listing_is_gated() {
    let app = test_app();
    let router = create_routes(app.state);

    // No session at all.
    let response = router
        .clone()
        .oneshot(
            Request::builder()
                .uri("/admin/orders")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // Authenticated but not an administrator.
    let response = router
        .clone()
        .oneshot(
            Request::builder()
                .uri("/admin/orders")
                .header("x-user-email", "someone@example.com")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // The configured administrator identity.
    let response = router
        .oneshot(
            Request::builder()
                .uri("/admin/orders")
                .header("x-user-email", ADMIN_EMAIL)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn profiles_sync_and_admin_user_listing() {
    let app = test_app();
    let router = create_routes(app.state);

    let response = router
        .clone()
        .oneshot(json_request(
            Method::POST,
            "/profiles",
            json!({
                "id": Uuid::new_v4(),
                "name": "Hana Girma",
                "email": "hana@example.com"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["role"], "user");

    let response = router
        .oneshot(
            Request::builder()
                .uri("/admin/users")
                .header("x-user-email", ADMIN_EMAIL)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"][0]["email"], "hana@example.com");
}

#[tokio::test]
async fn admin_can_expire_an_event() {
    let app = test_app();
    let router = create_routes(app.state.clone());

    let (event, _) = app
        .state
        .events
        .create_event(upcoming_event("Retiring Soon", Decimal::ZERO, Some(5)))
        .await
        .unwrap();

    let request = Request::builder()
        .method(Method::PATCH)
        .uri(format!("/admin/events/{}/status", event.id))
        .header(header::CONTENT_TYPE, "application/json")
        .header("x-user-email", ADMIN_EMAIL)
        .body(Body::from(json!({ "status": "expired" }).to_string()))
        .unwrap();
    let response = router.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["status"], "expired");

    // Expired events drop out of the public listing but are never deleted.
    let public = app
        .state
        .events
        .list_public(&Default::default())
        .await
        .unwrap();
    assert!(public.is_empty());
    use pavilion_server::store::EventStore;
    assert_eq!(app.store.list_all_events().await.unwrap().len(), 1);
}
