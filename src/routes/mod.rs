use axum::routing::{get, patch, post};
use axum::{middleware, Router};
use tower_http::trace::TraceLayer;

use crate::config::{create_cors_layer, create_gateway_cors_layer, security_headers};
use crate::handlers::{admin, events, health_check, payments, profiles};
use crate::state::AppState;

pub fn create_routes(state: AppState) -> Router {
    let api = Router::new()
        .route("/health", get(health_check))
        .route("/events", get(events::list_events).post(events::create_event))
        .route("/events/:slug", get(events::get_event))
        .route("/checkout", post(payments::begin_checkout))
        .route("/orders/:id", get(payments::get_order))
        .route("/profiles", post(profiles::upsert_profile))
        .route("/admin/orders", get(admin::list_orders))
        .route("/admin/users", get(admin::list_users))
        .route("/admin/events", get(admin::list_events))
        .route("/admin/events/:id/status", patch(admin::update_event_status))
        .layer(create_cors_layer());

    // Gateway callbacks arrive from arbitrary origins, so these routes carry
    // their own permissive CORS policy.
    let gateway_callbacks = Router::new()
        .route("/payments/verify", post(payments::verify_payment))
        .route("/payments/banks", get(payments::list_banks))
        .layer(create_gateway_cors_layer());

    Router::new()
        .merge(api)
        .merge(gateway_callbacks)
        .layer(middleware::from_fn(security_headers))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
