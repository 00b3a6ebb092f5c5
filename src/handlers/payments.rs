use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::Order;
use crate::services::{CheckoutOutcome, OrderRef, VerifyOutcome};
use crate::state::AppState;
use crate::utils::error::AppError;
use crate::utils::response::success;

#[derive(Deserialize)]
pub struct CheckoutRequest {
    pub tier_id: Uuid,
    pub buyer_id: Uuid,
    pub email: String,
    pub quantity: i32,
}

#[derive(Serialize)]
struct CheckoutResponse {
    status: &'static str,
    order: Order,
    #[serde(skip_serializing_if = "Option::is_none")]
    checkout_url: Option<String>,
}

pub async fn begin_checkout(
    State(state): State<AppState>,
    Json(request): Json<CheckoutRequest>,
) -> Result<Response, AppError> {
    let outcome = state
        .checkout
        .begin_checkout(
            request.tier_id,
            request.buyer_id,
            request.email,
            request.quantity,
        )
        .await?;

    let body = match outcome {
        CheckoutOutcome::Redirect {
            order,
            checkout_url,
        } => CheckoutResponse {
            status: "redirect",
            order,
            checkout_url: Some(checkout_url),
        },
        CheckoutOutcome::Confirmed { order } => CheckoutResponse {
            status: "confirmed",
            order,
            checkout_url: None,
        },
    };
    Ok(success(body, "Checkout started").into_response())
}

#[derive(Deserialize)]
pub struct VerifyRequest {
    pub tx_ref: Option<String>,
    pub order_id: Option<Uuid>,
}

/// Response shape of the gateway callback endpoint.
#[derive(Serialize)]
struct VerifyResponse {
    success: bool,
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    order: Option<Order>,
}

pub async fn verify_payment(
    State(state): State<AppState>,
    Json(request): Json<VerifyRequest>,
) -> Result<Response, AppError> {
    let reference = match (request.tx_ref, request.order_id) {
        (Some(tx_ref), _) => OrderRef::TxRef(tx_ref),
        (None, Some(order_id)) => OrderRef::Id(order_id),
        (None, None) => {
            return Err(AppError::ValidationError(
                "tx_ref or order_id is required".to_string(),
            ))
        }
    };

    let body = match state.checkout.verify_payment(reference).await? {
        VerifyOutcome::Completed(order) => VerifyResponse {
            success: true,
            status: "completed",
            order: Some(order),
        },
        VerifyOutcome::Pending(_) => VerifyResponse {
            success: false,
            status: "pending",
            order: None,
        },
        VerifyOutcome::Failed(_) => VerifyResponse {
            success: false,
            status: "failed",
            order: None,
        },
    };
    Ok((StatusCode::OK, Json(body)).into_response())
}

pub async fn list_banks(State(state): State<AppState>) -> Result<Response, AppError> {
    let banks = state.checkout.banks().await?;
    Ok(Json(banks).into_response())
}

pub async fn get_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    let order = state.checkout.order(id).await?;
    Ok(success(order, "Order retrieved").into_response())
}
