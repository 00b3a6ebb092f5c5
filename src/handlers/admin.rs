use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use crate::models::EventStatus;
use crate::services::MaybeSession;
use crate::state::AppState;
use crate::store::EventStore;
use crate::utils::error::AppError;
use crate::utils::response::success;

pub async fn list_orders(
    State(state): State<AppState>,
    MaybeSession(session): MaybeSession,
) -> Result<Response, AppError> {
    state.admin.require_admin(session.as_ref())?;
    let orders = state.store.list_orders().await?;
    Ok(success(orders, "Orders retrieved").into_response())
}

pub async fn list_users(
    State(state): State<AppState>,
    MaybeSession(session): MaybeSession,
) -> Result<Response, AppError> {
    state.admin.require_admin(session.as_ref())?;
    let profiles = state.store.list_profiles().await?;
    Ok(success(profiles, "Users retrieved").into_response())
}

pub async fn list_events(
    State(state): State<AppState>,
    MaybeSession(session): MaybeSession,
) -> Result<Response, AppError> {
    state.admin.require_admin(session.as_ref())?;
    let events = state.store.list_all_events().await?;
    Ok(success(events, "Events retrieved").into_response())
}

#[derive(Deserialize)]
pub struct UpdateEventStatusRequest {
    pub status: EventStatus,
}

/// Owner/admin status transitions; expiry is a transition, never a delete.
pub async fn update_event_status(
    State(state): State<AppState>,
    MaybeSession(session): MaybeSession,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateEventStatusRequest>,
) -> Result<Response, AppError> {
    state.admin.require_admin(session.as_ref())?;
    let event = state.store.update_event_status(id, request.status).await?;
    Ok(success(event, "Event status updated").into_response())
}
