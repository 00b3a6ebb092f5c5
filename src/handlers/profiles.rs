use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use crate::models::Profile;
use crate::state::AppState;
use crate::store::EventStore;
use crate::utils::error::AppError;
use crate::utils::response::success;

#[derive(Deserialize)]
pub struct UpsertProfileRequest {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(default = "default_role")]
    pub role: String,
}

fn default_role() -> String {
    "user".to_string()
}

/// Mirrors an identity from the auth provider into the profiles table.
pub async fn upsert_profile(
    State(state): State<AppState>,
    Json(request): Json<UpsertProfileRequest>,
) -> Result<Response, AppError> {
    if request.name.trim().is_empty() {
        return Err(AppError::ValidationError(
            "name must not be blank".to_string(),
        ));
    }
    if !request.email.contains('@') {
        return Err(AppError::ValidationError(
            "email is not valid".to_string(),
        ));
    }

    let now = Utc::now();
    let profile = state
        .store
        .upsert_profile(Profile {
            id: request.id,
            name: request.name,
            email: request.email,
            role: request.role,
            created_at: now,
            updated_at: now,
        })
        .await?;
    Ok(success(profile, "Profile saved").into_response())
}
