use axum::extract::{Path, Query, State};
use axum::response::{IntoResponse, Response};
use axum::Json;
use base64::Engine;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{Event, TicketTier};
use crate::services::{Banner, NewEvent, TicketTerms};
use crate::state::AppState;
use crate::store::EventFilter;
use crate::utils::error::AppError;
use crate::utils::response::{created, success};

#[derive(Deserialize)]
pub struct TicketTermsPayload {
    pub name: String,
    pub price: Decimal,
    pub quantity: Option<i32>,
}

#[derive(Deserialize)]
pub struct BannerPayload {
    pub content_type: String,
    pub data_base64: String,
}

#[derive(Deserialize)]
pub struct CreateEventRequest {
    pub organizer_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub location: String,
    pub category: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    #[serde(default)]
    pub is_virtual: bool,
    pub meeting_link: Option<String>,
    #[serde(default)]
    pub publish_immediately: bool,
    pub banner: Option<BannerPayload>,
    pub ticket: TicketTermsPayload,
}

#[derive(Deserialize)]
pub struct ListEventsQuery {
    pub category: Option<String>,
    pub q: Option<String>,
    pub location: Option<String>,
}

#[derive(Serialize)]
struct EventWithTier {
    event: Event,
    ticket_tier: TicketTier,
}

#[derive(Serialize)]
struct EventDetail {
    event: Event,
    ticket_tiers: Vec<TicketTier>,
}

pub async fn create_event(
    State(state): State<AppState>,
    Json(request): Json<CreateEventRequest>,
) -> Result<Response, AppError> {
    let banner = request.banner.map(decode_banner).transpose()?;

    let (event, ticket_tier) = state
        .events
        .create_event(NewEvent {
            organizer_id: request.organizer_id,
            title: request.title,
            description: request.description,
            location: request.location,
            category: request.category,
            start_time: request.start_time,
            end_time: request.end_time,
            is_virtual: request.is_virtual,
            meeting_link: request.meeting_link,
            publish_immediately: request.publish_immediately,
            banner,
            ticket: TicketTerms {
                name: request.ticket.name,
                price: request.ticket.price,
                quantity: request.ticket.quantity,
            },
        })
        .await?;

    Ok(created(EventWithTier { event, ticket_tier }, "Event created").into_response())
}

pub async fn list_events(
    State(state): State<AppState>,
    Query(query): Query<ListEventsQuery>,
) -> Result<Response, AppError> {
    let filter = EventFilter {
        category: query.category,
        search: query.q,
        location: query.location,
    };
    let events = state.events.list_public(&filter).await?;
    Ok(success(events, "Events retrieved").into_response())
}

pub async fn get_event(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Response, AppError> {
    let (event, ticket_tiers) = state.events.get_by_slug(&slug).await?;
    Ok(success(EventDetail { event, ticket_tiers }, "Event retrieved").into_response())
}

fn decode_banner(payload: BannerPayload) -> Result<Banner, AppError> {
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(payload.data_base64.as_bytes())
        .map_err(|_| AppError::ValidationError("banner is not valid base64".to_string()))?;
    Ok(Banner {
        content_type: payload.content_type,
        bytes,
    })
}
