use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::models::{Event, EventStatus, TicketTier, TierKind};
use crate::storage::ObjectStore;
use crate::store::{EventFilter, EventStore};
use crate::utils::error::AppError;
use crate::utils::slug::event_slug;

/// Initial ticket terms for a new event. `quantity = None` is an unlimited
/// tier; the kind is derived from the price so `price = 0 <=> free` holds by
/// construction.
#[derive(Debug, Clone)]
pub struct TicketTerms {
    pub name: String,
    pub price: Decimal,
    pub quantity: Option<i32>,
}

#[derive(Debug, Clone)]
pub struct Banner {
    pub content_type: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct NewEvent {
    pub organizer_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub location: String,
    pub category: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub is_virtual: bool,
    pub meeting_link: Option<String>,
    pub publish_immediately: bool,
    pub banner: Option<Banner>,
    pub ticket: TicketTerms,
}

#[derive(Clone)]
pub struct EventService {
    store: Arc<dyn EventStore>,
    objects: Arc<dyn ObjectStore>,
}

impl EventService {
    pub fn new(store: Arc<dyn EventStore>, objects: Arc<dyn ObjectStore>) -> Self {
        Self { store, objects }
    }

    /// Validates, uploads the banner if present, and persists the event with
    /// its single ticket tier atomically. A banner upload failure aborts the
    /// whole flow before anything is written to the store.
    pub async fn create_event(&self, new_event: NewEvent) -> Result<(Event, TicketTier), AppError> {
        validate(&new_event)?;

        let event_id = Uuid::new_v4();

        let banner_url = match &new_event.banner {
            Some(banner) => {
                let ext = banner_extension(&banner.content_type)?;
                let key = format!("banners/{event_id}.{ext}");
                let url = self
                    .objects
                    .put(&key, banner.bytes.clone(), &banner.content_type)
                    .await?;
                Some(url)
            }
            None => None,
        };

        let now = Utc::now();
        let event = Event {
            id: event_id,
            organizer_id: new_event.organizer_id,
            title: new_event.title.trim().to_string(),
            description: new_event.description,
            location: new_event.location,
            category: new_event.category,
            start_time: new_event.start_time,
            end_time: new_event.end_time,
            is_virtual: new_event.is_virtual,
            meeting_link: new_event.meeting_link,
            banner_url,
            status: if new_event.publish_immediately {
                EventStatus::Published
            } else {
                EventStatus::Draft
            },
            slug: event_slug(new_event.title.trim(), event_id),
            created_at: now,
            updated_at: now,
        };

        let terms = new_event.ticket;
        let tier = TicketTier {
            id: Uuid::new_v4(),
            event_id,
            name: terms.name,
            price: terms.price,
            kind: if terms.price.is_zero() {
                TierKind::Free
            } else {
                TierKind::Paid
            },
            quantity: terms.quantity,
            remaining: terms.quantity,
            created_at: now,
            updated_at: now,
        };

        self.store.create_event_with_tier(event, tier).await
    }

    pub async fn list_public(&self, filter: &EventFilter) -> Result<Vec<Event>, AppError> {
        self.store.list_public_events(filter).await
    }

    pub async fn get_by_slug(&self, slug: &str) -> Result<(Event, Vec<TicketTier>), AppError> {
        let event = self
            .store
            .event_by_slug(slug)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("event '{slug}' not found")))?;
        let tiers = self.store.tiers_for_event(event.id).await?;
        Ok((event, tiers))
    }
}

fn validate(new_event: &NewEvent) -> Result<(), AppError> {
    if new_event.title.trim().is_empty() {
        return Err(AppError::ValidationError(
            "title must not be blank".to_string(),
        ));
    }
    let now = Utc::now();
    if new_event.start_time <= now {
        return Err(AppError::ValidationError(
            "start_time must be in the future".to_string(),
        ));
    }
    if new_event.end_time <= new_event.start_time {
        return Err(AppError::ValidationError(
            "end_time must be after start_time".to_string(),
        ));
    }
    if new_event.is_virtual && new_event.meeting_link.is_none() {
        return Err(AppError::ValidationError(
            "virtual events require a meeting_link".to_string(),
        ));
    }
    if new_event.ticket.name.trim().is_empty() {
        return Err(AppError::ValidationError(
            "ticket name must not be blank".to_string(),
        ));
    }
    if new_event.ticket.price < Decimal::ZERO {
        return Err(AppError::ValidationError(
            "ticket price must not be negative".to_string(),
        ));
    }
    if let Some(quantity) = new_event.ticket.quantity {
        if quantity < 1 {
            return Err(AppError::ValidationError(
                "ticket quantity must be at least 1".to_string(),
            ));
        }
    }
    Ok(())
}

fn banner_extension(content_type: &str) -> Result<&'static str, AppError> {
    match content_type {
        "image/png" => Ok("png"),
        "image/jpeg" => Ok("jpg"),
        "image/webp" => Ok("webp"),
        other => Err(AppError::ValidationError(format!(
            "unsupported banner content type '{other}'"
        ))),
    }
}
