use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::models::{Event, EventStatus, Order, PaymentStatus, Profile, TicketTier};
use crate::store::{EventFilter, EventStore, Settlement};
use crate::utils::error::AppError;

/// In-memory store backend for tests and local development.
///
/// All state sits behind a single mutex, which makes the multi-row operations
/// (event+tier creation, settlement) atomic without further coordination.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<State>,
}

#[derive(Default)]
struct State {
    events: HashMap<Uuid, Event>,
    tiers: HashMap<Uuid, TicketTier>,
    orders: HashMap<Uuid, Order>,
    profiles: HashMap<Uuid, Profile>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl EventStore for MemoryStore {
    async fn create_event_with_tier(
        &self,
        event: Event,
        tier: TicketTier,
    ) -> Result<(Event, TicketTier), AppError> {
        let mut state = self.inner.lock().await;
        if state.events.values().any(|e| e.slug == event.slug) {
            return Err(AppError::Conflict(format!(
                "slug '{}' already exists",
                event.slug
            )));
        }
        state.events.insert(event.id, event.clone());
        state.tiers.insert(tier.id, tier.clone());
        Ok((event, tier))
    }

    async fn event(&self, id: Uuid) -> Result<Option<Event>, AppError> {
        Ok(self.inner.lock().await.events.get(&id).cloned())
    }

    async fn event_by_slug(&self, slug: &str) -> Result<Option<Event>, AppError> {
        let state = self.inner.lock().await;
        Ok(state.events.values().find(|e| e.slug == slug).cloned())
    }

    async fn list_public_events(&self, filter: &EventFilter) -> Result<Vec<Event>, AppError> {
        let now = Utc::now();
        let state = self.inner.lock().await;
        let mut events: Vec<Event> = state
            .events
            .values()
            .filter(|e| e.is_purchasable(now))
            .filter(|e| match &filter.category {
                Some(category) => e.category.eq_ignore_ascii_case(category),
                None => true,
            })
            .filter(|e| match &filter.search {
                Some(q) => {
                    let q = q.to_lowercase();
                    e.title.to_lowercase().contains(&q)
                        || e.description
                            .as_deref()
                            .is_some_and(|d| d.to_lowercase().contains(&q))
                }
                None => true,
            })
            .filter(|e| match &filter.location {
                Some(loc) => e.location.to_lowercase().contains(&loc.to_lowercase()),
                None => true,
            })
            .cloned()
            .collect();
        events.sort_by_key(|e| e.start_time);
        Ok(events)
    }

    async fn list_all_events(&self) -> Result<Vec<Event>, AppError> {
        let state = self.inner.lock().await;
        let mut events: Vec<Event> = state.events.values().cloned().collect();
        events.sort_by_key(|e| e.created_at);
        Ok(events)
    }

    async fn update_event_status(&self, id: Uuid, status: EventStatus) -> Result<Event, AppError> {
        let mut state = self.inner.lock().await;
        let event = state
            .events
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("event {id} not found")))?;
        event.status = status;
        event.updated_at = Utc::now();
        Ok(event.clone())
    }

    async fn tier(&self, id: Uuid) -> Result<Option<TicketTier>, AppError> {
        Ok(self.inner.lock().await.tiers.get(&id).cloned())
    }

    async fn tiers_for_event(&self, event_id: Uuid) -> Result<Vec<TicketTier>, AppError> {
        let state = self.inner.lock().await;
        let mut tiers: Vec<TicketTier> = state
            .tiers
            .values()
            .filter(|t| t.event_id == event_id)
            .cloned()
            .collect();
        tiers.sort_by_key(|t| t.created_at);
        Ok(tiers)
    }

    async fn upsert_profile(&self, profile: Profile) -> Result<Profile, AppError> {
        let mut state = self.inner.lock().await;
        state.profiles.insert(profile.id, profile.clone());
        Ok(profile)
    }

    async fn list_profiles(&self) -> Result<Vec<Profile>, AppError> {
        let state = self.inner.lock().await;
        let mut profiles: Vec<Profile> = state.profiles.values().cloned().collect();
        profiles.sort_by_key(|p| p.created_at);
        Ok(profiles)
    }

    async fn insert_order(&self, order: Order) -> Result<Order, AppError> {
        let mut state = self.inner.lock().await;
        state.orders.insert(order.id, order.clone());
        Ok(order)
    }

    async fn order(&self, id: Uuid) -> Result<Option<Order>, AppError> {
        Ok(self.inner.lock().await.orders.get(&id).cloned())
    }

    async fn order_by_tx_ref(&self, tx_ref: &str) -> Result<Option<Order>, AppError> {
        let state = self.inner.lock().await;
        Ok(state.orders.values().find(|o| o.tx_ref == tx_ref).cloned())
    }

    async fn list_orders(&self) -> Result<Vec<Order>, AppError> {
        let state = self.inner.lock().await;
        let mut orders: Vec<Order> = state.orders.values().cloned().collect();
        orders.sort_by_key(|o| o.created_at);
        Ok(orders)
    }

    async fn mark_order_failed(&self, id: Uuid) -> Result<Order, AppError> {
        let mut state = self.inner.lock().await;
        let order = state
            .orders
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("order {id} not found")))?;
        match order.payment_status {
            PaymentStatus::Completed => Err(AppError::Conflict(
                "order is already completed".to_string(),
            )),
            PaymentStatus::Failed => Ok(order.clone()),
            PaymentStatus::Pending => {
                order.payment_status = PaymentStatus::Failed;
                order.updated_at = Utc::now();
                Ok(order.clone())
            }
        }
    }

    async fn settle_order(&self, id: Uuid) -> Result<Settlement, AppError> {
        let mut state = self.inner.lock().await;

        let order = state
            .orders
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("order {id} not found")))?;

        match order.payment_status {
            PaymentStatus::Completed => return Ok(Settlement::AlreadyCompleted(order)),
            PaymentStatus::Failed => {
                return Err(AppError::Conflict("order has already failed".to_string()))
            }
            PaymentStatus::Pending => {}
        }

        // Decrement before the flip; under the single lock the pair is atomic.
        let tier = state
            .tiers
            .get_mut(&order.tier_id)
            .ok_or_else(|| AppError::NotFound(format!("tier {} not found", order.tier_id)))?;
        if let Some(remaining) = tier.remaining {
            if remaining < order.quantity {
                return Err(AppError::Conflict(format!(
                    "tier {} has only {} tickets remaining",
                    tier.id, remaining
                )));
            }
            tier.remaining = Some(remaining - order.quantity);
            tier.updated_at = Utc::now();
        }

        match state.orders.get_mut(&id) {
            Some(order) => {
                order.payment_status = PaymentStatus::Completed;
                order.updated_at = Utc::now();
                Ok(Settlement::Applied(order.clone()))
            }
            None => Err(AppError::NotFound(format!("order {id} not found"))),
        }
    }
}
