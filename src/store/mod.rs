use async_trait::async_trait;
use uuid::Uuid;

use crate::models::{Event, EventStatus, Order, Profile, TicketTier};
use crate::utils::error::AppError;

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Filters for the public event listing. All filters are conjunctive.
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    pub category: Option<String>,
    /// Free-text search over title and description.
    pub search: Option<String>,
    /// Location substring match.
    pub location: Option<String>,
}

/// Outcome of the atomic settlement primitive.
#[derive(Debug, Clone)]
pub enum Settlement {
    /// This call flipped the order to completed and decremented inventory.
    Applied(Order),
    /// A previous or concurrent settlement already completed the order;
    /// nothing was mutated.
    AlreadyCompleted(Order),
}

impl Settlement {
    pub fn into_order(self) -> Order {
        match self {
            Settlement::Applied(order) | Settlement::AlreadyCompleted(order) => order,
        }
    }
}

/// Durable store for events, ticket tiers and orders.
///
/// Multi-row operations (`create_event_with_tier`, `settle_order`) are atomic:
/// either every row lands or none does. `settle_order` is additionally
/// idempotent and enforces the inventory bound with a conditional decrement,
/// so callers never have to rely on their earlier capacity pre-checks.
#[async_trait]
pub trait EventStore: Send + Sync {
    async fn create_event_with_tier(
        &self,
        event: Event,
        tier: TicketTier,
    ) -> Result<(Event, TicketTier), AppError>;

    async fn event(&self, id: Uuid) -> Result<Option<Event>, AppError>;

    async fn event_by_slug(&self, slug: &str) -> Result<Option<Event>, AppError>;

    /// Published or featured events that have not yet ended.
    async fn list_public_events(&self, filter: &EventFilter) -> Result<Vec<Event>, AppError>;

    /// Every event regardless of status; administrative view.
    async fn list_all_events(&self) -> Result<Vec<Event>, AppError>;

    async fn update_event_status(&self, id: Uuid, status: EventStatus) -> Result<Event, AppError>;

    async fn tier(&self, id: Uuid) -> Result<Option<TicketTier>, AppError>;

    async fn tiers_for_event(&self, event_id: Uuid) -> Result<Vec<TicketTier>, AppError>;

    /// Inserts or refreshes a profile mirrored from the auth provider.
    async fn upsert_profile(&self, profile: Profile) -> Result<Profile, AppError>;

    async fn list_profiles(&self) -> Result<Vec<Profile>, AppError>;

    async fn insert_order(&self, order: Order) -> Result<Order, AppError>;

    async fn order(&self, id: Uuid) -> Result<Option<Order>, AppError>;

    async fn order_by_tx_ref(&self, tx_ref: &str) -> Result<Option<Order>, AppError>;

    async fn list_orders(&self) -> Result<Vec<Order>, AppError>;

    /// Marks a pending order failed. Idempotent for already-failed orders;
    /// a completed order is immutable and yields `Conflict`.
    async fn mark_order_failed(&self, id: Uuid) -> Result<Order, AppError>;

    /// Settles an order: decrements the tier's `remaining` by the order
    /// quantity (conditionally, never below zero; unlimited tiers skip the
    /// decrement) and flips the order pending -> completed, as one unit.
    ///
    /// Returns `Conflict` when the tier has insufficient inventory or the
    /// order already failed; in that case nothing is mutated.
    async fn settle_order(&self, id: Uuid) -> Result<Settlement, AppError>;
}
