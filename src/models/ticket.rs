use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "tier_kind", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TierKind {
    Free,
    Paid,
}

/// A purchasable ticket category for an event.
///
/// `quantity`/`remaining` of `None` mean the tier is unlimited; for limited
/// tiers `remaining` only ever decreases, and only through order settlement.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TicketTier {
    pub id: Uuid,
    pub event_id: Uuid,
    pub name: String,
    pub price: Decimal,
    pub kind: TierKind,
    pub quantity: Option<i32>,
    pub remaining: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TicketTier {
    pub fn is_unlimited(&self) -> bool {
        self.quantity.is_none()
    }

    /// Best-effort capacity check at read time; settlement re-checks under a
    /// conditional update.
    pub fn has_capacity_for(&self, quantity: i32) -> bool {
        match self.remaining {
            None => true,
            Some(remaining) => remaining >= quantity,
        }
    }
}
