use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::models::{Event, EventStatus, Order, PaymentStatus, Profile, TicketTier};
use crate::store::{EventFilter, EventStore, Settlement};
use crate::utils::error::AppError;

/// Postgres store backend. Settlement runs in a transaction: the conditional
/// `remaining >= $qty` decrement and the `payment_status = 'pending'` flip
/// guard make it safe against concurrent settlements and duplicate gateway
/// callbacks.
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EventStore for PgStore {
    async fn create_event_with_tier(
        &self,
        event: Event,
        tier: TicketTier,
    ) -> Result<(Event, TicketTier), AppError> {
        let mut tx = self.pool.begin().await?;

        let event = sqlx::query_as::<_, Event>(
            r#"
            INSERT INTO events
                (id, organizer_id, title, description, location, category,
                 start_time, end_time, is_virtual, meeting_link, banner_url,
                 status, slug)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING *
            "#,
        )
        .bind(event.id)
        .bind(event.organizer_id)
        .bind(&event.title)
        .bind(&event.description)
        .bind(&event.location)
        .bind(&event.category)
        .bind(event.start_time)
        .bind(event.end_time)
        .bind(event.is_virtual)
        .bind(&event.meeting_link)
        .bind(&event.banner_url)
        .bind(event.status)
        .bind(&event.slug)
        .fetch_one(&mut *tx)
        .await?;

        let tier = sqlx::query_as::<_, TicketTier>(
            r#"
            INSERT INTO ticket_tiers (id, event_id, name, price, kind, quantity, remaining)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(tier.id)
        .bind(tier.event_id)
        .bind(&tier.name)
        .bind(tier.price)
        .bind(tier.kind)
        .bind(tier.quantity)
        .bind(tier.remaining)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok((event, tier))
    }

    async fn event(&self, id: Uuid) -> Result<Option<Event>, AppError> {
        let event = sqlx::query_as::<_, Event>("SELECT * FROM events WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(event)
    }

    async fn event_by_slug(&self, slug: &str) -> Result<Option<Event>, AppError> {
        let event = sqlx::query_as::<_, Event>("SELECT * FROM events WHERE slug = $1")
            .bind(slug)
            .fetch_optional(&self.pool)
            .await?;
        Ok(event)
    }

    async fn list_public_events(&self, filter: &EventFilter) -> Result<Vec<Event>, AppError> {
        let mut query = QueryBuilder::<Postgres>::new(
            "SELECT * FROM events \
             WHERE status IN ('published', 'featured') AND end_time >= now()",
        );
        if let Some(category) = &filter.category {
            query.push(" AND category = ").push_bind(category);
        }
        if let Some(search) = &filter.search {
            let pattern = format!("%{search}%");
            query
                .push(" AND (title ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR description ILIKE ")
                .push_bind(pattern)
                .push(")");
        }
        if let Some(location) = &filter.location {
            query
                .push(" AND location ILIKE ")
                .push_bind(format!("%{location}%"));
        }
        query.push(" ORDER BY start_time ASC");

        let events = query
            .build_query_as::<Event>()
            .fetch_all(&self.pool)
            .await?;
        Ok(events)
    }

    async fn list_all_events(&self) -> Result<Vec<Event>, AppError> {
        let events = sqlx::query_as::<_, Event>("SELECT * FROM events ORDER BY created_at ASC")
            .fetch_all(&self.pool)
            .await?;
        Ok(events)
    }

    async fn update_event_status(&self, id: Uuid, status: EventStatus) -> Result<Event, AppError> {
        let event = sqlx::query_as::<_, Event>(
            "UPDATE events SET status = $2, updated_at = now() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(status)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("event {id} not found")))?;
        Ok(event)
    }

    async fn tier(&self, id: Uuid) -> Result<Option<TicketTier>, AppError> {
        let tier = sqlx::query_as::<_, TicketTier>("SELECT * FROM ticket_tiers WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(tier)
    }

    async fn tiers_for_event(&self, event_id: Uuid) -> Result<Vec<TicketTier>, AppError> {
        let tiers = sqlx::query_as::<_, TicketTier>(
            "SELECT * FROM ticket_tiers WHERE event_id = $1 ORDER BY created_at ASC",
        )
        .bind(event_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(tiers)
    }

    async fn upsert_profile(&self, profile: Profile) -> Result<Profile, AppError> {
        let profile = sqlx::query_as::<_, Profile>(
            r#"
            INSERT INTO profiles (id, name, email, role)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (id) DO UPDATE
                SET name = EXCLUDED.name,
                    email = EXCLUDED.email,
                    role = EXCLUDED.role,
                    updated_at = now()
            RETURNING *
            "#,
        )
        .bind(profile.id)
        .bind(&profile.name)
        .bind(&profile.email)
        .bind(&profile.role)
        .fetch_one(&self.pool)
        .await?;
        Ok(profile)
    }

    async fn list_profiles(&self) -> Result<Vec<Profile>, AppError> {
        let profiles =
            sqlx::query_as::<_, Profile>("SELECT * FROM profiles ORDER BY created_at ASC")
                .fetch_all(&self.pool)
                .await?;
        Ok(profiles)
    }

    async fn insert_order(&self, order: Order) -> Result<Order, AppError> {
        let order = sqlx::query_as::<_, Order>(
            r#"
            INSERT INTO orders (id, tier_id, buyer_id, quantity, total, tx_ref, payment_status)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(order.id)
        .bind(order.tier_id)
        .bind(order.buyer_id)
        .bind(order.quantity)
        .bind(order.total)
        .bind(&order.tx_ref)
        .bind(order.payment_status)
        .fetch_one(&self.pool)
        .await?;
        Ok(order)
    }

    async fn order(&self, id: Uuid) -> Result<Option<Order>, AppError> {
        let order = sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(order)
    }

    async fn order_by_tx_ref(&self, tx_ref: &str) -> Result<Option<Order>, AppError> {
        let order = sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE tx_ref = $1")
            .bind(tx_ref)
            .fetch_optional(&self.pool)
            .await?;
        Ok(order)
    }

    async fn list_orders(&self) -> Result<Vec<Order>, AppError> {
        let orders = sqlx::query_as::<_, Order>("SELECT * FROM orders ORDER BY created_at ASC")
            .fetch_all(&self.pool)
            .await?;
        Ok(orders)
    }

    async fn mark_order_failed(&self, id: Uuid) -> Result<Order, AppError> {
        let updated = sqlx::query_as::<_, Order>(
            "UPDATE orders SET payment_status = 'failed', updated_at = now() \
             WHERE id = $1 AND payment_status = 'pending' RETURNING *",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        if let Some(order) = updated {
            return Ok(order);
        }

        // The guarded update matched nothing: absent, already failed, or completed.
        let order = sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("order {id} not found")))?;
        match order.payment_status {
            PaymentStatus::Failed => Ok(order),
            _ => Err(AppError::Conflict("order is already completed".to_string())),
        }
    }

    async fn settle_order(&self, id: Uuid) -> Result<Settlement, AppError> {
        let mut tx = self.pool.begin().await?;

        // FOR UPDATE serializes duplicate callbacks for the same order.
        let order = sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("order {id} not found")))?;

        match order.payment_status {
            PaymentStatus::Completed => return Ok(Settlement::AlreadyCompleted(order)),
            PaymentStatus::Failed => {
                return Err(AppError::Conflict("order has already failed".to_string()))
            }
            PaymentStatus::Pending => {}
        }

        let tier = sqlx::query_as::<_, TicketTier>("SELECT * FROM ticket_tiers WHERE id = $1")
            .bind(order.tier_id)
            .fetch_one(&mut *tx)
            .await?;

        // Decrement first; a zero-row update means the tier is oversold and the
        // transaction rolls back without touching the order.
        if !tier.is_unlimited() {
            let decremented = sqlx::query(
                "UPDATE ticket_tiers SET remaining = remaining - $2, updated_at = now() \
                 WHERE id = $1 AND remaining >= $2",
            )
            .bind(order.tier_id)
            .bind(order.quantity)
            .execute(&mut *tx)
            .await?;
            if decremented.rows_affected() == 0 {
                return Err(AppError::Conflict(format!(
                    "tier {} has insufficient tickets remaining",
                    tier.id
                )));
            }
        }

        let settled = sqlx::query_as::<_, Order>(
            "UPDATE orders SET payment_status = 'completed', updated_at = now() \
             WHERE id = $1 AND payment_status = 'pending' RETURNING *",
        )
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(Settlement::Applied(settled))
    }
}
