use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use serde_json::Value;
use uuid::Uuid;

use crate::gateway::{GatewayStatus, PaymentGateway, PaymentRequest};
use crate::models::{Order, PaymentStatus, TierKind};
use crate::store::EventStore;
use crate::utils::error::AppError;

/// Key under which a settlement request identifies its order.
#[derive(Debug, Clone)]
pub enum OrderRef {
    TxRef(String),
    Id(Uuid),
}

#[derive(Debug, Clone)]
pub enum CheckoutOutcome {
    /// Paid tier: the purchaser must be redirected to the hosted checkout.
    Redirect { order: Order, checkout_url: String },
    /// Free tier: settled immediately, no gateway round-trip.
    Confirmed { order: Order },
}

#[derive(Debug, Clone)]
pub enum VerifyOutcome {
    Completed(Order),
    /// Gateway has not confirmed the transaction yet; nothing was mutated.
    Pending(Order),
    /// Gateway reported a definitive failure; the order is terminal.
    Failed(Order),
}

#[derive(Clone)]
pub struct CheckoutService {
    store: Arc<dyn EventStore>,
    gateway: Arc<dyn PaymentGateway>,
    currency: String,
    return_url: Option<String>,
}

impl CheckoutService {
    pub fn new(
        store: Arc<dyn EventStore>,
        gateway: Arc<dyn PaymentGateway>,
        currency: String,
        return_url: Option<String>,
    ) -> Self {
        Self {
            store,
            gateway,
            currency,
            return_url,
        }
    }

    /// Creates a pending order for a tier and, for paid tiers, initializes the
    /// hosted checkout. The capacity check here is best-effort only; the
    /// binding check is the conditional decrement inside settlement.
    pub async fn begin_checkout(
        &self,
        tier_id: Uuid,
        buyer_id: Uuid,
        buyer_email: String,
        quantity: i32,
    ) -> Result<CheckoutOutcome, AppError> {
        if quantity < 1 {
            return Err(AppError::ValidationError(
                "quantity must be at least 1".to_string(),
            ));
        }

        let tier = self
            .store
            .tier(tier_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("ticket tier {tier_id} not found")))?;
        let event = self
            .store
            .event(tier.event_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("event for tier {tier_id} not found")))?;

        if !event.is_purchasable(Utc::now()) {
            return Err(AppError::ValidationError(
                "event is not open for ticket sales".to_string(),
            ));
        }
        if !tier.has_capacity_for(quantity) {
            return Err(AppError::Conflict(
                "not enough tickets remaining".to_string(),
            ));
        }

        let now = Utc::now();
        let order = Order {
            id: Uuid::new_v4(),
            tier_id,
            buyer_id,
            quantity,
            total: tier.price * Decimal::from(quantity),
            tx_ref: new_tx_ref(),
            payment_status: PaymentStatus::Pending,
            created_at: now,
            updated_at: now,
        };
        let order = self.store.insert_order(order).await?;

        if tier.kind == TierKind::Free {
            let settled = self.store.settle_order(order.id).await?.into_order();
            return Ok(CheckoutOutcome::Confirmed { order: settled });
        }

        let session = self
            .gateway
            .initialize(&PaymentRequest {
                tx_ref: order.tx_ref.clone(),
                amount: order.total,
                currency: self.currency.clone(),
                email: buyer_email,
                return_url: self.return_url.clone(),
            })
            .await?;

        Ok(CheckoutOutcome::Redirect {
            order,
            checkout_url: session.checkout_url,
        })
    }

    /// The single settlement entry point, invoked by the gateway callback.
    /// Safe to call any number of times for the same order: a completed order
    /// short-circuits before the gateway is consulted, and the store-level
    /// settlement is itself idempotent for callbacks racing each other.
    pub async fn verify_payment(&self, reference: OrderRef) -> Result<VerifyOutcome, AppError> {
        let order = match &reference {
            OrderRef::TxRef(tx_ref) => self.store.order_by_tx_ref(tx_ref).await?,
            OrderRef::Id(id) => self.store.order(*id).await?,
        }
        .ok_or_else(|| AppError::NotFound("no matching order".to_string()))?;

        match order.payment_status {
            PaymentStatus::Completed => return Ok(VerifyOutcome::Completed(order)),
            PaymentStatus::Failed => {
                return Err(AppError::Conflict("order has already failed".to_string()))
            }
            PaymentStatus::Pending => {}
        }

        match self.gateway.verify(&order.tx_ref).await? {
            GatewayStatus::Pending => Ok(VerifyOutcome::Pending(order)),
            GatewayStatus::Failed => {
                let order = self.store.mark_order_failed(order.id).await?;
                Ok(VerifyOutcome::Failed(order))
            }
            GatewayStatus::Success => {
                let settled = self.store.settle_order(order.id).await?.into_order();
                Ok(VerifyOutcome::Completed(settled))
            }
        }
    }

    pub async fn order(&self, id: Uuid) -> Result<Order, AppError> {
        self.store
            .order(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("order {id} not found")))
    }

    pub async fn banks(&self) -> Result<Value, AppError> {
        self.gateway.banks().await
    }
}

fn new_tx_ref() -> String {
    format!("pav-{}", Uuid::new_v4().simple())
}
