use std::sync::Arc;

use crate::gateway::PaymentGateway;
use crate::services::{AdminGate, CheckoutService, EventService};
use crate::storage::ObjectStore;
use crate::store::EventStore;

/// Shared application state: the services handlers dispatch into, plus the
/// raw store for administrative reads.
#[derive(Clone)]
pub struct AppState {
    pub events: EventService,
    pub checkout: CheckoutService,
    pub store: Arc<dyn EventStore>,
    pub admin: AdminGate,
}

impl AppState {
    pub fn new(
        store: Arc<dyn EventStore>,
        gateway: Arc<dyn PaymentGateway>,
        objects: Arc<dyn ObjectStore>,
        admin: AdminGate,
        currency: String,
        checkout_return_url: Option<String>,
    ) -> Self {
        Self {
            events: EventService::new(store.clone(), objects),
            checkout: CheckoutService::new(store.clone(), gateway, currency, checkout_return_url),
            store,
            admin,
        }
    }
}
