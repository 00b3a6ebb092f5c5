#![allow(dead_code)]

use std::sync::Arc;

use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use pavilion_server::gateway::MockGateway;
use pavilion_server::services::{AdminGate, NewEvent, TicketTerms};
use pavilion_server::state::AppState;
use pavilion_server::storage::MemoryObjectStore;
use pavilion_server::store::MemoryStore;

pub const ADMIN_EMAIL: &str = "admin@example.com";

pub struct TestApp {
    pub store: Arc<MemoryStore>,
    pub gateway: Arc<MockGateway>,
    pub objects: Arc<MemoryObjectStore>,
    pub state: AppState,
}

pub fn test_app() -> TestApp {
    let store = Arc::new(MemoryStore::new());
    let gateway = Arc::new(MockGateway::new());
    let objects = Arc::new(MemoryObjectStore::new());
    let state = AppState::new(
        store.clone(),
        gateway.clone(),
        objects.clone(),
        AdminGate::new(Some(ADMIN_EMAIL.to_string())),
        "ETB".to_string(),
        None,
    );
    TestApp {
        store,
        gateway,
        objects,
        state,
    }
}

/// A valid event starting tomorrow with a single ticket tier.
pub fn upcoming_event(title: &str, price: Decimal, quantity: Option<i32>) -> NewEvent {
    let start = Utc::now() + Duration::hours(24);
    NewEvent {
        organizer_id: Uuid::new_v4(),
        title: title.to_string(),
        description: Some("An evening of talks and demos".to_string()),
        location: "Addis Ababa".to_string(),
        category: "tech".to_string(),
        start_time: start,
        end_time: start + Duration::hours(3),
        is_virtual: false,
        meeting_link: None,
        publish_immediately: true,
        banner: None,
        ticket: TicketTerms {
            name: "General Admission".to_string(),
            price,
            quantity,
        },
    }
}
