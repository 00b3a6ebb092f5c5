use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use async_trait::async_trait;
use serde_json::{json, Value};
use tokio::sync::Mutex;

use crate::gateway::{CheckoutSession, GatewayStatus, PaymentGateway, PaymentRequest};
use crate::utils::error::AppError;

/// Scriptable gateway for tests and local development.
///
/// Unscripted references verify as `Success`; individual outcomes can be
/// overridden per `tx_ref`, and whole calls can be made to fail to exercise
/// the retryable error paths.
#[derive(Default)]
pub struct MockGateway {
    outcomes: Mutex<HashMap<String, GatewayStatus>>,
    fail_initialize: AtomicBool,
    fail_verify: AtomicBool,
    verify_calls: AtomicU64,
}

impl MockGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn script_verification(&self, tx_ref: &str, status: GatewayStatus) {
        self.outcomes
            .lock()
            .await
            .insert(tx_ref.to_string(), status);
    }

    pub fn set_initialize_failure(&self, fail: bool) {
        self.fail_initialize.store(fail, Ordering::SeqCst);
    }

    pub fn set_verify_failure(&self, fail: bool) {
        self.fail_verify.store(fail, Ordering::SeqCst);
    }

    /// How many verification calls reached the gateway. Idempotent settlement
    /// must short-circuit before this counter moves.
    pub fn verify_calls(&self) -> u64 {
        self.verify_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PaymentGateway for MockGateway {
    async fn initialize(&self, request: &PaymentRequest) -> Result<CheckoutSession, AppError> {
        if self.fail_initialize.load(Ordering::SeqCst) {
            return Err(AppError::GatewayError(
                "checkout initialization failed".to_string(),
            ));
        }
        Ok(CheckoutSession {
            checkout_url: format!("https://gateway.test/pay/{}", request.tx_ref),
        })
    }

    async fn verify(&self, tx_ref: &str) -> Result<GatewayStatus, AppError> {
        self.verify_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_verify.load(Ordering::SeqCst) {
            return Err(AppError::GatewayError(
                "payment verification timed out".to_string(),
            ));
        }
        let outcomes = self.outcomes.lock().await;
        Ok(outcomes
            .get(tx_ref)
            .copied()
            .unwrap_or(GatewayStatus::Success))
    }

    async fn banks(&self) -> Result<Value, AppError> {
        Ok(json!({
            "status": "success",
            "data": [
                { "id": 1, "name": "Test Commercial Bank", "code": "001" },
                { "id": 2, "name": "Test Cooperative Bank", "code": "002" }
            ]
        }))
    }
}
