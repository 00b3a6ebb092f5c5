use async_trait::async_trait;
use rust_decimal::Decimal;
use serde_json::Value;

use crate::utils::error::AppError;

pub mod chapa;
pub mod mock;

pub use chapa::ChapaGateway;
pub use mock::MockGateway;

/// Hosted-checkout initialization parameters. `tx_ref` is generated by us and
/// is the key later used to verify the transaction.
#[derive(Debug, Clone)]
pub struct PaymentRequest {
    pub tx_ref: String,
    pub amount: Decimal,
    pub currency: String,
    pub email: String,
    pub return_url: Option<String>,
}

#[derive(Debug, Clone)]
pub struct CheckoutSession {
    pub checkout_url: String,
}

/// Transaction state as reported by the gateway's verification API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatewayStatus {
    Success,
    Pending,
    Failed,
}

/// External payment provider. Calls are fallible and latency-bearing; every
/// implementation must bound its request time so a hung upstream surfaces as a
/// retryable `GatewayError` rather than an indefinite stall.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn initialize(&self, request: &PaymentRequest) -> Result<CheckoutSession, AppError>;

    async fn verify(&self, tx_ref: &str) -> Result<GatewayStatus, AppError>;

    /// The gateway's bank directory, passed through verbatim.
    async fn banks(&self) -> Result<Value, AppError>;
}
