use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::gateway::{CheckoutSession, GatewayStatus, PaymentGateway, PaymentRequest};
use crate::utils::error::AppError;

/// Chapa-compatible gateway client. The secret key stays server-side; it is
/// only ever sent as a bearer credential to the gateway itself.
pub struct ChapaGateway {
    http: Client,
    base_url: String,
    secret_key: String,
}

#[derive(Deserialize)]
struct GatewayEnvelope<T> {
    status: String,
    message: Option<String>,
    data: Option<T>,
}

#[derive(Deserialize)]
struct InitializeData {
    checkout_url: String,
}

#[derive(Deserialize)]
struct VerifyData {
    status: String,
}

impl ChapaGateway {
    pub fn new(
        base_url: impl Into<String>,
        secret_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, AppError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::InternalServerError(format!("http client: {e}")))?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            secret_key: secret_key.into(),
        })
    }

    fn bearer(&self) -> String {
        format!("Bearer {}", self.secret_key)
    }

    fn transport_error(context: &str, err: reqwest::Error) -> AppError {
        if err.is_timeout() {
            AppError::GatewayError(format!("{context} timed out"))
        } else {
            AppError::GatewayError(format!("{context} failed: {err}"))
        }
    }
}

#[async_trait]
impl PaymentGateway for ChapaGateway {
    async fn initialize(&self, request: &PaymentRequest) -> Result<CheckoutSession, AppError> {
        let mut body = json!({
            "amount": request.amount.to_string(),
            "currency": request.currency,
            "tx_ref": request.tx_ref,
            "email": request.email,
        });
        if let Some(return_url) = &request.return_url {
            body["return_url"] = Value::String(return_url.clone());
        }

        let response = self
            .http
            .post(format!("{}/transaction/initialize", self.base_url))
            .header("Authorization", self.bearer())
            .json(&body)
            .send()
            .await
            .map_err(|e| Self::transport_error("checkout initialization", e))?;

        if !response.status().is_success() {
            return Err(AppError::GatewayError(format!(
                "checkout initialization returned {}",
                response.status()
            )));
        }

        let envelope: GatewayEnvelope<InitializeData> = response
            .json()
            .await
            .map_err(|e| Self::transport_error("checkout initialization", e))?;
        if envelope.status != "success" {
            return Err(AppError::GatewayError(
                envelope
                    .message
                    .unwrap_or_else(|| "checkout initialization rejected".to_string()),
            ));
        }
        let data = envelope.data.ok_or_else(|| {
            AppError::GatewayError("initialization response had no data".to_string())
        })?;

        Ok(CheckoutSession {
            checkout_url: data.checkout_url,
        })
    }

    async fn verify(&self, tx_ref: &str) -> Result<GatewayStatus, AppError> {
        let response = self
            .http
            .get(format!("{}/transaction/verify/{tx_ref}", self.base_url))
            .header("Authorization", self.bearer())
            .send()
            .await
            .map_err(|e| Self::transport_error("payment verification", e))?;

        if !response.status().is_success() {
            return Err(AppError::GatewayError(format!(
                "payment verification returned {}",
                response.status()
            )));
        }

        let envelope: GatewayEnvelope<VerifyData> = response
            .json()
            .await
            .map_err(|e| Self::transport_error("payment verification", e))?;
        let data = envelope.data.ok_or_else(|| {
            AppError::GatewayError("verification response had no data".to_string())
        })?;

        match data.status.as_str() {
            "success" => Ok(GatewayStatus::Success),
            "pending" => Ok(GatewayStatus::Pending),
            "failed" => Ok(GatewayStatus::Failed),
            other => Err(AppError::GatewayError(format!(
                "unexpected transaction status '{other}'"
            ))),
        }
    }

    async fn banks(&self) -> Result<Value, AppError> {
        let response = self
            .http
            .get(format!("{}/banks", self.base_url))
            .header("Authorization", self.bearer())
            .send()
            .await
            .map_err(|e| Self::transport_error("bank directory fetch", e))?;

        if !response.status().is_success() {
            return Err(AppError::GatewayError(format!(
                "bank directory fetch returned {}",
                response.status()
            )));
        }

        response
            .json()
            .await
            .map_err(|e| Self::transport_error("bank directory fetch", e))
    }
}
