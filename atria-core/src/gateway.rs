use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

/// An order minted with the payment provider, authorizing collection of a
/// specific amount. `amount` is in minor units (paise).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayOrder {
    pub id: String,
    pub amount: i64,
    pub currency: String,
    pub status: String,
}

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("gateway request failed: {0}")]
    Transport(String),

    #[error("gateway rejected order: {0}")]
    Rejected(String),
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Mint an order for `amount` minor units. `receipt` is our booking id;
    /// `notes` travel with the order for reconciliation.
    async fn create_order(
        &self,
        amount: i64,
        currency: &str,
        receipt: &str,
        notes: HashMap<String, String>,
    ) -> Result<GatewayOrder, GatewayError>;
}

/// Deterministic stand-in used when gateway credentials are absent. Orders
/// never leave the process and verification is skipped downstream.
pub struct MockGateway;

#[async_trait]
impl PaymentGateway for MockGateway {
    async fn create_order(
        &self,
        amount: i64,
        currency: &str,
        _receipt: &str,
        _notes: HashMap<String, String>,
    ) -> Result<GatewayOrder, GatewayError> {
        let suffix = Uuid::new_v4().simple().to_string();
        let order = GatewayOrder {
            id: format!("order_mock_{}", &suffix[..8]),
            amount,
            currency: currency.to_string(),
            status: "created".to_string(),
        };
        info!(order_id = %order.id, amount, "mock gateway order created");
        Ok(order)
    }
}

#[derive(Debug, Serialize)]
struct CreateOrderBody<'a> {
    amount: i64,
    currency: &'a str,
    receipt: &'a str,
    notes: HashMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct OrderResponse {
    id: String,
    amount: i64,
    currency: String,
    status: String,
}

/// Razorpay Orders API client. Credentials are the key id/secret pair from
/// the dashboard; the secret never leaves this process.
pub struct RazorpayGateway {
    http: reqwest::Client,
    base_url: String,
    key_id: String,
    key_secret: String,
}

impl RazorpayGateway {
    pub const DEFAULT_BASE_URL: &'static str = "https://api.razorpay.com";

    pub fn new(key_id: String, key_secret: String, base_url: Option<String>) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .expect("reqwest client construction");
        Self {
            http,
            base_url: base_url.unwrap_or_else(|| Self::DEFAULT_BASE_URL.to_string()),
            key_id,
            key_secret,
        }
    }
}

#[async_trait]
impl PaymentGateway for RazorpayGateway {
    async fn create_order(
        &self,
        amount: i64,
        currency: &str,
        receipt: &str,
        notes: HashMap<String, String>,
    ) -> Result<GatewayOrder, GatewayError> {
        let url = format!("{}/v1/orders", self.base_url);
        let body = CreateOrderBody {
            amount,
            currency,
            receipt,
            notes,
        };

        let response = self
            .http
            .post(&url)
            .basic_auth(&self.key_id, Some(&self.key_secret))
            .json(&body)
            .send()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = response.text().await.unwrap_or_default();
            return Err(GatewayError::Rejected(format!("{}: {}", status, detail)));
        }

        let order: OrderResponse = response
            .json()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        info!(order_id = %order.id, amount, "gateway order created");
        Ok(GatewayOrder {
            id: order.id,
            amount: order.amount,
            currency: order.currency,
            status: order.status,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn mock_orders_carry_the_requested_amount() {
        let order = MockGateway
            .create_order(100_000, "INR", "booking-1", HashMap::new())
            .await
            .unwrap();
        assert!(order.id.starts_with("order_mock_"));
        assert_eq!(order.id.len(), "order_mock_".len() + 8);
        assert_eq!(order.amount, 100_000);
        assert_eq!(order.currency, "INR");
        assert_eq!(order.status, "created");
    }

    #[tokio::test]
    async fn mock_order_ids_are_unique() {
        let a = MockGateway
            .create_order(100, "INR", "b", HashMap::new())
            .await
            .unwrap();
        let b = MockGateway
            .create_order(100, "INR", "b", HashMap::new())
            .await
            .unwrap();
        assert_ne!(a.id, b.id);
    }
}
