//! Payment service client
//!
//! HTTP client for the payment microservice: method lookup and retry.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

use crate::core::{AegisError, Config, Result};

/// Payment collaborator contract.
///
/// Both calls return the service's domain payload as a JSON mapping; any
/// transport or status failure is an error for the dispatcher to normalize.
#[async_trait]
pub trait PaymentApi: Send + Sync {
    /// Fetch the payment methods on file for a user
    async fn get_payment_methods(&self, user_id: i64) -> Result<Value>;

    /// Retry a failed payment with a specific method
    async fn retry_payment(&self, order_id: i64, payment_method_id: &str) -> Result<Value>;
}

/// HTTP client for the payment service
#[derive(Clone)]
pub struct PaymentClient {
    client: Client,
    base_url: String,
}

#[derive(Debug, Serialize)]
struct MethodsRequest {
    user_id: i64,
}

#[derive(Debug, Serialize, Deserialize)]
struct PaymentMethod {
    payment_method_id: String,
    method_type: String,
    status: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct MethodsResponse {
    payment_methods: Vec<PaymentMethod>,
}

#[derive(Debug, Serialize)]
struct RetryRequest<'a> {
    order_id: i64,
    payment_method_id: &'a str,
}

#[derive(Debug, Serialize, Deserialize)]
struct RetryResponse {
    status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    transaction_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<String>,
}

impl PaymentClient {
    /// Create a new payment client from configuration
    pub fn from_config(config: &Config) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.payment.timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            base_url: config.payment.base_url.clone(),
        }
    }

    /// Create a client with a custom base URL
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            base_url: base_url.into(),
        }
    }

    fn connect_error(&self, e: reqwest::Error) -> AegisError {
        if e.is_connect() {
            AegisError::tool(format!(
                "Cannot connect to the payment service at {}. Is it running?",
                self.base_url
            ))
        } else {
            AegisError::from(e)
        }
    }

    async fn post_json<T: Serialize, R: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
        body: &T,
    ) -> Result<R> {
        let response = self
            .client
            .post(format!("{}{}", self.base_url, path))
            .json(body)
            .send()
            .await
            .map_err(|e| self.connect_error(e))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(AegisError::tool(format!(
                "Payment service error ({}): {}",
                status, error_text
            )));
        }

        let parsed = response
            .json::<R>()
            .await
            .map_err(|e| AegisError::tool(format!("Failed to parse payment response: {}", e)))?;

        Ok(parsed)
    }
}

#[async_trait]
impl PaymentApi for PaymentClient {
    async fn get_payment_methods(&self, user_id: i64) -> Result<Value> {
        tracing::debug!(user_id, "fetching payment methods");
        let response: MethodsResponse = self
            .post_json("/get_payment_methods", &MethodsRequest { user_id })
            .await?;
        Ok(serde_json::to_value(response)?)
    }

    async fn retry_payment(&self, order_id: i64, payment_method_id: &str) -> Result<Value> {
        tracing::debug!(order_id, payment_method_id, "retrying payment");
        let response: RetryResponse = self
            .post_json(
                "/retry_payment",
                &RetryRequest {
                    order_id,
                    payment_method_id,
                },
            )
            .await?;
        Ok(serde_json::to_value(response)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_methods_response_shape() {
        let json = r#"{"payment_methods": [
            {"payment_method_id": "card_B_paypal", "method_type": "paypal", "status": "active"}
        ]}"#;
        let parsed: MethodsResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.payment_methods.len(), 1);
        assert_eq!(parsed.payment_methods[0].status, "active");
    }

    #[test]
    fn test_retry_response_omits_absent_fields() {
        let response = RetryResponse {
            status: "success".to_string(),
            transaction_id: Some("txn_7_paypal".to_string()),
            reason: None,
        };
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["status"], "success");
        assert!(value.get("reason").is_none());
    }
}
