//! Outbound payment-initiation call. The gateway is an opaque collaborator:
//! one unauthenticated-user-facing POST, no callback handling and no
//! reconciliation of payment state against the job row.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum PaymentError {
    #[error("payment gateway request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("payment gateway declined: {0}")]
    Declined(String),
}

#[derive(Debug, Serialize)]
pub struct Customer {
    pub email: String,
    pub phonenumber: String,
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct Customizations {
    pub title: String,
    pub description: String,
}

#[derive(Debug, Serialize)]
pub struct PaymentRequest {
    pub tx_ref: String,
    pub amount: u32,
    pub currency: String,
    pub redirect_url: String,
    pub customer: Customer,
    pub customizations: Customizations,
}

#[derive(Debug, Deserialize)]
pub struct PaymentResponse {
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub data: Option<PaymentLink>,
}

#[derive(Debug, Deserialize)]
pub struct PaymentLink {
    pub link: String,
}

/// Seam for the external gateway so tests can swap in a fake.
#[async_trait]
pub trait PaymentClient: Send + Sync {
    /// Returns the hosted checkout link on success.
    async fn initiate(&self, request: &PaymentRequest) -> Result<String, PaymentError>;
}

pub struct HttpPaymentClient {
    http: reqwest::Client,
    api_url: String,
    secret_key: String,
}

impl HttpPaymentClient {
    pub fn new(api_url: &str, secret_key: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_url: api_url.to_string(),
            secret_key: secret_key.to_string(),
        }
    }
}

#[async_trait]
impl PaymentClient for HttpPaymentClient {
    async fn initiate(&self, request: &PaymentRequest) -> Result<String, PaymentError> {
        let response = self
            .http
            .post(&self.api_url)
            .bearer_auth(&self.secret_key)
            .json(request)
            .send()
            .await?;

        let body: PaymentResponse = response.json().await?;
        debug!(status = %body.status, tx_ref = %request.tx_ref, "payment gateway replied");

        if body.status == "success" {
            if let Some(data) = body.data {
                return Ok(data.link);
            }
        }
        Err(PaymentError::Declined(
            body.message.unwrap_or(body.status),
        ))
    }
}
