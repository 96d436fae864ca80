use reqwest::{Client, RequestBuilder, Response};
use thiserror::Error;

use super::types::{CreateOrderRequest, CreateOrderResponse, GatewayErrorBody, GatewayOrder};

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("payment gateway request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("payment gateway error: {message}")]
    Rejected { status: u16, message: String },

    #[error("unexpected payment gateway response: {0}")]
    Unexpected(String),
}

#[derive(Debug, Clone)]
pub struct GatewayCredentials {
    pub client_id: String,
    pub client_secret: String,
    pub api_version: String,
}

/// Client for the payment gateway's order API.
#[derive(Debug, Clone)]
pub struct GatewayClient {
    http: Client,
    credentials: GatewayCredentials,
    base_url: String,
}

impl GatewayClient {
    pub fn new(http: Client, credentials: GatewayCredentials, base_url: impl Into<String>) -> Self {
        Self {
            http,
            credentials,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Attach the client-id/secret and API version headers.
    fn authenticated(&self, req: RequestBuilder) -> RequestBuilder {
        req.header("x-client-id", &self.credentials.client_id)
            .header("x-client-secret", &self.credentials.client_secret)
            .header("x-api-version", &self.credentials.api_version)
    }

    /// Create an order; the response's session id drives the hosted checkout.
    pub async fn create_order(
        &self,
        request: &CreateOrderRequest,
    ) -> Result<CreateOrderResponse, GatewayError> {
        let url = format!("{}/orders", self.base_url);
        let resp = self
            .authenticated(self.http.post(&url))
            .json(request)
            .send()
            .await?;

        let resp = check_status(resp).await?;
        let created: CreateOrderResponse = resp.json().await?;

        if created.payment_session_id.is_none() {
            return Err(GatewayError::Unexpected(
                "order created without a payment session".into(),
            ));
        }

        Ok(created)
    }

    /// Fetch the gateway's view of an order.
    pub async fn fetch_order(&self, order_id: &str) -> Result<GatewayOrder, GatewayError> {
        let url = format!("{}/orders/{}", self.base_url, order_id);
        let resp = self.authenticated(self.http.get(&url)).send().await?;

        let resp = check_status(resp).await?;
        let order: GatewayOrder = resp.json().await?;
        Ok(order)
    }
}

/// Turn a non-2xx answer into `Rejected`, carrying the gateway's own message.
async fn check_status(resp: Response) -> Result<Response, GatewayError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }

    let body = resp.text().await.unwrap_or_default();
    let message = serde_json::from_str::<GatewayErrorBody>(&body)
        .ok()
        .and_then(|b| b.message.or(b.code))
        .unwrap_or_else(|| {
            if body.is_empty() {
                status.to_string()
            } else {
                body.clone()
            }
        });

    Err(GatewayError::Rejected {
        status: status.as_u16(),
        message,
    })
}
