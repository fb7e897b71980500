//! Stripe API client.
//!
//! Implements subscription creation and plan listing against Stripe's
//! form-encoded REST API. Credentials are merchant-scoped and supplied per
//! call via [`StripeConfig`]; the client itself only carries the base URL
//! and the retry policy.

use crate::models::{StripeConfig, SubscriptionRequest};
use async_trait::async_trait;
use linker_core::error::LinkError;
use linker_core::retry::{retry_call, RetryConfig};
use secrecy::ExposeSecret;
use serde::Deserialize;
use thiserror::Error;
use tracing::warn;

/// Seam for creating processor subscriptions.
///
/// `Ok(None)` means the wrapper suppressed an underlying failure without
/// producing a subscription (test-mode policy); callers must treat the
/// absence of an id as fatal regardless of why.
#[async_trait]
pub trait SubscriptionGateway: Send + Sync {
    async fn create_subscription(
        &self,
        config: &StripeConfig,
        request: &SubscriptionRequest,
    ) -> Result<Option<StripeSubscription>, LinkError>;
}

/// Stripe client for interacting with the Stripe API.
#[derive(Clone)]
pub struct StripeClient {
    client: reqwest::Client,
    api_base_url: String,
    retry: RetryConfig,
}

/// Subscription as returned by Stripe. Only the identifier matters to the
/// linking engine; the rest is logged for diagnostics.
#[derive(Debug, Clone, Deserialize)]
pub struct StripeSubscription {
    pub id: String,
    #[serde(default)]
    pub status: Option<String>,
}

/// Plan as returned by Stripe's plan listing.
#[derive(Debug, Clone, Deserialize)]
pub struct StripePlan {
    pub id: String,
    pub interval: String,
    pub interval_count: i32,
    #[serde(default)]
    pub active: bool,
}

#[derive(Debug, Deserialize)]
struct PlanList {
    data: Vec<StripePlan>,
}

/// Stripe API error envelope.
#[derive(Debug, Deserialize)]
struct StripeErrorEnvelope {
    error: StripeErrorDetail,
}

#[derive(Debug, Deserialize)]
struct StripeErrorDetail {
    #[serde(rename = "type")]
    error_type: Option<String>,
    code: Option<String>,
    message: Option<String>,
}

/// Failures from the Stripe API or its transport.
#[derive(Debug, Error)]
pub enum StripeError {
    #[error("Stripe error ({status}) {error_type}: {message}")]
    Api {
        status: u16,
        error_type: String,
        code: Option<String>,
        message: String,
    },

    #[error("Stripe transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

impl StripeError {
    /// Whether a retry could plausibly succeed: rate limits, lock
    /// contention, Stripe-side 5xx, and transport failures.
    pub fn is_transient(&self) -> bool {
        match self {
            StripeError::Api { status, code, .. } => {
                *status == 429 || *status >= 500 || code.as_deref() == Some("lock_timeout")
            }
            StripeError::Transport(_) => true,
        }
    }
}

impl StripeClient {
    /// Create a new Stripe client.
    pub fn new(api_base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_base_url: api_base_url.into(),
            retry: RetryConfig::default(),
        }
    }

    /// Override the retry policy.
    pub fn with_retry_config(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Create a subscription. One attempt, no policy applied.
    async fn create_subscription_once(
        &self,
        config: &StripeConfig,
        request: &SubscriptionRequest,
    ) -> Result<StripeSubscription, StripeError> {
        let url = format!("{}/subscriptions", self.api_base_url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(config.secret_key.expose_secret())
            .form(&request.to_form_params())
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        tracing::debug!(status = %status, "Stripe create_subscription response");

        if status.is_success() {
            let subscription: StripeSubscription =
                serde_json::from_str(&body).map_err(|e| StripeError::Api {
                    status: status.as_u16(),
                    error_type: "invalid_response".to_string(),
                    code: None,
                    message: format!("unparseable success body: {}", e),
                })?;
            tracing::info!(
                subscription_id = %subscription.id,
                status = ?subscription.status,
                "Stripe subscription created"
            );
            Ok(subscription)
        } else {
            Err(Self::api_error(status.as_u16(), &body))
        }
    }

    /// List active plans visible to the merchant's configuration.
    pub async fn list_plans(
        &self,
        config: &StripeConfig,
    ) -> Result<Vec<StripePlan>, StripeError> {
        let url = format!("{}/plans", self.api_base_url);

        let response = self
            .client
            .get(&url)
            .bearer_auth(config.secret_key.expose_secret())
            .query(&[("limit", "100"), ("active", "true")])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if status.is_success() {
            let list: PlanList = serde_json::from_str(&body).map_err(|e| StripeError::Api {
                status: status.as_u16(),
                error_type: "invalid_response".to_string(),
                code: None,
                message: format!("unparseable plan list: {}", e),
            })?;
            Ok(list.data)
        } else {
            Err(Self::api_error(status.as_u16(), &body))
        }
    }

    fn api_error(status: u16, body: &str) -> StripeError {
        let detail = serde_json::from_str::<StripeErrorEnvelope>(body)
            .map(|envelope| envelope.error)
            .unwrap_or_else(|_| StripeErrorDetail {
                error_type: None,
                code: None,
                message: Some(body.to_string()),
            });

        let error = StripeError::Api {
            status,
            error_type: detail.error_type.unwrap_or_else(|| "unknown".to_string()),
            code: detail.code,
            message: detail.message.unwrap_or_default(),
        };

        tracing::error!(error = %error, "Stripe API call failed");

        error
    }
}

#[async_trait]
impl SubscriptionGateway for StripeClient {
    /// Create a subscription under the processor error policy: transient
    /// failures are retried with backoff; in test mode remaining failures
    /// are logged and suppressed, in live mode they propagate.
    async fn create_subscription(
        &self,
        config: &StripeConfig,
        request: &SubscriptionRequest,
    ) -> Result<Option<StripeSubscription>, LinkError> {
        let result = retry_call(
            &self.retry,
            "create_subscription",
            StripeError::is_transient,
            || self.create_subscription_once(config, request),
        )
        .await;

        match result {
            Ok(subscription) => Ok(Some(subscription)),
            Err(error) if config.test_mode => {
                warn!(
                    error = %error,
                    "Stripe subscription creation failed in test mode, suppressing"
                );
                Ok(None)
            }
            Err(error) => Err(LinkError::Processor(anyhow::Error::new(error))),
        }
    }
}
