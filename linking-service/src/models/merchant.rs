//! Merchant account model and processor configuration.

use chrono::{DateTime, Utc};
use secrecy::Secret;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Identifies which Stripe credentials and connected-account routing apply
/// to a donation.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct MerchantAccount {
    pub merchant_account_id: Uuid,
    pub name: String,
    pub stripe_secret_key: String,
    pub test_mode: bool,
    pub connected_account_id: String,
    pub created_utc: DateTime<Utc>,
}

/// Stripe configuration resolved from a merchant account.
#[derive(Debug, Clone)]
pub struct StripeConfig {
    pub secret_key: Secret<String>,
    pub test_mode: bool,
    pub connected_account_id: String,
}

impl StripeConfig {
    pub fn from_merchant_account(account: &MerchantAccount) -> Self {
        Self {
            secret_key: Secret::new(account.stripe_secret_key.clone()),
            test_mode: account.test_mode,
            connected_account_id: account.connected_account_id.clone(),
        }
    }
}
