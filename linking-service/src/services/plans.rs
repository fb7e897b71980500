//! Plan resolution: maps a billing cadence to a Stripe plan id.

use crate::models::{BillingUnit, StripeConfig};
use crate::services::StripeClient;
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use tracing::debug;

/// Resolves (interval unit, interval count) to a processor plan identifier
/// under a merchant's configuration.
#[async_trait]
pub trait PlanResolver: Send + Sync {
    async fn resolve(
        &self,
        config: &StripeConfig,
        unit: BillingUnit,
        interval_count: i32,
    ) -> Result<String>;
}

/// Stripe-backed plan resolver: lists the merchant's active plans and picks
/// the one whose cadence matches the donation's.
pub struct PlanRepository {
    client: StripeClient,
}

impl PlanRepository {
    pub fn new(client: StripeClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PlanResolver for PlanRepository {
    async fn resolve(
        &self,
        config: &StripeConfig,
        unit: BillingUnit,
        interval_count: i32,
    ) -> Result<String> {
        let plans = self
            .client
            .list_plans(config)
            .await
            .context("failed to list Stripe plans")?;

        let plan = plans
            .into_iter()
            .find(|plan| {
                plan.active && plan.interval == unit.as_str() && plan.interval_count == interval_count
            })
            .ok_or_else(|| {
                anyhow!(
                    "no active Stripe plan matches interval '{}' with count {}",
                    unit.as_str(),
                    interval_count
                )
            })?;

        debug!(plan_id = %plan.id, interval = unit.as_str(), interval_count, "Plan resolved");

        Ok(plan.id)
    }
}
