//! Ephemeral Stripe subscription request payload.
//!
//! Computed once per linking attempt and handed to the processor; never
//! persisted. Stripe's API takes form-encoded bodies, so the payload knows
//! how to flatten itself into key/value pairs.

use serde::Serialize;

/// Single line item: the resolved plan billed at the donation's amount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubscriptionItem {
    pub plan: String,
    /// Always the donation's amount in minor currency units.
    pub quantity: i64,
}

/// Metadata attached to the subscription for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubscriptionMetadata {
    pub tenant_slug: String,
    pub environment: String,
}

/// The full create-subscription payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubscriptionRequest {
    pub customer: String,
    pub default_payment_method: String,
    pub off_session: bool,
    pub payment_behavior: String,
    /// Billing anchor: unix seconds of the computed next payment date.
    pub trial_end: i64,
    pub metadata: SubscriptionMetadata,
    pub items: Vec<SubscriptionItem>,
    /// Connected-account routing.
    pub on_behalf_of: String,
    pub transfer_destination: String,
}

impl SubscriptionRequest {
    /// Flatten into Stripe's form-encoded parameter shape.
    pub fn to_form_params(&self) -> Vec<(String, String)> {
        let mut params = vec![
            ("customer".to_string(), self.customer.clone()),
            (
                "default_payment_method".to_string(),
                self.default_payment_method.clone(),
            ),
            ("off_session".to_string(), self.off_session.to_string()),
            (
                "payment_behavior".to_string(),
                self.payment_behavior.clone(),
            ),
            ("trial_end".to_string(), self.trial_end.to_string()),
            (
                "metadata[tenant_slug]".to_string(),
                self.metadata.tenant_slug.clone(),
            ),
            (
                "metadata[environment]".to_string(),
                self.metadata.environment.clone(),
            ),
        ];

        for (index, item) in self.items.iter().enumerate() {
            params.push((format!("items[{}][plan]", index), item.plan.clone()));
            params.push((
                format!("items[{}][quantity]", index),
                item.quantity.to_string(),
            ));
        }

        params.push(("on_behalf_of".to_string(), self.on_behalf_of.clone()));
        params.push((
            "transfer_data[destination]".to_string(),
            self.transfer_destination.clone(),
        ));

        params
    }
}
