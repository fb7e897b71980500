//! Per-donation linker: computes the billing schedule, assembles the Stripe
//! payload, and transitions the donation to active.

use crate::models::{
    BillingUnit, RecurringDonation, StripeConfig, SubscriptionItem, SubscriptionMetadata,
    SubscriptionRequest,
};
use crate::services::{PlanResolver, SignupStore, SubscriptionGateway};
use linker_core::error::LinkError;
use linker_core::tenant::TenantContext;
use tracing::{debug, info, instrument};

/// Stripe payment behavior for off-session recurring charges.
const PAYMENT_BEHAVIOR: &str = "allow_incomplete";

/// Links one recurring donation to a Stripe subscription.
///
/// Validate-only and commit mode share a single code path: every derivation
/// and the full payload assembly run identically in both, and only the
/// processor call plus the activation are gated behind the commit switch.
pub struct DonationLinker<'a, S, P, G> {
    store: &'a S,
    plans: &'a P,
    gateway: &'a G,
}

impl<'a, S, P, G> DonationLinker<'a, S, P, G>
where
    S: SignupStore,
    P: PlanResolver,
    G: SubscriptionGateway,
{
    pub fn new(store: &'a S, plans: &'a P, gateway: &'a G) -> Self {
        Self {
            store,
            plans,
            gateway,
        }
    }

    /// Link `donation` to a new subscription for `stripe_customer_id`.
    ///
    /// Returns the donation unchanged in validate-only mode (after proving
    /// the payload assembles), or the activated donation after a successful
    /// create call.
    #[instrument(
        skip(self, donation, default_payment_method),
        fields(donation_id = %donation.donation_id)
    )]
    pub async fn link(
        &self,
        donation: &RecurringDonation,
        stripe_customer_id: &str,
        default_payment_method: &str,
        validate_only: bool,
    ) -> Result<RecurringDonation, LinkError> {
        // The new subscription's schedule anchors off the last successful
        // payment, so a donation without one cannot be linked yet.
        let last_payment_date =
            donation
                .last_successful_payment_date
                .ok_or(LinkError::NoPreviousPayment {
                    donation_id: donation.donation_id,
                })?;

        let unit = BillingUnit::from_period_type(&donation.time_period_type).ok_or_else(|| {
            LinkError::NoInterval {
                donation_id: donation.donation_id,
                value: donation.time_period_type.clone(),
            }
        })?;

        let next_payment_date = unit
            .advance(last_payment_date, donation.num_time_periods)
            .ok_or_else(|| LinkError::NoInterval {
                donation_id: donation.donation_id,
                value: format!(
                    "{} {}",
                    donation.num_time_periods, donation.time_period_type
                ),
            })?;

        let account = self
            .store
            .merchant_account(donation.merchant_account_id)
            .await?;
        let config = StripeConfig::from_merchant_account(&account);

        let plan = self
            .plans
            .resolve(&config, unit, donation.num_time_periods)
            .await
            .map_err(LinkError::ItemData)?;
        let item = SubscriptionItem {
            plan,
            quantity: donation.amount_minor,
        };

        let tenant = TenantContext::current().map_err(LinkError::MetaData)?;
        let metadata = SubscriptionMetadata {
            tenant_slug: tenant.slug,
            environment: tenant.environment,
        };

        let request = SubscriptionRequest {
            customer: stripe_customer_id.to_string(),
            default_payment_method: default_payment_method.to_string(),
            off_session: true,
            payment_behavior: PAYMENT_BEHAVIOR.to_string(),
            trial_end: next_payment_date.timestamp(),
            metadata,
            items: vec![item],
            on_behalf_of: config.connected_account_id.clone(),
            transfer_destination: config.connected_account_id.clone(),
        };

        if validate_only {
            debug!(
                donation_id = %donation.donation_id,
                trial_end = request.trial_end,
                "Payload assembled, skipping processor call (validate-only)"
            );
            return Ok(donation.clone());
        }

        let subscription = self
            .gateway
            .create_subscription(&config, &request)
            .await?
            .filter(|subscription| !subscription.id.is_empty())
            .ok_or(LinkError::SubscriptionCreation {
                donation_id: donation.donation_id,
            })?;

        let activated = self
            .store
            .activate_donation(
                donation.donation_id,
                &subscription.id,
                None,
                next_payment_date,
                last_payment_date,
            )
            .await?;

        info!(
            donation_id = %activated.donation_id,
            subscription_id = %subscription.id,
            next_bill_date = %next_payment_date,
            "Donation linked to subscription"
        );

        Ok(activated)
    }
}
