//! Signup batch orchestrator.

use crate::models::Signup;
use crate::services::{DonationLinker, PlanResolver, SignupStore, SubscriptionGateway};
use linker_core::error::LinkError;
use tracing::{info, instrument};

/// Links every eligible recurring donation of a signup, sequentially and
/// fail-fast: the first linker error aborts the remaining batch, leaving
/// already-linked donations active. No rollback is attempted.
pub struct LinkRecurringDonations {
    pub signup_external_id: String,
    pub stripe_customer_id: String,
    pub default_payment_method: String,
    pub validate_only: bool,
}

impl LinkRecurringDonations {
    #[instrument(
        skip(self, store, plans, gateway),
        fields(
            signup_external_id = %self.signup_external_id,
            validate_only = self.validate_only
        )
    )]
    pub async fn run<S, P, G>(
        &self,
        store: &S,
        plans: &P,
        gateway: &G,
    ) -> Result<Signup, LinkError>
    where
        S: SignupStore,
        P: PlanResolver,
        G: SubscriptionGateway,
    {
        let signup = store
            .find_signup(&self.signup_external_id)
            .await?
            .ok_or_else(|| LinkError::SignupNotFound {
                external_id: self.signup_external_id.clone(),
                stripe_customer_id: self.stripe_customer_id.clone(),
            })?;

        let donations = store.eligible_donations(signup.signup_id).await?;

        info!(
            signup_id = %signup.signup_id,
            count = donations.len(),
            "Linking eligible recurring donations"
        );

        let linker = DonationLinker::new(store, plans, gateway);

        for donation in &donations {
            linker
                .link(
                    donation,
                    &self.stripe_customer_id,
                    &self.default_payment_method,
                    self.validate_only,
                )
                .await?;
        }

        Ok(signup)
    }
}
