use thiserror::Error;
use uuid::Uuid;

/// Failures raised while linking recurring donations to processor
/// subscriptions. All variants are terminal for the current batch: the
/// first error aborts the remaining donations and propagates to the caller.
#[derive(Debug, Error)]
pub enum LinkError {
    #[error(
        "Could not find Signup with an external id of '{external_id}' \
         while trying to link it to Stripe account '{stripe_customer_id}'"
    )]
    SignupNotFound {
        external_id: String,
        stripe_customer_id: String,
    },

    #[error(
        "For the recurring donation {donation_id} there was no previous \
         successful payment date to determine the next payment date"
    )]
    NoPreviousPayment { donation_id: Uuid },

    #[error(
        "For the recurring donation {donation_id} there was an issue \
         translating the time period type '{value}' to a value Stripe can use"
    )]
    NoInterval { donation_id: Uuid, value: String },

    #[error("Metadata error: {0}")]
    MetaData(anyhow::Error),

    #[error("Item data error: {0}")]
    ItemData(anyhow::Error),

    #[error(
        "There was a failure in trying to create a Stripe subscription \
         for recurring donation {donation_id}"
    )]
    SubscriptionCreation { donation_id: Uuid },

    #[error("Database error: {0}")]
    Database(anyhow::Error),

    #[error("Processor error: {0}")]
    Processor(anyhow::Error),

    #[error("Configuration error: {0}")]
    Config(anyhow::Error),
}
