//! Data models for the linking service.

mod donation;
mod merchant;
mod signup;
mod subscription;

pub use donation::{BillingUnit, DonationStatus, RecurringDonation};
pub use merchant::{MerchantAccount, StripeConfig};
pub use signup::Signup;
pub use subscription::{SubscriptionItem, SubscriptionMetadata, SubscriptionRequest};
