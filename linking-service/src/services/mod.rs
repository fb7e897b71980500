//! Service layer: persistence, Stripe client, plan resolution, and the
//! linking engine itself.

mod database;
mod linker;
mod linking;
mod plans;
mod stripe;

pub use database::{Database, SignupStore};
pub use linker::DonationLinker;
pub use linking::LinkRecurringDonations;
pub use plans::{PlanRepository, PlanResolver};
pub use stripe::{StripeClient, StripeError, StripePlan, StripeSubscription, SubscriptionGateway};
