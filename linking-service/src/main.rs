//! Linking service entry point.
//!
//! Back-office batch: given a signup's external id and Stripe customer
//! credentials, links every eligible recurring donation to a new Stripe
//! subscription. Runs in dry-run mode unless `--write` is passed.

use clap::Parser;
use linker_core::observability::init_tracing;
use linker_core::tenant::{with_tenant, TenantContext};
use linking_service::config::Config;
use linking_service::services::{Database, LinkRecurringDonations, PlanRepository, StripeClient};
use secrecy::ExposeSecret;

#[derive(Parser, Debug)]
#[command(name = "linking-service")]
#[command(about = "Link a signup's imported recurring donations to Stripe subscriptions")]
struct Args {
    /// Tenant slug this batch applies to.
    #[arg(long)]
    slug: String,

    /// The signup's external customer id.
    #[arg(long)]
    external_customer_id: String,

    /// The Stripe customer id to attach subscriptions to.
    #[arg(long)]
    stripe_customer_id: String,

    /// The Stripe payment method id to charge.
    #[arg(long)]
    default_payment_method: String,

    /// Actually create subscriptions and persist linkage. Without this flag
    /// the batch validates the data without touching Stripe or the database.
    #[arg(long)]
    write: bool,

    /// Log verbose output.
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let config = Config::from_env()?;

    let log_level = if args.verbose {
        "debug"
    } else {
        config.log_level.as_str()
    };
    init_tracing(log_level);

    let dry_run = !args.write;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        service_name = %config.service_name,
        environment = %config.environment,
        dry_run,
        "Starting linking batch"
    );

    let db = Database::new(
        config.database.url.expose_secret(),
        config.database.max_connections,
        config.database.min_connections,
    )
    .await?;
    db.run_migrations().await?;

    let stripe = StripeClient::new(config.stripe.api_base_url.clone());
    let plans = PlanRepository::new(stripe.clone());

    let tenant = TenantContext::new(args.slug.trim(), config.environment.clone());

    let job = LinkRecurringDonations {
        signup_external_id: args.external_customer_id.trim().to_string(),
        stripe_customer_id: args.stripe_customer_id.trim().to_string(),
        default_payment_method: args.default_payment_method.trim().to_string(),
        validate_only: dry_run,
    };

    tracing::info!(
        signup_external_id = %job.signup_external_id,
        "Processing subscriptions for signup"
    );

    let signup = with_tenant(tenant, job.run(&db, &plans, &stripe))
        .await
        .map_err(|error| {
            tracing::error!(error = %error, "Linking batch failed");
            anyhow::Error::new(error)
        })?;

    if dry_run {
        tracing::info!(
            signup_external_id = %signup.external_id,
            "The subscription data is VALID"
        );
    } else {
        tracing::info!(
            signup_external_id = %signup.external_id,
            "The subscriptions have been CREATED"
        );
    }

    Ok(())
}
