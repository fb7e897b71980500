//! Database service for the linking batch.

use crate::models::{MerchantAccount, RecurringDonation, Signup};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use linker_core::error::LinkError;
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;
use tracing::{info, instrument};
use uuid::Uuid;

/// Persistence seam consumed by the linking engine.
///
/// Signups and merchant accounts are read-only; the only mutation this
/// subsystem performs is the pending→active donation transition.
#[async_trait]
pub trait SignupStore: Send + Sync {
    async fn find_signup(&self, external_id: &str) -> Result<Option<Signup>, LinkError>;

    /// Donations satisfying `imported && status = 'pending'`, in persisted
    /// natural order (stable for a given stored ordering).
    async fn eligible_donations(
        &self,
        signup_id: Uuid,
    ) -> Result<Vec<RecurringDonation>, LinkError>;

    async fn merchant_account(&self, account_id: Uuid) -> Result<MerchantAccount, LinkError>;

    /// Persist the pending→active transition after a successful processor
    /// create call.
    async fn activate_donation(
        &self,
        donation_id: Uuid,
        subscription_id: &str,
        payment_method: Option<&str>,
        next_bill_date: DateTime<Utc>,
        last_pay_date: DateTime<Utc>,
    ) -> Result<RecurringDonation, LinkError>;
}

/// Database connection pool wrapper.
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Create a new database connection pool.
    #[instrument(skip(database_url), fields(service = "linking-service"))]
    pub async fn new(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self, LinkError> {
        info!(
            max_connections = max_connections,
            min_connections = min_connections,
            "Connecting to PostgreSQL"
        );

        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(Duration::from_secs(30))
            .idle_timeout(Duration::from_secs(600))
            .connect(database_url)
            .await
            .map_err(|e| LinkError::Database(anyhow::anyhow!("Failed to connect: {}", e)))?;

        info!("PostgreSQL connection pool established");

        Ok(Self { pool })
    }

    /// Get a reference to the connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Check database health.
    #[instrument(skip(self))]
    pub async fn health_check(&self) -> Result<(), LinkError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| LinkError::Database(anyhow::anyhow!("Health check failed: {}", e)))?;
        Ok(())
    }

    /// Run database migrations.
    #[instrument(skip(self))]
    pub async fn run_migrations(&self) -> Result<(), LinkError> {
        info!("Running database migrations");
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| LinkError::Database(anyhow::anyhow!("Migration failed: {}", e)))?;
        info!("Database migrations completed");
        Ok(())
    }
}

#[async_trait]
impl SignupStore for Database {
    #[instrument(skip(self), fields(external_id = %external_id))]
    async fn find_signup(&self, external_id: &str) -> Result<Option<Signup>, LinkError> {
        let signup = sqlx::query_as::<_, Signup>(
            r#"
            SELECT signup_id, external_id, email, created_utc, updated_utc
            FROM signups
            WHERE external_id = $1
            "#,
        )
        .bind(external_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| LinkError::Database(anyhow::anyhow!("Failed to find signup: {}", e)))?;

        Ok(signup)
    }

    #[instrument(skip(self), fields(signup_id = %signup_id))]
    async fn eligible_donations(
        &self,
        signup_id: Uuid,
    ) -> Result<Vec<RecurringDonation>, LinkError> {
        let donations = sqlx::query_as::<_, RecurringDonation>(
            r#"
            SELECT donation_id, signup_id, amount_minor, time_period_type,
                   num_time_periods, imported, status,
                   last_successful_payment_date, merchant_account_id,
                   stripe_subscription_id, default_payment_method,
                   next_bill_date, last_pay_date, created_utc, updated_utc
            FROM recurring_donations
            WHERE signup_id = $1 AND imported = TRUE AND status = 'pending'
            ORDER BY created_utc, donation_id
            "#,
        )
        .bind(signup_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            LinkError::Database(anyhow::anyhow!("Failed to list eligible donations: {}", e))
        })?;

        info!(count = donations.len(), "Eligible donations selected");

        Ok(donations)
    }

    #[instrument(skip(self), fields(account_id = %account_id))]
    async fn merchant_account(&self, account_id: Uuid) -> Result<MerchantAccount, LinkError> {
        let account = sqlx::query_as::<_, MerchantAccount>(
            r#"
            SELECT merchant_account_id, name, stripe_secret_key, test_mode,
                   connected_account_id, created_utc
            FROM merchant_accounts
            WHERE merchant_account_id = $1
            "#,
        )
        .bind(account_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            LinkError::Database(anyhow::anyhow!(
                "Failed to load merchant account {}: {}",
                account_id,
                e
            ))
        })?;

        Ok(account)
    }

    #[instrument(skip(self, subscription_id), fields(donation_id = %donation_id))]
    async fn activate_donation(
        &self,
        donation_id: Uuid,
        subscription_id: &str,
        payment_method: Option<&str>,
        next_bill_date: DateTime<Utc>,
        last_pay_date: DateTime<Utc>,
    ) -> Result<RecurringDonation, LinkError> {
        let donation = sqlx::query_as::<_, RecurringDonation>(
            r#"
            UPDATE recurring_donations
            SET status = 'active',
                stripe_subscription_id = $2,
                default_payment_method = $3,
                next_bill_date = $4,
                last_pay_date = $5,
                updated_utc = NOW()
            WHERE donation_id = $1
            RETURNING donation_id, signup_id, amount_minor, time_period_type,
                      num_time_periods, imported, status,
                      last_successful_payment_date, merchant_account_id,
                      stripe_subscription_id, default_payment_method,
                      next_bill_date, last_pay_date, created_utc, updated_utc
            "#,
        )
        .bind(donation_id)
        .bind(subscription_id)
        .bind(payment_method)
        .bind(next_bill_date)
        .bind(last_pay_date)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            LinkError::Database(anyhow::anyhow!(
                "Failed to activate donation {}: {}",
                donation_id,
                e
            ))
        })?;

        info!(
            donation_id = %donation.donation_id,
            subscription_id = %subscription_id,
            "Donation activated"
        );

        Ok(donation)
    }
}
