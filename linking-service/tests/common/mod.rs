//! Test helper module for linking-service integration tests.
//!
//! Provides in-memory collaborator fakes and donation builders.

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use linker_core::error::LinkError;
use linker_core::tenant::{with_tenant, TenantContext};
use linking_service::models::{MerchantAccount, RecurringDonation, Signup, SubscriptionRequest};
use linking_service::services::{PlanResolver, SignupStore, StripeSubscription, SubscriptionGateway};
use std::collections::VecDeque;
use std::future::Future;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;
use uuid::Uuid;

pub const TEST_SLUG: &str = "coolslug";
pub const TEST_CUSTOMER_ID: &str = "cus_123";
pub const TEST_PAYMENT_METHOD: &str = "pm_456";

pub fn test_tenant() -> TenantContext {
    TenantContext::new(TEST_SLUG, "test")
}

/// Run a future within the standard test tenant scope.
pub async fn with_test_tenant<F>(fut: F) -> F::Output
where
    F: Future,
{
    with_tenant(test_tenant(), fut).await
}

pub fn utc(y: i32, m: u32, d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
}

pub fn signup() -> Signup {
    Signup {
        signup_id: Uuid::new_v4(),
        external_id: "ext-42".to_string(),
        email: Some("donor@example.org".to_string()),
        created_utc: utc(2025, 6, 1),
        updated_utc: utc(2025, 6, 1),
    }
}

pub fn merchant_account() -> MerchantAccount {
    MerchantAccount {
        merchant_account_id: Uuid::new_v4(),
        name: "Main merchant".to_string(),
        stripe_secret_key: "sk_test_abc".to_string(),
        test_mode: true,
        connected_account_id: "acct_789".to_string(),
        created_utc: utc(2025, 6, 1),
    }
}

/// A linkable donation: imported, pending, monthly, with a payment history.
/// `sequence` staggers `created_utc` so batch ordering is deterministic.
pub fn donation(signup_id: Uuid, merchant_account_id: Uuid, sequence: i64) -> RecurringDonation {
    RecurringDonation {
        donation_id: Uuid::new_v4(),
        signup_id,
        amount_minor: 2500,
        time_period_type: "Months".to_string(),
        num_time_periods: 1,
        imported: true,
        status: "pending".to_string(),
        last_successful_payment_date: Some(utc(2026, 1, 15)),
        merchant_account_id,
        stripe_subscription_id: None,
        default_payment_method: None,
        next_bill_date: None,
        last_pay_date: None,
        created_utc: utc(2025, 6, 1) + Duration::minutes(sequence),
        updated_utc: utc(2025, 6, 1) + Duration::minutes(sequence),
    }
}

/// In-memory `SignupStore`.
pub struct InMemoryStore {
    pub signups: Vec<Signup>,
    pub accounts: Vec<MerchantAccount>,
    pub donations: Mutex<Vec<RecurringDonation>>,
}

impl InMemoryStore {
    pub fn new(
        signups: Vec<Signup>,
        accounts: Vec<MerchantAccount>,
        donations: Vec<RecurringDonation>,
    ) -> Self {
        Self {
            signups,
            accounts,
            donations: Mutex::new(donations),
        }
    }

    pub fn donation(&self, donation_id: Uuid) -> RecurringDonation {
        self.donations
            .lock()
            .unwrap()
            .iter()
            .find(|d| d.donation_id == donation_id)
            .cloned()
            .expect("donation not found in store")
    }
}

#[async_trait]
impl SignupStore for InMemoryStore {
    async fn find_signup(&self, external_id: &str) -> Result<Option<Signup>, LinkError> {
        Ok(self
            .signups
            .iter()
            .find(|s| s.external_id == external_id)
            .cloned())
    }

    async fn eligible_donations(
        &self,
        signup_id: Uuid,
    ) -> Result<Vec<RecurringDonation>, LinkError> {
        let mut donations: Vec<RecurringDonation> = self
            .donations
            .lock()
            .unwrap()
            .iter()
            .filter(|d| d.signup_id == signup_id && d.is_eligible())
            .cloned()
            .collect();
        donations.sort_by_key(|d| (d.created_utc, d.donation_id));
        Ok(donations)
    }

    async fn merchant_account(&self, account_id: Uuid) -> Result<MerchantAccount, LinkError> {
        self.accounts
            .iter()
            .find(|a| a.merchant_account_id == account_id)
            .cloned()
            .ok_or_else(|| {
                LinkError::Database(anyhow::anyhow!("merchant account {} not found", account_id))
            })
    }

    async fn activate_donation(
        &self,
        donation_id: Uuid,
        subscription_id: &str,
        payment_method: Option<&str>,
        next_bill_date: DateTime<Utc>,
        last_pay_date: DateTime<Utc>,
    ) -> Result<RecurringDonation, LinkError> {
        let mut donations = self.donations.lock().unwrap();
        let donation = donations
            .iter_mut()
            .find(|d| d.donation_id == donation_id)
            .ok_or_else(|| {
                LinkError::Database(anyhow::anyhow!("donation {} not found", donation_id))
            })?;

        donation.status = "active".to_string();
        donation.stripe_subscription_id = Some(subscription_id.to_string());
        donation.default_payment_method = payment_method.map(str::to_string);
        donation.next_bill_date = Some(next_bill_date);
        donation.last_pay_date = Some(last_pay_date);
        donation.updated_utc = Utc::now();

        Ok(donation.clone())
    }
}

/// Scripted plan resolver.
pub struct FakePlanResolver {
    pub plan_id: String,
    pub fail: bool,
    pub calls: AtomicU32,
}

impl FakePlanResolver {
    pub fn returning(plan_id: &str) -> Self {
        Self {
            plan_id: plan_id.to_string(),
            fail: false,
            calls: AtomicU32::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            plan_id: String::new(),
            fail: true,
            calls: AtomicU32::new(0),
        }
    }

    pub fn call_count(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PlanResolver for FakePlanResolver {
    async fn resolve(
        &self,
        _config: &linking_service::models::StripeConfig,
        _unit: linking_service::models::BillingUnit,
        _interval_count: i32,
    ) -> anyhow::Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            anyhow::bail!("plan lookup exploded");
        }
        Ok(self.plan_id.clone())
    }
}

/// One scripted gateway outcome.
pub enum GatewayOutcome {
    /// Processor returned a subscription with this id.
    Created(&'static str),
    /// Wrapper suppressed the underlying failure (test-mode policy).
    Suppressed,
    /// Unsuppressed processor failure.
    Error,
}

/// Scripted `SubscriptionGateway` that records every request it receives.
/// When the script runs out it keeps answering `Created("sub_123")`.
pub struct FakeGateway {
    pub script: Mutex<VecDeque<GatewayOutcome>>,
    pub requests: Mutex<Vec<SubscriptionRequest>>,
}

impl FakeGateway {
    pub fn succeeding() -> Self {
        Self::with_script(vec![])
    }

    pub fn with_script(script: Vec<GatewayOutcome>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<SubscriptionRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl SubscriptionGateway for FakeGateway {
    async fn create_subscription(
        &self,
        _config: &linking_service::models::StripeConfig,
        request: &SubscriptionRequest,
    ) -> Result<Option<StripeSubscription>, LinkError> {
        self.requests.lock().unwrap().push(request.clone());

        let outcome = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(GatewayOutcome::Created("sub_123"));

        match outcome {
            GatewayOutcome::Created(id) => Ok(Some(StripeSubscription {
                id: id.to_string(),
                status: Some("active".to_string()),
            })),
            GatewayOutcome::Suppressed => Ok(None),
            GatewayOutcome::Error => Err(LinkError::Processor(anyhow::anyhow!(
                "processor unavailable"
            ))),
        }
    }
}
