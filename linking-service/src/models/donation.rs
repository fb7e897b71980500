//! Recurring donation model.

use chrono::{DateTime, Duration, Months, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Donation activation status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DonationStatus {
    Pending,
    Active,
}

impl DonationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DonationStatus::Pending => "pending",
            DonationStatus::Active => "active",
        }
    }

    pub fn from_string(s: &str) -> Self {
        match s {
            "active" => DonationStatus::Active,
            _ => DonationStatus::Pending,
        }
    }
}

/// Billing interval unit in the singular, lowercase form Stripe expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BillingUnit {
    Day,
    Week,
    Month,
    Year,
}

impl BillingUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            BillingUnit::Day => "day",
            BillingUnit::Week => "week",
            BillingUnit::Month => "month",
            BillingUnit::Year => "year",
        }
    }

    /// Normalize a stored time period type (pluralized display form, e.g.
    /// "Months") into a billing unit. Returns `None` for unmapped values.
    pub fn from_period_type(s: &str) -> Option<Self> {
        let normalized = s.trim().to_lowercase();
        let singular = normalized.strip_suffix('s').unwrap_or(&normalized);

        match singular {
            "day" => Some(BillingUnit::Day),
            "week" => Some(BillingUnit::Week),
            "month" => Some(BillingUnit::Month),
            "year" => Some(BillingUnit::Year),
            _ => None,
        }
    }

    /// Advance a date by `count` units using calendar arithmetic.
    ///
    /// Month and year additions clamp to the last valid day of the target
    /// month (one month after Jan 31 is the last day of February), never
    /// spilling into the following month. Returns `None` for a non-positive
    /// count or on overflow.
    pub fn advance(&self, from: DateTime<Utc>, count: i32) -> Option<DateTime<Utc>> {
        let count = u32::try_from(count).ok().filter(|c| *c > 0)?;

        match self {
            BillingUnit::Day => from.checked_add_signed(Duration::days(i64::from(count))),
            BillingUnit::Week => from.checked_add_signed(Duration::weeks(i64::from(count))),
            BillingUnit::Month => from.checked_add_months(Months::new(count)),
            BillingUnit::Year => from.checked_add_months(Months::new(count.checked_mul(12)?)),
        }
    }
}

/// A pledge to pay a fixed amount repeatedly.
///
/// Created by an upstream import; eligible for linking while
/// `imported && status = 'pending'`. Transitions to active exclusively
/// through successful linking, gaining a subscription id, next-bill date,
/// and last-pay date.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RecurringDonation {
    pub donation_id: Uuid,
    pub signup_id: Uuid,
    /// Pledge amount in minor currency units.
    pub amount_minor: i64,
    /// Interval unit in pluralized display form (e.g. "Months").
    pub time_period_type: String,
    /// The pledge recurs every `num_time_periods` units.
    pub num_time_periods: i32,
    pub imported: bool,
    pub status: String,
    pub last_successful_payment_date: Option<DateTime<Utc>>,
    pub merchant_account_id: Uuid,
    pub stripe_subscription_id: Option<String>,
    pub default_payment_method: Option<String>,
    pub next_bill_date: Option<DateTime<Utc>>,
    pub last_pay_date: Option<DateTime<Utc>>,
    pub created_utc: DateTime<Utc>,
    pub updated_utc: DateTime<Utc>,
}

impl RecurringDonation {
    /// Whether this donation can still be linked.
    pub fn is_eligible(&self) -> bool {
        self.imported && DonationStatus::from_string(&self.status) == DonationStatus::Pending
    }
}
