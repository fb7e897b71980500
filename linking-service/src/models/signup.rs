//! Signup model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A donor signup, created by an upstream import process.
///
/// Read-only in this subsystem; looked up by its externally visible id.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Signup {
    pub signup_id: Uuid,
    pub external_id: String,
    pub email: Option<String>,
    pub created_utc: DateTime<Utc>,
    pub updated_utc: DateTime<Utc>,
}
