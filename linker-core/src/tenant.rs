//! Tenant scope for batch execution.
//!
//! A batch run operates on behalf of exactly one tenant. The scope is
//! established once by the entry point and is read-only for the duration of
//! the batch; code deep in the linking path reads it through
//! [`TenantContext::current`] without threading it through every signature.

use anyhow::{anyhow, Result};

tokio::task_local! {
    static TENANT: TenantContext;
}

/// Tenant context active for the current batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TenantContext {
    /// Tenant identifier (slug) the batch applies to.
    pub slug: String,
    /// Execution environment name (e.g. "development", "production").
    pub environment: String,
}

impl TenantContext {
    /// Create a new tenant context.
    pub fn new(slug: impl Into<String>, environment: impl Into<String>) -> Self {
        Self {
            slug: slug.into(),
            environment: environment.into(),
        }
    }

    /// Return the tenant context active for the current task.
    ///
    /// Fails when called outside a [`with_tenant`] scope.
    pub fn current() -> Result<Self> {
        TENANT
            .try_with(|tenant| tenant.clone())
            .map_err(|_| anyhow!("no tenant scope is active"))
    }
}

/// Run a future within the given tenant scope.
pub async fn with_tenant<F>(tenant: TenantContext, fut: F) -> F::Output
where
    F: std::future::Future,
{
    TENANT.scope(tenant, fut).await
}
