//! Tenant directory
//!
//! The tenant store as seen by the rest of the API. Every operation returns a
//! structured [`TenantError`] instead of panicking or leaking driver errors.

mod memory;
mod postgres;

pub use memory::InMemoryTenantDirectory;
pub use postgres::PgTenantDirectory;

use async_trait::async_trait;
use hostgate_shared::{PageContent, TenantError, TenantId, TenantRecord};

/// Tenant store keyed by [`TenantId`], with unique indexes on owner and hostname
#[async_trait]
pub trait TenantDirectory: Send + Sync {
    async fn exists_by_id(&self, tenant_id: &TenantId) -> Result<bool, TenantError>;

    async fn find_by_owner(&self, owner_user_id: &str) -> Result<Option<TenantRecord>, TenantError>;

    /// Fails with `Conflict` when the id is taken or the owner already has a tenant
    async fn create(&self, tenant_id: &TenantId, owner_user_id: &str) -> Result<(), TenantError>;

    /// Scoped by id and owner; `NotFound` when the pair matches no tenant
    async fn update_content(
        &self,
        tenant_id: &TenantId,
        owner_user_id: &str,
        title: &str,
        message: &str,
    ) -> Result<(), TenantError>;

    async fn get_public_content(&self, tenant_id: &TenantId) -> Result<Option<PageContent>, TenantError>;

    /// Scoped by id and owner; `Conflict` when another tenant holds the hostname
    async fn update_hostname(
        &self,
        tenant_id: &TenantId,
        owner_user_id: &str,
        hostname: &str,
    ) -> Result<(), TenantError>;

    /// Readiness probe
    async fn health_check(&self) -> Result<(), TenantError> {
        Ok(())
    }
}
