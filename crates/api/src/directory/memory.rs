//! In-memory tenant directory
//!
//! Enforces the same uniqueness rules as the `tenants` table. Used by tests
//! and when the API runs without a database.

use std::collections::HashMap;

use async_trait::async_trait;
use hostgate_shared::{PageContent, TenantError, TenantId, TenantRecord};
use tokio::sync::RwLock;

use super::TenantDirectory;

#[derive(Default)]
pub struct InMemoryTenantDirectory {
    tenants: RwLock<HashMap<TenantId, TenantRecord>>,
}

impl InMemoryTenantDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a directory with existing records
    pub fn with_records(records: impl IntoIterator<Item = TenantRecord>) -> Self {
        let tenants = records.into_iter().map(|r| (r.id.clone(), r)).collect();
        Self {
            tenants: RwLock::new(tenants),
        }
    }

    /// Snapshot of a tenant, bypassing owner scoping
    pub async fn get(&self, tenant_id: &TenantId) -> Option<TenantRecord> {
        self.tenants.read().await.get(tenant_id).cloned()
    }

    pub async fn len(&self) -> usize {
        self.tenants.read().await.len()
    }
}

#[async_trait]
impl TenantDirectory for InMemoryTenantDirectory {
    async fn exists_by_id(&self, tenant_id: &TenantId) -> Result<bool, TenantError> {
        Ok(self.tenants.read().await.contains_key(tenant_id))
    }

    async fn find_by_owner(&self, owner_user_id: &str) -> Result<Option<TenantRecord>, TenantError> {
        Ok(self
            .tenants
            .read()
            .await
            .values()
            .find(|r| r.owner_user_id == owner_user_id)
            .cloned())
    }

    async fn create(&self, tenant_id: &TenantId, owner_user_id: &str) -> Result<(), TenantError> {
        let mut tenants = self.tenants.write().await;
        if tenants.contains_key(tenant_id) {
            return Err(TenantError::Conflict(format!("Tenant id {} already taken", tenant_id)));
        }
        if tenants.values().any(|r| r.owner_user_id == owner_user_id) {
            return Err(TenantError::Conflict("User already has a tenant".to_string()));
        }
        tenants.insert(tenant_id.clone(), TenantRecord::new(tenant_id.clone(), owner_user_id));
        Ok(())
    }

    async fn update_content(
        &self,
        tenant_id: &TenantId,
        owner_user_id: &str,
        title: &str,
        message: &str,
    ) -> Result<(), TenantError> {
        let mut tenants = self.tenants.write().await;
        let record = tenants
            .get_mut(tenant_id)
            .filter(|r| r.owner_user_id == owner_user_id)
            .ok_or_else(|| TenantError::NotFound(format!("Tenant {}", tenant_id)))?;
        record.title = title.to_string();
        record.message = message.to_string();
        Ok(())
    }

    async fn get_public_content(&self, tenant_id: &TenantId) -> Result<Option<PageContent>, TenantError> {
        Ok(self.tenants.read().await.get(tenant_id).map(TenantRecord::page))
    }

    async fn update_hostname(
        &self,
        tenant_id: &TenantId,
        owner_user_id: &str,
        hostname: &str,
    ) -> Result<(), TenantError> {
        let mut tenants = self.tenants.write().await;
        let taken = tenants
            .values()
            .any(|r| &r.id != tenant_id && r.hostname.as_deref() == Some(hostname));
        if taken {
            return Err(TenantError::Conflict(format!(
                "Hostname {} is bound to another tenant",
                hostname
            )));
        }
        let record = tenants
            .get_mut(tenant_id)
            .filter(|r| r.owner_user_id == owner_user_id)
            .ok_or_else(|| TenantError::NotFound(format!("Tenant {}", tenant_id)))?;
        record.hostname = Some(hostname.to_string());
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn id(raw: &str) -> TenantId {
        TenantId::parse(raw).unwrap()
    }

    #[tokio::test]
    async fn test_create_and_lookup() {
        let dir = InMemoryTenantDirectory::new();
        assert!(!dir.exists_by_id(&id("acme")).await.unwrap());

        dir.create(&id("acme"), "user-1").await.unwrap();

        assert!(dir.exists_by_id(&id("acme")).await.unwrap());
        let record = dir.find_by_owner("user-1").await.unwrap().unwrap();
        assert_eq!(record.id, id("acme"));
        assert_eq!(record.hostname, None);
        assert!(dir.find_by_owner("user-2").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_create_conflicts() {
        let dir = InMemoryTenantDirectory::new();
        dir.create(&id("acme"), "user-1").await.unwrap();

        let taken = dir.create(&id("acme"), "user-2").await;
        assert!(matches!(taken, Err(TenantError::Conflict(_))));

        let second = dir.create(&id("other"), "user-1").await;
        assert!(matches!(second, Err(TenantError::Conflict(_))));
        assert_eq!(dir.len().await, 1);
    }

    #[tokio::test]
    async fn test_update_content_is_owner_scoped() {
        let dir = InMemoryTenantDirectory::new();
        dir.create(&id("acme"), "user-1").await.unwrap();

        let wrong_owner = dir.update_content(&id("acme"), "user-2", "t", "m").await;
        assert!(matches!(wrong_owner, Err(TenantError::NotFound(_))));

        dir.update_content(&id("acme"), "user-1", "Title", "Body").await.unwrap();
        let content = dir.get_public_content(&id("acme")).await.unwrap().unwrap();
        assert_eq!(content.title, "Title");
        assert_eq!(content.message, "Body");
    }

    #[tokio::test]
    async fn test_public_content_missing_tenant() {
        let dir = InMemoryTenantDirectory::new();
        assert!(dir.get_public_content(&id("nobody")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_hostname_unique_across_tenants() {
        let dir = InMemoryTenantDirectory::new();
        dir.create(&id("acme"), "user-1").await.unwrap();
        dir.create(&id("beta"), "user-2").await.unwrap();

        dir.update_hostname(&id("acme"), "user-1", "acme.com").await.unwrap();
        // Rebinding to the same hostname is allowed for the holder
        dir.update_hostname(&id("acme"), "user-1", "acme.com").await.unwrap();

        let stolen = dir.update_hostname(&id("beta"), "user-2", "acme.com").await;
        assert!(matches!(stolen, Err(TenantError::Conflict(_))));
        assert_eq!(dir.get(&id("beta")).await.unwrap().hostname, None);
    }

    #[tokio::test]
    async fn test_update_hostname_is_owner_scoped() {
        let dir = InMemoryTenantDirectory::new();
        dir.create(&id("acme"), "user-1").await.unwrap();

        let result = dir.update_hostname(&id("acme"), "user-2", "acme.com").await;
        assert!(matches!(result, Err(TenantError::NotFound(_))));
        assert_eq!(dir.get(&id("acme")).await.unwrap().hostname, None);
    }
}
