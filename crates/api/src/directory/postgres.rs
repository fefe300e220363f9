//! PostgreSQL-backed tenant directory

use async_trait::async_trait;
use hostgate_shared::{PageContent, TenantError, TenantId, TenantRecord};
use sqlx::PgPool;

use super::TenantDirectory;

#[derive(Clone)]
pub struct PgTenantDirectory {
    pool: PgPool,
}

#[derive(sqlx::FromRow)]
struct TenantRow {
    id: String,
    hostname: Option<String>,
    user_id: String,
    title: String,
    message: String,
}

impl TryFrom<TenantRow> for TenantRecord {
    type Error = TenantError;

    fn try_from(row: TenantRow) -> Result<Self, Self::Error> {
        let id = TenantId::parse(&row.id)
            .map_err(|_| TenantError::Store(format!("Stored tenant id '{}' is malformed", row.id)))?;
        Ok(TenantRecord {
            id,
            hostname: row.hostname,
            owner_user_id: row.user_id,
            title: row.title,
            message: row.message,
        })
    }
}

#[derive(sqlx::FromRow)]
struct ContentRow {
    title: String,
    message: String,
}

impl PgTenantDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Convert a driver error, logging anything that is not a plain conflict
fn db_error(operation: &'static str) -> impl FnOnce(sqlx::Error) -> TenantError {
    move |err| {
        let err = TenantError::from(err);
        if !matches!(err, TenantError::Conflict(_)) {
            tracing::error!(operation, error = %err, "Tenant directory error");
        }
        err
    }
}

#[async_trait]
impl TenantDirectory for PgTenantDirectory {
    async fn exists_by_id(&self, tenant_id: &TenantId) -> Result<bool, TenantError> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM tenants WHERE id = $1)")
            .bind(tenant_id.as_str())
            .fetch_one(&self.pool)
            .await
            .map_err(db_error("exists_by_id"))
    }

    async fn find_by_owner(&self, owner_user_id: &str) -> Result<Option<TenantRecord>, TenantError> {
        let row: Option<TenantRow> = sqlx::query_as(
            "SELECT id, hostname, user_id, title, message FROM tenants WHERE user_id = $1",
        )
        .bind(owner_user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("find_by_owner"))?;

        row.map(TenantRecord::try_from).transpose()
    }

    async fn create(&self, tenant_id: &TenantId, owner_user_id: &str) -> Result<(), TenantError> {
        sqlx::query("INSERT INTO tenants (id, user_id) VALUES ($1, $2)")
            .bind(tenant_id.as_str())
            .bind(owner_user_id)
            .execute(&self.pool)
            .await
            .map_err(db_error("create"))?;
        Ok(())
    }

    async fn update_content(
        &self,
        tenant_id: &TenantId,
        owner_user_id: &str,
        title: &str,
        message: &str,
    ) -> Result<(), TenantError> {
        let result = sqlx::query(
            "UPDATE tenants SET title = $3, message = $4 WHERE id = $1 AND user_id = $2",
        )
        .bind(tenant_id.as_str())
        .bind(owner_user_id)
        .bind(title)
        .bind(message)
        .execute(&self.pool)
        .await
        .map_err(db_error("update_content"))?;

        if result.rows_affected() == 0 {
            return Err(TenantError::NotFound(format!("Tenant {}", tenant_id)));
        }
        Ok(())
    }

    async fn get_public_content(&self, tenant_id: &TenantId) -> Result<Option<PageContent>, TenantError> {
        let row: Option<ContentRow> =
            sqlx::query_as("SELECT title, message FROM tenants WHERE id = $1")
                .bind(tenant_id.as_str())
                .fetch_optional(&self.pool)
                .await
                .map_err(db_error("get_public_content"))?;

        Ok(row.map(|row| PageContent {
            title: row.title,
            message: row.message,
        }))
    }

    async fn update_hostname(
        &self,
        tenant_id: &TenantId,
        owner_user_id: &str,
        hostname: &str,
    ) -> Result<(), TenantError> {
        let result =
            sqlx::query("UPDATE tenants SET hostname = $3 WHERE id = $1 AND user_id = $2")
                .bind(tenant_id.as_str())
                .bind(owner_user_id)
                .bind(hostname)
                .execute(&self.pool)
                .await
                .map_err(db_error("update_hostname"))?;

        if result.rows_affected() == 0 {
            return Err(TenantError::NotFound(format!("Tenant {}", tenant_id)));
        }
        Ok(())
    }

    async fn health_check(&self) -> Result<(), TenantError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(db_error("health_check"))?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::time::{SystemTime, UNIX_EPOCH};

    async fn directory() -> PgTenantDirectory {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
        let pool = hostgate_shared::create_pool(&url, 2).await.expect("Failed to create pool");
        hostgate_shared::run_migrations(&pool).await.expect("Failed to run migrations");
        PgTenantDirectory::new(pool)
    }

    /// Names unique to one test run, so tests can share a database
    fn unique(prefix: &str) -> String {
        let nanos = SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_nanos();
        format!("{}-{}-{}", prefix, std::process::id(), nanos)
    }

    async fn cleanup(dir: &PgTenantDirectory, ids: &[&TenantId]) {
        for id in ids {
            sqlx::query("DELETE FROM tenants WHERE id = $1")
                .bind(id.as_str())
                .execute(&dir.pool)
                .await
                .unwrap();
        }
    }

    #[tokio::test]
    #[ignore] // Requires database
    async fn test_create_conflicts_on_id_and_owner() {
        let dir = directory().await;
        let id = TenantId::parse(&unique("acme")).unwrap();
        let owner = unique("user");

        dir.create(&id, &owner).await.unwrap();
        assert!(dir.exists_by_id(&id).await.unwrap());

        let record = dir.find_by_owner(&owner).await.unwrap().unwrap();
        assert_eq!(record.id, id);
        assert_eq!(record.hostname, None);
        assert_eq!(record.title, hostgate_shared::DEFAULT_PAGE_TITLE);

        // Same id, different owner
        let taken = dir.create(&id, &unique("user")).await;
        assert!(matches!(taken, Err(TenantError::Conflict(_))));

        // Same owner, different id
        let other = TenantId::parse(&unique("other")).unwrap();
        let second = dir.create(&other, &owner).await;
        assert!(matches!(second, Err(TenantError::Conflict(_))));
        assert!(!dir.exists_by_id(&other).await.unwrap());

        cleanup(&dir, &[&id]).await;
    }

    #[tokio::test]
    #[ignore] // Requires database
    async fn test_updates_are_owner_scoped() {
        let dir = directory().await;
        let id = TenantId::parse(&unique("scoped")).unwrap();
        let owner = unique("user");
        dir.create(&id, &owner).await.unwrap();

        dir.update_content(&id, &owner, "Welcome", "Hi there").await.unwrap();
        let content = dir.get_public_content(&id).await.unwrap().unwrap();
        assert_eq!(content.title, "Welcome");
        assert_eq!(content.message, "Hi there");

        let stranger = unique("stranger");
        let result = dir.update_content(&id, &stranger, "Hijacked", "x").await;
        assert!(matches!(result, Err(TenantError::NotFound(_))));
        let result = dir.update_hostname(&id, &stranger, "hijack.io").await;
        assert!(matches!(result, Err(TenantError::NotFound(_))));

        let content = dir.get_public_content(&id).await.unwrap().unwrap();
        assert_eq!(content.title, "Welcome");

        let missing = TenantId::parse(&unique("missing")).unwrap();
        assert!(dir.get_public_content(&missing).await.unwrap().is_none());

        cleanup(&dir, &[&id]).await;
    }

    #[tokio::test]
    #[ignore] // Requires database
    async fn test_hostname_is_unique() {
        let dir = directory().await;
        let first = TenantId::parse(&unique("first")).unwrap();
        let second = TenantId::parse(&unique("second")).unwrap();
        let first_owner = unique("user");
        let second_owner = unique("user");
        dir.create(&first, &first_owner).await.unwrap();
        dir.create(&second, &second_owner).await.unwrap();

        let hostname = format!("{}.io", unique("shop"));
        dir.update_hostname(&first, &first_owner, &hostname).await.unwrap();

        let stolen = dir.update_hostname(&second, &second_owner, &hostname).await;
        assert!(matches!(stolen, Err(TenantError::Conflict(_))));

        let record = dir.find_by_owner(&first_owner).await.unwrap().unwrap();
        assert_eq!(record.hostname.as_deref(), Some(hostname.as_str()));

        cleanup(&dir, &[&first, &second]).await;
    }

    #[tokio::test]
    #[ignore] // Requires database
    async fn test_health_check() {
        directory().await.health_check().await.unwrap();
    }
}
