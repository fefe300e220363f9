//! Hostname rebind coordination
//!
//! Moving a tenant to a new custom hostname touches two independently owned
//! systems: the edge proxy's hostname cache and the tenant directory. They are
//! not jointly transactional, so a rebind is a two-step saga:
//!
//! 1. Evict the OLD hostname from the proxy cache (best effort).
//! 2. Persist the NEW hostname in the directory (authoritative).
//!
//! If step 1 fails the rebind still proceeds. The proxy may keep serving the
//! old binding until its cache entry expires; that period is the accepted
//! inconsistency window and is reported in [`CacheInvalidation`]. A failure in
//! step 2 is the result of the whole operation.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use hostgate_shared::{HostnameRebindRequest, TenantError, TenantId};
use serde::Serialize;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use tracing::{info, warn};

use crate::directory::TenantDirectory;
use crate::proxy::ProxyCacheInvalidator;

/// What happened to the previous hostname's proxy cache entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CacheInvalidation {
    /// The tenant had no hostname bound
    NotRequired,
    Invalidated { hostname: String },
    /// No proxy API is configured
    NotConfigured { hostname: String },
    /// Invalidation failed; the proxy may serve the old binding until its entry expires
    AcceptedInconsistencyWindow { hostname: String, reason: String },
}

/// Result of a successful rebind
#[derive(Debug, Clone, Serialize)]
pub struct RebindOutcome {
    pub tenant_id: TenantId,
    pub previous_hostname: Option<String>,
    pub hostname: String,
    pub cache_invalidation: CacheInvalidation,
}

impl RebindOutcome {
    /// False while the proxy may still route the old hostname to this tenant
    pub fn is_consistent(&self) -> bool {
        !matches!(
            self.cache_invalidation,
            CacheInvalidation::AcceptedInconsistencyWindow { .. } | CacheInvalidation::NotConfigured { .. }
        )
    }
}

/// Orchestrates hostname changes across the proxy cache and the directory
pub struct HostnameRebindCoordinator {
    directory: Arc<dyn TenantDirectory>,
    invalidator: Option<Arc<dyn ProxyCacheInvalidator>>,
    /// Hosts this service already routes by subdomain
    public_domain: Option<String>,
    locks: RebindLocks,
}

impl HostnameRebindCoordinator {
    pub fn new(
        directory: Arc<dyn TenantDirectory>,
        invalidator: Option<Arc<dyn ProxyCacheInvalidator>>,
    ) -> Self {
        Self {
            directory,
            invalidator,
            public_domain: None,
            locks: RebindLocks::default(),
        }
    }

    /// Refuse custom hostnames equal to, or under, `public_domain`
    pub fn with_public_domain(mut self, public_domain: impl Into<String>) -> Self {
        self.public_domain = Some(public_domain.into());
        self
    }

    fn check_not_public(&self, hostname: &str) -> Result<(), TenantError> {
        let Some(domain) = self.public_domain.as_deref() else {
            return Ok(());
        };
        let under_domain = hostname
            .strip_suffix(domain)
            .is_some_and(|rest| rest.is_empty() || rest.ends_with('.'));
        if under_domain {
            return Err(TenantError::Validation(format!(
                "Hostname must not be {} or one of its subdomains",
                domain
            )));
        }
        Ok(())
    }

    /// Rebind the caller's tenant to `request.new_hostname`.
    ///
    /// Rebinds by the same owner are serialized, so each one invalidates the
    /// hostname the previous one persisted.
    pub async fn rebind(&self, request: HostnameRebindRequest) -> Result<RebindOutcome, TenantError> {
        let hostname = validate_hostname(&request.new_hostname)?;
        self.check_not_public(&hostname)?;
        let owner = request.owner_user_id.as_str();

        let _guard = self.locks.acquire(owner).await;

        let record = self
            .directory
            .find_by_owner(owner)
            .await?
            .ok_or_else(|| TenantError::NotFound("User has no tenant".to_string()))?;

        if let Some(expected) = &request.tenant_id {
            if expected != &record.id {
                return Err(TenantError::NotFound(format!("Tenant {}", expected)));
            }
        }

        let cache_invalidation = match record.hostname.as_deref() {
            Some(previous) => self.invalidate_previous(previous).await,
            None => CacheInvalidation::NotRequired,
        };

        self.directory
            .update_hostname(&record.id, owner, &hostname)
            .await?;

        info!(
            tenant_id = %record.id,
            previous = ?record.hostname,
            hostname = %hostname,
            "Tenant hostname rebound"
        );

        Ok(RebindOutcome {
            tenant_id: record.id,
            previous_hostname: record.hostname,
            hostname,
            cache_invalidation,
        })
    }

    async fn invalidate_previous(&self, previous: &str) -> CacheInvalidation {
        let Some(invalidator) = &self.invalidator else {
            warn!(hostname = %previous, "Proxy API not configured, old hostname not invalidated");
            return CacheInvalidation::NotConfigured {
                hostname: previous.to_string(),
            };
        };

        match invalidator.invalidate(previous).await {
            Ok(()) => CacheInvalidation::Invalidated {
                hostname: previous.to_string(),
            },
            Err(e) => {
                let err = TenantError::from(e);
                warn!(
                    hostname = %previous,
                    error = %err,
                    "Proxy cache invalidation failed, continuing with rebind"
                );
                CacheInvalidation::AcceptedInconsistencyWindow {
                    hostname: previous.to_string(),
                    reason: err.to_string(),
                }
            }
        }
    }
}

/// Validate and normalize a hostname submitted for rebind
pub fn validate_hostname(raw: &str) -> Result<String, TenantError> {
    let hostname = raw.trim().to_lowercase();
    if hostname.is_empty() {
        return Err(TenantError::Validation("Hostname required".to_string()));
    }

    if hostname.starts_with("https://") || hostname.starts_with("http://") {
        return Err(TenantError::Validation(
            "Hostname must not contain protocol (http:// or https://)".to_string(),
        ));
    }

    if !is_valid_hostname(&hostname) {
        return Err(TenantError::Validation(
            "Invalid hostname format. Please enter a hostname like 'blog.yourcompany.com'".to_string(),
        ));
    }

    Ok(hostname)
}

fn is_valid_hostname(hostname: &str) -> bool {
    if hostname.len() > 253 {
        return false;
    }

    let labels: Vec<&str> = hostname.split('.').collect();
    if labels.len() < 2 {
        return false;
    }

    labels.iter().all(|label| {
        !label.is_empty()
            && label.len() <= 63
            && !label.starts_with('-')
            && !label.ends_with('-')
            && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
    })
}

/// Per-owner async locks; entries are dropped once nobody holds or awaits them
#[derive(Default)]
struct RebindLocks {
    inner: Mutex<HashMap<String, Arc<AsyncMutex<()>>>>,
}

impl RebindLocks {
    async fn acquire(&self, key: &str) -> RebindGuard<'_> {
        let lock = {
            let mut locks = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
            Arc::clone(locks.entry(key.to_string()).or_default())
        };

        RebindGuard {
            locks: self,
            key: key.to_string(),
            guard: Some(lock.lock_owned().await),
        }
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

struct RebindGuard<'a> {
    locks: &'a RebindLocks,
    key: String,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for RebindGuard<'_> {
    fn drop(&mut self) {
        // Release first so the map holds the only reference when idle
        self.guard.take();
        let mut locks = self.locks.inner.lock().unwrap_or_else(PoisonError::into_inner);
        if locks.get(&self.key).is_some_and(|l| Arc::strong_count(l) == 1) {
            locks.remove(&self.key);
        }
    }
}
