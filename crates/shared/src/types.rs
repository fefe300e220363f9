//! Tenant domain types

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::TenantError;

/// Title given to a freshly created tenant page
pub const DEFAULT_PAGE_TITLE: &str = "Hello world";

/// Message given to a freshly created tenant page
pub const DEFAULT_PAGE_MESSAGE: &str = "lorem ipsum";

/// Tenant ids that cannot be claimed because they collide with platform routes
pub const RESERVED_TENANT_IDS: &[&str] = &[
    "app",
    "api",
    "www",
    "admin",
    "dashboard",
    "error",
    "not-found",
    "health",
    "static",
    "assets",
];

/// Unique tenant identifier, always `[a-z0-9-]+`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TenantId(String);

impl TenantId {
    /// Parse a user-chosen slug. Input is lowercased before validation.
    pub fn parse(raw: &str) -> Result<Self, TenantError> {
        let id = raw.trim().to_lowercase();
        if id.is_empty() {
            return Err(TenantError::Validation("Tenant id required".to_string()));
        }
        if !is_valid_tenant_id(&id) {
            return Err(TenantError::Validation(format!(
                "Tenant id '{}' may only contain a-z, 0-9 and '-'",
                id
            )));
        }
        Ok(Self(id))
    }

    /// Derive a synthetic id from a hostname outside the public domain,
    /// e.g. `Shop.Acme.com` -> `shop-acme-com`.
    ///
    /// Returns `None` when the hostname contains characters that cannot
    /// appear in a tenant id.
    pub fn from_foreign_hostname(hostname: &str) -> Option<Self> {
        let id = hostname.to_lowercase().replace('.', "-");
        is_valid_tenant_id(&id).then_some(Self(id))
    }

    /// Tenant id named by a subdomain label, `None` unless the label is
    /// exactly `[a-z0-9-]+` after lowercasing
    pub fn from_subdomain_label(label: &str) -> Option<Self> {
        let id = label.to_lowercase();
        is_valid_tenant_id(&id).then_some(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_reserved(&self) -> bool {
        RESERVED_TENANT_IDS.contains(&self.0.as_str())
    }
}

fn is_valid_tenant_id(id: &str) -> bool {
    !id.is_empty()
        && id
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-')
}

impl fmt::Display for TenantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for TenantId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for TenantId {
    type Err = TenantError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for TenantId {
    type Error = TenantError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<TenantId> for String {
    fn from(id: TenantId) -> Self {
        id.0
    }
}

/// A tenant's row in the directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenantRecord {
    pub id: TenantId,
    /// Custom hostname binding, unique across tenants when present
    pub hostname: Option<String>,
    pub owner_user_id: String,
    pub title: String,
    pub message: String,
}

impl TenantRecord {
    /// A new record with the default page content and no hostname
    pub fn new(id: TenantId, owner_user_id: impl Into<String>) -> Self {
        Self {
            id,
            hostname: None,
            owner_user_id: owner_user_id.into(),
            title: DEFAULT_PAGE_TITLE.to_string(),
            message: DEFAULT_PAGE_MESSAGE.to_string(),
        }
    }

    pub fn page(&self) -> PageContent {
        PageContent {
            title: self.title.clone(),
            message: self.message.clone(),
        }
    }
}

/// Publicly visible content of a tenant page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageContent {
    pub title: String,
    pub message: String,
}

/// Request to move a tenant onto a new custom hostname
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostnameRebindRequest {
    /// When present, must name the tenant owned by `owner_user_id`
    #[serde(default)]
    pub tenant_id: Option<TenantId>,
    /// Authenticated out-of-band
    pub owner_user_id: String,
    /// Bare hostname, without a URL scheme
    pub new_hostname: String,
}
