//! Host-based tenant routing
//!
//! Maps the Host header of each inbound request onto tenant routes:
//! - Apex: example.com -> served unchanged
//! - Tenant subdomains: acme.example.com -> /app/acme
//! - Foreign hosts: shop.acme.com -> rejected, or /app/shop-acme-com when mapping is enabled

mod classifier;
mod resolution;

pub use classifier::{
    ForeignHostPolicy, HostnameClassifier, RejectReason, RoutingDecision, TENANT_ROUTE_PREFIX,
};
pub use resolution::{normalize_host, resolve_tenant, Dispatch, TenantResolutionRouter};
