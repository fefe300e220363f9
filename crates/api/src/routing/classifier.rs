//! Hostname classification
//!
//! Decides, from the request hostname and path alone, whether a request is
//! served as-is, rewritten onto a tenant route, or rejected:
//! - Apex: example.com/dashboard -> /dashboard
//! - Subdomain: acme.example.com/blog/1 -> /app/acme/blog/1
//! - Foreign host: shop.acme.com/ -> /app/shop-acme-com/ or rejected, by policy
//!
//! Classification is pure. The public domain and the foreign host policy are
//! fixed when the classifier is built.

use hostgate_shared::TenantId;

/// Path prefix under which tenant pages are served internally
pub const TENANT_ROUTE_PREFIX: &str = "/app/";

/// Outcome of classifying a request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoutingDecision {
    /// Serve the original path
    Unchanged(String),
    /// Serve a tenant-scoped internal path
    Rewrite(String),
    /// Terminal response, no further handlers run
    Rejected(RejectReason),
}

/// Why a request was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    NotFound,
    /// More than one label in front of the public domain; served as the error page
    InvalidSubdomain,
}

impl RejectReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            RejectReason::NotFound => "not-found",
            RejectReason::InvalidSubdomain => "invalid-subdomain",
        }
    }
}

/// What to do with hosts outside the public domain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ForeignHostPolicy {
    /// Always reject
    #[default]
    Reject,
    /// Lowercase the hostname, replace '.' with '-' and serve it as a tenant id
    MapToTenant,
}

impl ForeignHostPolicy {
    /// Policy for the `allow_foreign_hostname_mapping` flag
    pub fn from_flag(allow_foreign_hostname_mapping: bool) -> Self {
        if allow_foreign_hostname_mapping {
            ForeignHostPolicy::MapToTenant
        } else {
            ForeignHostPolicy::Reject
        }
    }
}

/// Classifies requests against a single public domain
#[derive(Debug, Clone)]
pub struct HostnameClassifier {
    public_domain: String,
    /// "." + public_domain
    subdomain_suffix: String,
    foreign_hosts: ForeignHostPolicy,
}

impl HostnameClassifier {
    /// Create a classifier. `public_domain` is expected lowercase, without port.
    pub fn new(public_domain: impl Into<String>, foreign_hosts: ForeignHostPolicy) -> Self {
        let public_domain = public_domain.into();
        Self {
            subdomain_suffix: format!(".{}", public_domain),
            public_domain,
            foreign_hosts,
        }
    }

    /// Classify a request. `hostname` excludes the port; `pathname` is
    /// carried into the result byte-for-byte.
    pub fn classify(&self, hostname: &str, pathname: &str) -> RoutingDecision {
        // Apex: internal tenant routes are not reachable directly
        if hostname == self.public_domain {
            if pathname.starts_with(TENANT_ROUTE_PREFIX) {
                return RoutingDecision::Rejected(RejectReason::NotFound);
            }
            return RoutingDecision::Unchanged(pathname.to_string());
        }

        // strip_suffix only removes a trailing match, so the label is always
        // taken against the last occurrence of the public domain
        let Some(label) = hostname.strip_suffix(&self.subdomain_suffix) else {
            return self.classify_foreign(hostname, pathname);
        };

        if label.is_empty() || label.contains('.') {
            return RoutingDecision::Rejected(RejectReason::InvalidSubdomain);
        }

        // The label becomes part of the internal path, so it must be a valid tenant id
        match TenantId::from_subdomain_label(label) {
            Some(tenant_id) => RoutingDecision::Rewrite(tenant_path(tenant_id.as_str(), pathname)),
            None => RoutingDecision::Rejected(RejectReason::NotFound),
        }
    }

    fn classify_foreign(&self, hostname: &str, pathname: &str) -> RoutingDecision {
        match self.foreign_hosts {
            ForeignHostPolicy::Reject => RoutingDecision::Rejected(RejectReason::NotFound),
            ForeignHostPolicy::MapToTenant => match TenantId::from_foreign_hostname(hostname) {
                Some(tenant_id) => RoutingDecision::Rewrite(tenant_path(tenant_id.as_str(), pathname)),
                None => RoutingDecision::Rejected(RejectReason::NotFound),
            },
        }
    }
}

fn tenant_path(tenant_id: &str, pathname: &str) -> String {
    format!("{}{}{}", TENANT_ROUTE_PREFIX, tenant_id, pathname)
}
