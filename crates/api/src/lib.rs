//! Hostgate API Library
//!
//! Hostname-based tenant resolution, the tenant dashboard, and hostname
//! rebinds with reverse proxy cache invalidation.

pub mod auth;
pub mod config;
pub mod directory;
pub mod error;
pub mod proxy;
pub mod rebind;
pub mod routes;
pub mod routing;
pub mod state;

pub use config::Config;
pub use directory::{InMemoryTenantDirectory, PgTenantDirectory, TenantDirectory};
pub use error::ApiError;
pub use proxy::{HttpProxyInvalidator, InvalidationError, ProxyCacheInvalidator};
pub use rebind::{CacheInvalidation, HostnameRebindCoordinator, RebindOutcome};
pub use routes::create_router;
pub use routing::{HostnameClassifier, RoutingDecision, TenantResolutionRouter};
pub use state::AppState;
