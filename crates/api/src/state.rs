//! Shared application state

use std::sync::Arc;

use crate::{
    config::Config,
    directory::TenantDirectory,
    proxy::ProxyCacheInvalidator,
    rebind::HostnameRebindCoordinator,
    routing::{ForeignHostPolicy, HostnameClassifier, TenantResolutionRouter},
};

/// State handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub directory: Arc<dyn TenantDirectory>,
    pub rebind: Arc<HostnameRebindCoordinator>,
    pub resolution: Arc<TenantResolutionRouter>,
}

impl AppState {
    pub fn new(
        config: Config,
        directory: Arc<dyn TenantDirectory>,
        invalidator: Option<Arc<dyn ProxyCacheInvalidator>>,
    ) -> Self {
        let classifier = HostnameClassifier::new(
            config.public_domain.clone(),
            ForeignHostPolicy::from_flag(config.allow_foreign_hostname_mapping),
        );

        let rebind = HostnameRebindCoordinator::new(Arc::clone(&directory), invalidator)
            .with_public_domain(config.public_domain.clone());

        Self {
            config: Arc::new(config),
            rebind: Arc::new(rebind),
            directory,
            resolution: Arc::new(TenantResolutionRouter::new(classifier)),
        }
    }
}
