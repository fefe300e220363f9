//! Hostgate API server

use std::sync::Arc;

use hostgate_api::{
    config::LogFormat, create_router, AppState, Config, HttpProxyInvalidator, InMemoryTenantDirectory,
    PgTenantDirectory, ProxyCacheInvalidator, TenantDirectory,
};
use tokio::net::TcpListener;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = Config::from_env()?;
    init_tracing(config.log_format);

    let directory: Arc<dyn TenantDirectory> = match &config.database_url {
        Some(url) => {
            let pool = hostgate_shared::create_pool(url, config.database_max_connections).await?;
            hostgate_shared::run_migrations(&pool).await?;
            info!("Connected to PostgreSQL");
            Arc::new(PgTenantDirectory::new(pool))
        }
        None => {
            warn!("DATABASE_URL not set - tenants are kept in memory and lost on restart");
            Arc::new(InMemoryTenantDirectory::new())
        }
    };

    let invalidator = HttpProxyInvalidator::from_config(
        config.proxy_api_url.as_deref(),
        config.proxy_auth_token.as_deref(),
        config.proxy_request_timeout(),
    )?
    .map(|client| Arc::new(client) as Arc<dyn ProxyCacheInvalidator>);

    let bind_address = config.bind_address.clone();
    info!(
        public_domain = %config.public_domain,
        foreign_hostname_mapping = config.allow_foreign_hostname_mapping,
        "Tenant routing configured"
    );

    let app = create_router(AppState::new(config, directory, invalidator));

    let listener = TcpListener::bind(&bind_address).await?;
    info!("Listening on {}", bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("hostgate_api=info,tower_http=info"));

    match format {
        LogFormat::Json => tracing_subscriber::fmt().with_env_filter(filter).json().init(),
        LogFormat::Pretty => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
