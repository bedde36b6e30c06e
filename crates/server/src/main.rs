//! LinkGator server entry point.

use std::sync::Arc;

use axum::{Router, middleware};
use linkgator_api::{AppState, auth_middleware, router as api_router};
use linkgator_common::{Config, FederationMetrics};
use linkgator_federation::{AccountService, ApClient, FederationState, UrlConfig};
use linkgator_plugins::{
    FileSettingsStore, PluginContext, PluginExecutor, PluginRegistry, builtin_catalog,
};
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Waits for a shutdown signal (SIGINT or SIGTERM).
///
/// A handler that cannot be installed never fires.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received SIGINT, initiating graceful shutdown...");
        },
        () = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown...");
        },
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "linkgator=debug,tower_http=debug".into());

    // LINKGATOR_LOG_FORMAT=json for machine-readable output
    let json = std::env::var("LINKGATOR_LOG_FORMAT").is_ok_and(|format| format == "json");
    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    info!("Starting LinkGator server...");

    let config = Config::load()?;
    let urls = UrlConfig::parse(&config.server.url)?;

    // Database is optional; without one only in-memory backends are available
    let db = match linkgator_db::init(&config).await? {
        Some(db) => {
            info!("Connected to database");
            info!("Running database migrations...");
            linkgator_db::migrate(&db).await?;
            info!("Migrations completed");
            Some(Arc::new(db))
        }
        None => {
            warn!("No database configured, the SQL database plugin will not be registered");
            None
        }
    };

    // Plugins
    let settings = Arc::new(FileSettingsStore::new(config.plugins.settings_dir.clone()));
    let mut ctx = PluginContext::new(settings);
    if let Some(db) = db {
        ctx = ctx.with_database(db);
    }

    let registry = Arc::new(PluginRegistry::new());
    let registered = registry.initialize(&builtin_catalog(), &ctx).await;
    info!(count = registered, "Plugins registered");

    // Federation
    let metrics = Arc::new(FederationMetrics::new());
    let executor = PluginExecutor::new(Arc::clone(&registry));
    let client = Arc::new(ApClient::new(&config.server.url)?);
    let federation = FederationState::new(
        executor.clone(),
        urls.clone(),
        config.federation.key_bits,
        client.clone(),
        client,
        Arc::clone(&metrics),
    );

    let accounts = AccountService::new(executor, federation.keys.clone(), urls);
    let state = AppState::new(registry, accounts, metrics);

    let mut app = Router::new().merge(
        Router::new()
            .nest("/api", api_router())
            .layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
            .with_state(state),
    );

    if config.federation.enabled {
        info!(instance = %config.federation.instance_name, "Federation enabled");
        app = app.merge(linkgator_federation::router(federation));
    } else {
        info!("Federation disabled, actor and inbox routes are not mounted");
    }

    let app = app.layer(TraceLayer::new_for_http()).layer(
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any),
    );

    let listener =
        tokio::net::TcpListener::bind((config.server.host.as_str(), config.server.port)).await?;
    info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}
