use std::sync::Arc;
use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use sso_service::config::Config;
use sso_service::config::LogFormat;
use sso_service::identity::ports::AppRepository;
use sso_service::identity::ports::UserRepository;
use sso_service::identity::service::AuthService;
use sso_service::inbound::grpc::AuthGrpcService;
use sso_service::inbound::http::create_router;
use sso_service::proto::auth_server::AuthServer;
use sso_service::repositories::DirectoryAdmin;
use sso_service::repositories::InMemoryCredentialStore;
use sso_service::repositories::PostgresCredentialStore;
use tokio::sync::watch;
use tonic::transport::Server;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let config = Config::load()?;

    init_tracing(config.logging.format);

    tracing::info!(
        service = "sso-service",
        version = env!("CARGO_PKG_VERSION"),
        "Service starting"
    );

    tracing::info!(
        http_port = config.server.http_port,
        grpc_port = config.server.grpc_port,
        token_ttl_secs = config.token.ttl_secs,
        apps = config.apps.len(),
        persistent = config.database.is_some(),
        "Configuration loaded"
    );

    match &config.database {
        Some(database) => {
            let pg_pool = PgPoolOptions::new()
                .max_connections(database.max_connections)
                .connect(&database.url)
                .await?;
            tracing::info!(
                max_connections = database.max_connections,
                database = "postgresql",
                "Database connection pool created"
            );

            sqlx::migrate!("./migrations").run(&pg_pool).await?;
            tracing::info!(database = "postgresql", "Database migrations completed");

            run(&config, Arc::new(PostgresCredentialStore::new(pg_pool))).await
        }
        None => {
            tracing::warn!("No database configured, users are kept in process memory");
            run(&config, Arc::new(InMemoryCredentialStore::new())).await
        }
    }
}

fn init_tracing(format: LogFormat) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "sso_service=debug,auth=info,tower_http=debug".into());

    let (pretty, json) = match format {
        LogFormat::Pretty => (Some(tracing_subscriber::fmt::layer()), None),
        LogFormat::Json => (None, Some(tracing_subscriber::fmt::layer().json())),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(pretty)
        .with(json)
        .init();
}

async fn run<S>(config: &Config, store: Arc<S>) -> Result<(), anyhow::Error>
where
    S: UserRepository + AppRepository + DirectoryAdmin,
{
    for app in &config.apps {
        store.provision_app(&app.to_app()).await?;
        tracing::info!(app_id = app.id, app_name = %app.name, "App provisioned");
    }

    let auth_service = Arc::new(AuthService::new(
        Arc::clone(&store),
        Arc::clone(&store),
        config.password_hasher()?,
        config.token_issuer(),
    )?);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        shutdown_signal().await;
        tracing::info!("Shutdown signal received, draining connections");
        let _ = shutdown_tx.send(true);
    });

    let http_address = format!("0.0.0.0:{}", config.server.http_port);
    let http_listener = tokio::net::TcpListener::bind(&http_address).await?;
    tracing::info!(
        address = %http_address,
        port = config.server.http_port,
        protocol = "http",
        "Http server listening"
    );

    let http_application = create_router(Arc::clone(&auth_service));
    let http_shutdown = shutdown_rx.clone();
    let http_server = tokio::spawn(async move {
        axum::serve(http_listener, http_application)
            .with_graceful_shutdown(wait_for_shutdown(http_shutdown))
            .await
    });

    let grpc_address = format!("0.0.0.0:{}", config.server.grpc_port).parse()?;
    let grpc_service = AuthGrpcService::new(Arc::clone(&auth_service));
    tracing::info!(
        address = %grpc_address,
        port = config.server.grpc_port,
        protocol = "grpc",
        "gRpc server listening"
    );

    let timeout = Duration::from_secs(config.server.timeout_secs);
    let grpc_server = tokio::spawn(async move {
        Server::builder()
            .timeout(timeout)
            .add_service(AuthServer::new(grpc_service))
            .serve_with_shutdown(grpc_address, wait_for_shutdown(shutdown_rx))
            .await
    });

    let (http_result, grpc_result) = tokio::try_join!(http_server, grpc_server)?;
    http_result?;
    grpc_result?;

    tracing::info!("Servers exited successfully");

    Ok(())
}

async fn wait_for_shutdown(mut shutdown: watch::Receiver<bool>) {
    // A dropped sender also ends the wait.
    let _ = shutdown.wait_for(|stop| *stop).await;
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::signal;
        use tokio::signal::unix::SignalKind;

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
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
}
