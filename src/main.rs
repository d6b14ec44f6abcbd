use chirpy::configuration::get_configuration;
use chirpy::session::SessionService;
use chirpy::startup::run;
use chirpy::store::PgStore;
use chirpy::telemetry::init_telemetry;
use sqlx::postgres::PgPoolOptions;
use std::net::TcpListener;
use std::sync::Arc;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let configuration = get_configuration().map_err(|e| {
        eprintln!("Failed to read configuration: {}", e);
        std::io::Error::new(std::io::ErrorKind::InvalidInput, "Configuration error")
    })?;

    init_telemetry(configuration.application.is_dev());
    tracing::info!(auth = ?configuration.auth, "Configuration loaded");

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .acquire_timeout(configuration.auth.store_timeout())
        .connect(&configuration.database.connection_string())
        .await
        .map_err(|e| {
            tracing::error!("Failed to create connection pool: {}", e);
            std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "Database connection error")
        })?;

    sqlx::migrate!("./migrations").run(&pool).await.map_err(|e| {
        tracing::error!("Failed to run migrations: {}", e);
        std::io::Error::new(std::io::ErrorKind::Other, "Migration error")
    })?;

    let store = Arc::new(PgStore::new(pool));
    let sessions = SessionService::new(store.clone(), store, configuration.auth.clone())
        .map_err(|e| {
            tracing::error!("Failed to build session service: {}", e);
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "Configuration error")
        })?;

    let address = configuration.application.address();
    let listener = TcpListener::bind(&address)?;
    tracing::info!("Server listening on: {}", address);

    run(listener, sessions)?.await
}
