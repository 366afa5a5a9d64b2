use sqlx::postgres::PgPoolOptions;
use std::net::TcpListener;
use std::sync::Arc;

use employee_auth::auth::Authority;
use employee_auth::configuration::get_configuration;
use employee_auth::seed::seed_default_hr;
use employee_auth::startup::run;
use employee_auth::store::PgCredentialStore;
use employee_auth::telemetry::init_telemetry;

fn startup_error(kind: std::io::ErrorKind, message: &str) -> std::io::Error {
    std::io::Error::new(kind, message.to_string())
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    init_telemetry("info");

    tracing::info!("Starting employee auth service");

    let configuration = get_configuration().map_err(|e| {
        tracing::error!("Failed to read configuration: {}", e);
        startup_error(std::io::ErrorKind::InvalidInput, "Configuration error")
    })?;

    if let Err(e) = configuration.validate() {
        tracing::error!("Invalid configuration: {}", e);
        return Err(startup_error(std::io::ErrorKind::InvalidInput, "Configuration error"));
    }
    tracing::info!("Configuration loaded successfully");

    let pool = PgPoolOptions::new()
        .max_connections(configuration.database.max_connections)
        .connect(&configuration.database.connection_string())
        .await
        .map_err(|e| {
            tracing::error!("Failed to create connection pool: {}", e);
            startup_error(std::io::ErrorKind::ConnectionRefused, "Database connection error")
        })?;

    sqlx::migrate!("./migrations").run(&pool).await.map_err(|e| {
        tracing::error!("Failed to run migrations: {}", e);
        startup_error(std::io::ErrorKind::Other, "Migration error")
    })?;
    tracing::info!("Database ready");

    let store = Arc::new(PgCredentialStore::new(pool));

    seed_default_hr(store.as_ref(), &configuration.seed, configuration.password.hash_cost)
        .await
        .map_err(|e| {
            tracing::error!("Failed to seed HR user: {}", e);
            startup_error(std::io::ErrorKind::Other, "Seed error")
        })?;

    let authority = Authority::new(store, &configuration.jwt, &configuration.password).map_err(|e| {
        tracing::error!("Failed to build authority: {}", e);
        startup_error(std::io::ErrorKind::InvalidInput, "Authority configuration error")
    })?;

    let address = format!(
        "{}:{}",
        configuration.application.host, configuration.application.port
    );
    let listener = TcpListener::bind(&address)?;
    tracing::info!("Server listening on: {}", address);

    run(listener, authority)?.await
}
