//! Service entry point: configuration, database pool, HTTP server.

use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::EnvFilter;

use spacefed_members::adapters::email::ResendMailer;
use spacefed_members::adapters::gocardless::{GoCardlessClient, WebhookSignatureVerifier};
use spacefed_members::adapters::http::membership::{router, AppState};
use spacefed_members::adapters::postgres::{
    PostgresApplications, PostgresMandates, PostgresPayments, PostgresUsers,
};
use spacefed_members::application::PublicUrls;
use spacefed_members::config::AppConfig;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    config.validate()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.server.log_level)),
        )
        .init();

    let pool = PgPoolOptions::new()
        .min_connections(config.database.min_connections)
        .max_connections(config.database.max_connections)
        .acquire_timeout(config.database.acquire_timeout())
        .connect(&config.database.url)
        .await?;

    if config.database.run_migrations {
        tracing::info!("running database migrations");
        sqlx::migrate!("./migrations").run(&pool).await?;
    }

    let state = AppState {
        applications: Arc::new(PostgresApplications::new(pool.clone())),
        mandates: Arc::new(PostgresMandates::new(pool.clone())),
        payments: Arc::new(PostgresPayments::new(pool.clone())),
        users: Arc::new(PostgresUsers::new(pool)),
        gateway: Arc::new(GoCardlessClient::new(&config.gocardless)?),
        mailer: Arc::new(ResendMailer::new(&config.email)?),
        webhook_verifier: Arc::new(WebhookSignatureVerifier::new(
            config.gocardless.webhook_secret.clone(),
        )),
        urls: PublicUrls::new(&config.server.public_base_url),
    };

    let addr = config.server.socket_addr();
    tracing::info!(%addr, "starting membership service");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router(state)).await?;

    Ok(())
}
