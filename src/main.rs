//! Catalog server bootstrap
//!
//! Loads configuration, connects to Postgres and reports the catalog summary.
//! The web application embedding the library builds its routes on top of
//! [`catalog_server::AppState`].

use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;

use catalog_server::{api, config::AppConfig, repository::Repository, telemetry, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let config = AppConfig::load()?;
    telemetry::init(&config.logging);

    tracing::info!("Starting catalog server v{}", env!("CARGO_PKG_VERSION"));

    let pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .min_connections(config.database.min_connections)
        .connect(&config.database.url)
        .await?;

    tracing::info!("Connected to database");

    let state = AppState::new(config, Arc::new(Repository::new(pool)));

    let summary = api::index::summary(&state).await?;
    tracing::info!(
        books = summary.num_books,
        copies = summary.num_copies,
        available = summary.num_copies_available,
        authors = summary.num_authors,
        "Catalog loaded"
    );
    println!("{}", serde_json::to_string_pretty(&summary)?);

    Ok(())
}
