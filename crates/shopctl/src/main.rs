//! Command-line driver for the cart and order core.
//!
//! Seeds a small catalog, walks one user through a cart, converts it into an
//! order and prints the recorded orders followed by the metrics snapshot.

mod scenario;
mod telemetry;

use document_store::{InMemoryDocumentStore, PostgresDocumentStore};
use shop::ShopConfig;
use sqlx::postgres::PgPoolOptions;

#[tokio::main]
async fn main() {
    // 1. Load configuration
    let config = ShopConfig::from_env().expect("invalid configuration");

    // 2. Initialize tracing
    telemetry::init_tracing(&config);

    // 3. Install Prometheus metrics recorder
    let metrics_handle = metrics_exporter_prometheus::PrometheusBuilder::new()
        .install_recorder()
        .expect("failed to install Prometheus recorder");

    // 4. Pick a store and run the scenario against it
    let result = match config.database_url.as_deref() {
        Some(url) => {
            tracing::info!(
                max_connections = config.max_connections,
                "connecting to PostgreSQL"
            );
            let pool = PgPoolOptions::new()
                .max_connections(config.max_connections)
                .connect(url)
                .await
                .expect("failed to connect to database");
            let store = PostgresDocumentStore::new(pool);
            store
                .run_migrations()
                .await
                .expect("failed to run migrations");
            scenario::run(store, &config).await
        }
        None => {
            tracing::info!("DATABASE_URL not set, using in-memory store");
            scenario::run(InMemoryDocumentStore::new(), &config).await
        }
    };

    if let Err(error) = result {
        tracing::error!(%error, "scenario failed");
        std::process::exit(1);
    }

    println!("{}", metrics_handle.render());
}
