use std::{sync::Arc, time::Duration};

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};
use tracing::{debug, info, warn};

use crate::{config::AppConfig, store::CredentialStore};

/// Connects the pool and brings the schema up to date.
pub async fn connect(config: &AppConfig) -> anyhow::Result<PgPool> {
    let db = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .connect(&config.database_url)
        .await
        .context("connect to database")?;

    sqlx::migrate!("./migrations")
        .run(&db)
        .await
        .context("run migrations")?;
    info!("database ready");

    Ok(db)
}

/// Pings the store on a fixed period for the lifetime of the process.
pub async fn run_keepalive_loop(store: Arc<dyn CredentialStore>, period_secs: u64) {
    let mut interval = tokio::time::interval(Duration::from_secs(period_secs.max(1)));

    loop {
        interval.tick().await;

        match store.ping().await {
            Ok(()) => debug!("store keepalive ok"),
            Err(e) => warn!(error = %e, "store keepalive failed"),
        }
    }
}
