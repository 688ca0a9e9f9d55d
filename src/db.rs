// Database handle, generation allocation and shared write helpers.

pub(crate) mod oui;
pub(crate) mod reconcile;
pub(crate) mod sweep;

use std::future::Future;

use anyhow::{Context, Result};
use log::{debug, info};
use sea_orm::*;

use switchgrasp_entity::event;
use switchgrasp_migration::{Migrator, MigratorTrait};

/// Open the database and bring the schema up to date.
pub(crate) async fn connection(database_url: &str) -> Result<DatabaseConnection> {
    let mut options = ConnectOptions::new(database_url.to_string());
    options.sqlx_logging(false);
    let db = Database::connect(options)
        .await
        .with_context(|| format!("failed to connect to {}", database_url))?;
    Migrator::up(&db, None)
        .await
        .context("failed to apply database migrations")?;
    info!("connected to database: {}", database_url);
    Ok(db)
}

/// Allocate the generation marker for one poll cycle.
pub(crate) async fn new_event(db: &DatabaseConnection, epoch_utc: i64) -> Result<event::Model, DbErr> {
    let name = chrono::Utc::now().format("%Y%m%d%H%M%S%.9f").to_string();
    let event = event::ActiveModel {
        name: Set(name),
        epoch_utc: Set(epoch_utc),
        enabled: Set(true),
        ..Default::default()
    }
    .insert(db)
    .await?;
    debug!("allocated event {} ({})", event.idx_event, event.name);
    Ok(event)
}

pub(crate) fn naive_now() -> chrono::NaiveDateTime {
    chrono::Utc::now().naive_utc()
}

/// Run a write, and run it once more if the first attempt fails.
pub(crate) async fn retry_once<T, F, Fut>(mut write: F) -> Result<T, DbErr>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, DbErr>>,
{
    match write().await {
        Ok(value) => Ok(value),
        Err(e) => {
            debug!("retrying write after: {}", e);
            write().await
        }
    }
}

#[cfg(test)]
pub(crate) async fn test_connection() -> (tempfile::TempDir, DatabaseConnection) {
    let dir = tempfile::tempdir().unwrap();
    let url = format!(
        "sqlite://{}?mode=rwc",
        dir.path().join("switchgrasp.db").display()
    );
    let db = connection(&url).await.unwrap();
    (dir, db)
}
