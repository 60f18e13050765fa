pub mod entities;
pub mod enums;
pub mod models;
pub mod services;

use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use std::path::Path;
use tracing::{debug, info};

use crate::db::entities::system_log;
use crate::db::models::NewSample;
use crate::db::services::system_log_service;

/// Append-only store of samples backed by a single SQLite file.
///
/// The store owns one connection for its whole lifetime; it is released when
/// the store is dropped or [`LogStore::close`] is called. Every insert is a
/// single auto-committed statement, so a row is durable once `insert` returns.
pub struct LogStore {
    db: DatabaseConnection,
}

impl LogStore {
    /// Opens the database at `database_url` (e.g. `sqlite://log.db?mode=rwc`
    /// or `sqlite::memory:`).
    pub async fn open(database_url: &str) -> Result<Self, DbErr> {
        let mut opt = ConnectOptions::new(database_url.to_owned());
        // A single connection keeps in-memory databases alive and serializes writers.
        opt.max_connections(1).min_connections(1).sqlx_logging(false);

        let db = Database::connect(opt).await?;
        info!(url = %database_url, "Opened log store.");
        Ok(Self { db })
    }

    /// Opens (creating if needed) the SQLite file at `path`.
    pub async fn from_path(path: &Path) -> Result<Self, DbErr> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    DbErr::Custom(format!("Failed to create directory {parent:?}: {e}"))
                })?;
            }
        }
        let url = format!("sqlite://{}?mode=rwc", path.display());
        Self::open(&url).await
    }

    /// Ensures the `system_log` table exists. Safe to call on every start.
    pub async fn init(&self) -> Result<(), DbErr> {
        system_log_service::create_system_log_table(&self.db).await
    }

    pub async fn insert(&self, sample: &NewSample) -> Result<system_log::Model, DbErr> {
        let row = system_log_service::insert_sample(&self.db, sample).await?;
        debug!(id = row.id, "Inserted sample.");
        Ok(row)
    }

    /// Up to `limit` rows, most recent first.
    pub async fn recent(&self, limit: u64) -> Result<Vec<system_log::Model>, DbErr> {
        system_log_service::get_recent_samples(&self.db, limit).await
    }

    pub async fn count(&self) -> Result<u64, DbErr> {
        system_log_service::count_samples(&self.db).await
    }

    pub async fn close(self) -> Result<(), DbErr> {
        self.db.close().await
    }
}
