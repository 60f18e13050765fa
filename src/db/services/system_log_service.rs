use sea_orm::{
    ActiveModelTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryOrder, QuerySelect, Schema, Set,
};
use tracing::info;

use crate::db::entities::system_log;
use crate::db::models::NewSample;

/// Creates the `system_log` table from the entity definition if it does not
/// exist yet. Existing rows are never touched.
pub async fn create_system_log_table(db: &DatabaseConnection) -> Result<(), DbErr> {
    let backend = db.get_database_backend();
    let schema = Schema::new(backend);
    let mut stmt = schema.create_table_from_entity(system_log::Entity);
    stmt.if_not_exists();

    db.execute(backend.build(&stmt)).await?;
    info!("Ensured system_log table exists.");
    Ok(())
}

pub async fn insert_sample(
    db: &DatabaseConnection,
    sample: &NewSample,
) -> Result<system_log::Model, DbErr> {
    let row = system_log::ActiveModel {
        timestamp: Set(sample.timestamp.clone()),
        cpu_percent: Set(sample.cpu_percent),
        memory_percent: Set(sample.memory_percent),
        disk_percent: Set(sample.disk_percent),
        ping_status: Set(sample.ping_status),
        ping_ms: Set(sample.ping_ms),
        ..Default::default()
    };
    row.insert(db).await
}

/// Returns up to `limit` rows ordered by descending id.
pub async fn get_recent_samples(
    db: &DatabaseConnection,
    limit: u64,
) -> Result<Vec<system_log::Model>, DbErr> {
    if limit == 0 {
        return Ok(Vec::new());
    }
    system_log::Entity::find()
        .order_by_desc(system_log::Column::Id)
        .limit(limit)
        .all(db)
        .await
}

pub async fn count_samples(db: &DatabaseConnection) -> Result<u64, DbErr> {
    system_log::Entity::find().count(db).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::enums::PingStatus;
    use crate::db::LogStore;

    fn sample(n: u32, status: PingStatus, ping_ms: f64) -> NewSample {
        NewSample {
            timestamp: format!("2026-10-19 12:00:{n:02}"),
            cpu_percent: 10.0 + f64::from(n),
            memory_percent: 50.0,
            disk_percent: 20.0,
            ping_status: status,
            ping_ms,
        }
    }

    async fn memory_store() -> LogStore {
        let store = LogStore::open("sqlite::memory:").await.unwrap();
        store.init().await.unwrap();
        store
    }

    #[tokio::test]
    async fn test_init_is_idempotent_on_empty_store() {
        let store = memory_store().await;
        store.init().await.unwrap();

        assert_eq!(store.count().await.unwrap(), 0);
        assert!(store.recent(5).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_init_keeps_existing_rows() {
        let store = memory_store().await;
        store.insert(&sample(1, PingStatus::Up, 12.5)).await.unwrap();
        store.insert(&sample(2, PingStatus::Down, -1.0)).await.unwrap();

        store.init().await.unwrap();
        store.init().await.unwrap();

        let rows = store.recent(10).await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].ping_status, PingStatus::Down);
        assert_eq!(rows[1].ping_ms, 12.5);
    }

    #[tokio::test]
    async fn test_insert_round_trips_fields() {
        let store = memory_store().await;
        let input = sample(7, PingStatus::Up, 15.2);

        let inserted = store.insert(&input).await.unwrap();
        let fetched = store.recent(1).await.unwrap();

        assert_eq!(fetched.len(), 1);
        let row = &fetched[0];
        assert_eq!(row, &inserted);
        assert_eq!(row.timestamp, input.timestamp);
        assert_eq!(row.cpu_percent, input.cpu_percent);
        assert_eq!(row.memory_percent, input.memory_percent);
        assert_eq!(row.disk_percent, input.disk_percent);
        assert_eq!(row.ping_status, input.ping_status);
        assert_eq!(row.ping_ms, input.ping_ms);
    }

    #[tokio::test]
    async fn test_ids_strictly_increase() {
        let store = memory_store().await;
        let mut last_id = 0;
        for n in 0..4 {
            let row = store.insert(&sample(n, PingStatus::Up, 1.0)).await.unwrap();
            assert!(row.id > last_id);
            last_id = row.id;
        }
    }

    #[tokio::test]
    async fn test_recent_returns_min_of_limit_and_total() {
        let store = memory_store().await;
        let mut ids = Vec::new();
        for n in 0..6 {
            ids.push(store.insert(&sample(n, PingStatus::Up, 1.0)).await.unwrap().id);
        }

        let rows = store.recent(4).await.unwrap();
        assert_eq!(rows.len(), 4);
        let got: Vec<i32> = rows.iter().map(|r| r.id).collect();
        let expected: Vec<i32> = ids.iter().rev().take(4).copied().collect();
        assert_eq!(got, expected);
        assert_eq!(rows[0].id, *ids.last().unwrap());
    }

    #[tokio::test]
    async fn test_recent_zero_and_oversized_limits() {
        let store = memory_store().await;
        for n in 0..3 {
            store.insert(&sample(n, PingStatus::Up, 1.0)).await.unwrap();
        }

        assert!(store.recent(0).await.unwrap().is_empty());
        assert_eq!(store.recent(100).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_file_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("log.db");

        let store = LogStore::from_path(&path).await.unwrap();
        store.init().await.unwrap();
        let first = store.insert(&sample(1, PingStatus::Up, 9.9)).await.unwrap();
        store.close().await.unwrap();

        let reopened = LogStore::from_path(&path).await.unwrap();
        reopened.init().await.unwrap();
        let second = reopened
            .insert(&sample(2, PingStatus::Down, -1.0))
            .await
            .unwrap();

        assert!(second.id > first.id);
        let rows = reopened.recent(5).await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1], first);
    }
}
