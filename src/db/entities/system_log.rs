use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::db::enums::PingStatus;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "system_log")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    /// Local capture time, `YYYY-MM-DD HH:MM:SS`.
    pub timestamp: String,
    #[sea_orm(column_name = "cpu")]
    pub cpu_percent: f64,
    #[sea_orm(column_name = "memory")]
    pub memory_percent: f64,
    #[sea_orm(column_name = "disk")]
    pub disk_percent: f64,
    pub ping_status: PingStatus,
    /// Round-trip time, or -1 when unreachable or unparseable.
    pub ping_ms: f64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({}, '{}', {}, {}, {}, '{}', {})",
            self.id,
            self.timestamp,
            self.cpu_percent,
            self.memory_percent,
            self.disk_percent,
            self.ping_status,
            self.ping_ms
        )
    }
}
