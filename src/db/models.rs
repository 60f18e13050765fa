use serde::{Deserialize, Serialize};

use crate::db::enums::PingStatus;

/// A collected sample that has not been stored yet; the id is assigned on insert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewSample {
    pub timestamp: String,
    pub cpu_percent: f64,
    pub memory_percent: f64,
    pub disk_percent: f64,
    pub ping_status: PingStatus,
    pub ping_ms: f64,
}
