use sea_orm::DbErr;
use thiserror::Error;

use crate::agent_modules::metrics::MetricsError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
    #[error("Metrics error: {0}")]
    Metrics(#[from] MetricsError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
