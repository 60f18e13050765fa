use std::io::Write;
use tracing::{error, info, warn};

use crate::agent_modules::collector::SampleCollector;
use crate::agent_modules::config::HealthLogConfig;
use crate::agent_modules::metrics::MetricsReader;
use crate::agent_modules::ping_probe::Prober;
use crate::db::LogStore;
use crate::error::AppError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub inserted: u32,
    pub failed_inserts: u32,
}

/// Initializes the store, collects `config.cycles` samples spaced
/// `config.interval()` apart, then prints the most recent rows oldest first.
///
/// A store that cannot be initialized aborts before any collection. A failed
/// insert is reported and that cycle is skipped. A metrics failure aborts the
/// run; rows already inserted stay committed.
pub async fn run<M, P, W>(
    config: &HealthLogConfig,
    store: &LogStore,
    collector: &mut SampleCollector<M, P>,
    out: &mut W,
) -> Result<RunSummary, AppError>
where
    M: MetricsReader,
    P: Prober,
    W: Write,
{
    store.init().await.map_err(|e| {
        error!(error = %e, "Failed to initialize log store.");
        AppError::Database(e)
    })?;

    info!(
        cycles = config.cycles,
        interval_seconds = config.interval_seconds,
        target = %collector.probe_target(),
        "Sampling started."
    );

    let mut summary = RunSummary::default();
    for cycle in 1..=config.cycles {
        let sample = collector.collect().await.map_err(|e| {
            error!(cycle, error = %e, "Failed to read host metrics. Aborting run.");
            e
        })?;

        match store.insert(&sample).await {
            Ok(row) => {
                summary.inserted += 1;
                writeln!(out, "Logged: {row}")?;
            }
            Err(e) => {
                summary.failed_inserts += 1;
                error!(cycle, error = %e, "Failed to store sample, skipping cycle.");
                writeln!(out, "Failed to log sample: {e}")?;
            }
        }

        if cycle < config.cycles {
            tokio::time::sleep(config.interval()).await;
        }
    }

    let mut rows = store.recent(config.summary_limit).await?;
    rows.reverse();
    writeln!(out, "Last {} entries:", rows.len())?;
    for row in &rows {
        writeln!(out, "{row}")?;
    }

    info!(
        inserted = summary.inserted,
        failed_inserts = summary.failed_inserts,
        "Sampling finished."
    );
    Ok(summary)
}

/// Runs [`run`] and then closes the store. The run result takes precedence:
/// a close failure is only logged.
pub async fn run_and_close<M, P, W>(
    config: &HealthLogConfig,
    store: LogStore,
    collector: &mut SampleCollector<M, P>,
    out: &mut W,
) -> Result<RunSummary, AppError>
where
    M: MetricsReader,
    P: Prober,
    W: Write,
{
    let result = run(config, &store, collector, out).await;
    if let Err(e) = store.close().await {
        warn!(error = %e, "Failed to close log store.");
    }
    result
}
