use chrono::Local;

use crate::agent_modules::metrics::{MetricsError, MetricsReader};
use crate::agent_modules::ping_probe::Prober;
use crate::db::models::NewSample;

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Builds one [`NewSample`] per call from a metrics reader and a prober.
pub struct SampleCollector<M, P> {
    metrics_reader: M,
    prober: P,
    probe_target: String,
}

impl<M, P> SampleCollector<M, P>
where
    M: MetricsReader,
    P: Prober,
{
    pub fn new(metrics_reader: M, prober: P, probe_target: impl Into<String>) -> Self {
        Self {
            metrics_reader,
            prober,
            probe_target: probe_target.into(),
        }
    }

    pub fn probe_target(&self) -> &str {
        &self.probe_target
    }

    /// The timestamp is taken before the (slow) metric reads, so it marks the
    /// start of the sample.
    pub async fn collect(&mut self) -> Result<NewSample, MetricsError> {
        let timestamp = Local::now().format(TIMESTAMP_FORMAT).to_string();
        let metrics = self.metrics_reader.read_metrics().await?;
        let outcome = self.prober.probe(&self.probe_target).await;

        Ok(NewSample {
            timestamp,
            cpu_percent: metrics.cpu_percent,
            memory_percent: metrics.memory_percent,
            disk_percent: metrics.disk_percent,
            ping_status: outcome.status(),
            ping_ms: outcome.latency_ms(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent_modules::metrics::HostMetrics;
    use crate::agent_modules::ping_probe::{ProbeOutcome, NO_LATENCY};
    use crate::db::enums::PingStatus;
    use async_trait::async_trait;
    use chrono::NaiveDateTime;
    use std::sync::{Arc, Mutex};

    struct FixedReader(Result<HostMetrics, MetricsError>);

    #[async_trait]
    impl MetricsReader for FixedReader {
        async fn read_metrics(&mut self) -> Result<HostMetrics, MetricsError> {
            self.0.clone()
        }
    }

    struct RecordingProber {
        outcome: ProbeOutcome,
        targets: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait]
    impl Prober for RecordingProber {
        async fn probe(&self, target: &str) -> ProbeOutcome {
            self.targets.lock().unwrap().push(target.to_string());
            self.outcome
        }
    }

    fn metrics() -> HostMetrics {
        HostMetrics {
            cpu_percent: 10.0,
            memory_percent: 50.0,
            disk_percent: 20.0,
        }
    }

    #[tokio::test]
    async fn test_collect_composes_sample() {
        let targets = Arc::new(Mutex::new(Vec::new()));
        let prober = RecordingProber {
            outcome: ProbeOutcome::Reachable { latency_ms: 15.2 },
            targets: targets.clone(),
        };
        let mut collector = SampleCollector::new(FixedReader(Ok(metrics())), prober, "8.8.8.8");

        let sample = collector.collect().await.unwrap();

        assert_eq!(sample.cpu_percent, 10.0);
        assert_eq!(sample.memory_percent, 50.0);
        assert_eq!(sample.disk_percent, 20.0);
        assert_eq!(sample.ping_status, PingStatus::Up);
        assert_eq!(sample.ping_ms, 15.2);
        assert!(NaiveDateTime::parse_from_str(&sample.timestamp, TIMESTAMP_FORMAT).is_ok());
        assert_eq!(sample.timestamp.len(), "2026-10-19 12:00:00".len());
        assert_eq!(*targets.lock().unwrap(), vec!["8.8.8.8".to_string()]);
    }

    #[tokio::test]
    async fn test_unreachable_probe_records_down() {
        let prober = RecordingProber {
            outcome: ProbeOutcome::Unreachable,
            targets: Arc::new(Mutex::new(Vec::new())),
        };
        let mut collector = SampleCollector::new(FixedReader(Ok(metrics())), prober, "10.0.0.1");

        let sample = collector.collect().await.unwrap();

        assert_eq!(sample.ping_status, PingStatus::Down);
        assert_eq!(sample.ping_ms, NO_LATENCY);
    }

    #[tokio::test]
    async fn test_metrics_failure_propagates() {
        let targets = Arc::new(Mutex::new(Vec::new()));
        let prober = RecordingProber {
            outcome: ProbeOutcome::Unreachable,
            targets: targets.clone(),
        };
        let mut collector =
            SampleCollector::new(FixedReader(Err(MetricsError::NoMemoryInfo)), prober, "8.8.8.8");

        let result = collector.collect().await;

        assert_eq!(result, Err(MetricsError::NoMemoryInfo));
        assert!(targets.lock().unwrap().is_empty());
    }
}
