use clap::Parser;
use std::error::Error;
use std::path::Path;
use tracing::{error, info};
use tracing_appender::rolling;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use healthlog::agent_modules::collector::SampleCollector;
use healthlog::agent_modules::config::load_config;
use healthlog::agent_modules::metrics::SysinfoMetricsReader;
use healthlog::agent_modules::ping_probe::SystemPingProber;
use healthlog::agent_modules::run_loop::run_and_close;
use healthlog::db::LogStore;
use healthlog::version::VERSION;

#[derive(Parser, Debug)]
#[command(author, version, about = "Samples host health into a local SQLite log", long_about = None)]
struct Args {
    /// Path to the configuration file
    #[arg(short, long, default_value = "healthlog.toml")]
    config: String,
}

fn init_logging(log_dir: &str) {
    // Log to a file: JSON format, daily rotation
    let file_appender = rolling::daily(log_dir, "healthlog.log");
    let file_layer = fmt::layer()
        .with_writer(file_appender)
        .with_ansi(false)
        .json();

    // Log to stdout: human-readable format
    let stdout_layer = fmt::layer().with_writer(std::io::stdout);

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,sea_orm=warn,sqlx::query=warn"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(stdout_layer)
        .init();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    // The log directory comes from the config, so the config is read before
    // logging exists; errors are printed directly in that case.
    let loaded = match load_config(&args.config) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("Critical error loading configuration: {e}");
            return Err(e.into());
        }
    };

    init_logging(&loaded.config.log_dir);
    info!(version = VERSION, "Starting healthlog...");
    loaded.log_source();
    let config = loaded.config;

    let store = match LogStore::from_path(Path::new(&config.database_path)).await {
        Ok(store) => store,
        Err(e) => {
            error!(path = %config.database_path, error = %e, "Failed to open log store. Exiting.");
            return Err(e.into());
        }
    };

    let mut collector = SampleCollector::new(
        SysinfoMetricsReader::new(config.cpu_sample_window()),
        SystemPingProber::new(config.probe_binary.clone()),
        config.probe_target.clone(),
    );

    let mut stdout = std::io::stdout();
    match run_and_close(&config, store, &mut collector, &mut stdout).await {
        Ok(summary) => {
            info!(inserted = summary.inserted, "healthlog finished.");
            Ok(())
        }
        Err(e) => {
            error!(error = %e, "Run aborted.");
            Err(e.into())
        }
    }
}
