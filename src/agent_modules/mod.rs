pub mod collector;
pub mod config;
pub mod encoding;
pub mod metrics;
pub mod ping_probe;
pub mod run_loop;
