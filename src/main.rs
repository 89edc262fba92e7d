mod api;
mod batch;
mod config;
mod indicator;
mod metrics;
mod monitor;
mod prober;
mod scheduler;
mod timestamp;
mod util;

#[cfg(test)]
mod test_support;

use config::{ConfigManager, LogFormat};
use prober::HttpProber;

use std::sync::Arc;
use tracing::info;

#[tokio::main(flavor = "multi_thread")]
async fn main() -> anyhow::Result<()> {
    // Load config first to get log level
    let config_mgr = Arc::new(ConfigManager::start().await?);
    let config = config_mgr.config.read().await.clone();
    let log_level = config.get_tracing_level()?;

    println!("Starting url_health");

    // Init tracing with configured log level
    let filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(format!("url_health={}", log_level.as_str().to_lowercase()).parse()?);
    match config.log_format {
        LogFormat::Text => tracing_subscriber::fmt().with_env_filter(filter).init(),
        LogFormat::Json => tracing_subscriber::fmt().json().with_env_filter(filter).init(),
    }

    let prober = HttpProber::from_config(&config)?;
    info!(
        timeout_ms = config.probe_timeout_ms,
        accept_invalid_certs = config.accept_invalid_certs,
        "prober ready"
    );

    // Start metrics endpoint
    info!(addr = %config.metrics_addr, "serving metrics");
    tokio::spawn(metrics::serve_metrics(config.metrics_addr));

    // Background indicators for configured targets
    info!(
        targets = config.targets.len(),
        enabled = config.health_check_enabled,
        "starting monitor"
    );
    tokio::spawn(monitor::run(config_mgr.config.clone(), prober.clone()));

    info!(addr = %config.listen_addr, "serving health-check API");
    warp::serve(api::routes(prober)).run(config.listen_addr).await;

    Ok(())
}
