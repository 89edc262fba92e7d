use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use tokio::fs;
use tokio::sync::RwLock;
use anyhow::Result;

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct HealthConfig {
    #[serde(default = "default_listen_addr")]
    pub listen_addr: SocketAddr,
    #[serde(default = "default_metrics_addr")]
    pub metrics_addr: SocketAddr,
    #[serde(default = "default_probe_timeout_ms")]
    pub probe_timeout_ms: u64,
    /// Skip certificate verification on the prober's client. Reachability, not
    /// trust, is what gets tested, so self-signed targets are accepted by default.
    #[serde(default = "default_accept_invalid_certs")]
    pub accept_invalid_certs: bool,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default = "default_log_format")]
    pub log_format: LogFormat,

    // Background indicator polling
    #[serde(default = "default_health_check_enabled")]
    pub health_check_enabled: bool,
    /// Seconds between checks; unset or 0 means 60.
    #[serde(default)]
    pub health_check_interval: Option<u64>,
    #[serde(default)]
    pub targets: Vec<String>,
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Text,
    Json,
}

fn default_listen_addr() -> SocketAddr {
    ([0, 0, 0, 0], 5005).into()
}

fn default_metrics_addr() -> SocketAddr {
    ([0, 0, 0, 0], 9100).into()
}

fn default_probe_timeout_ms() -> u64 {
    5000
}

fn default_accept_invalid_certs() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> LogFormat {
    LogFormat::Text
}

fn default_health_check_enabled() -> bool {
    true
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            metrics_addr: default_metrics_addr(),
            probe_timeout_ms: default_probe_timeout_ms(),
            accept_invalid_certs: default_accept_invalid_certs(),
            log_level: default_log_level(),
            log_format: default_log_format(),
            health_check_enabled: default_health_check_enabled(),
            health_check_interval: None,
            targets: Vec::new(),
        }
    }
}

impl HealthConfig {
    /// Get the log level as a tracing::Level
    pub fn get_tracing_level(&self) -> Result<tracing::Level> {
        match self.log_level.to_lowercase().as_str() {
            "trace" => Ok(tracing::Level::TRACE),
            "debug" => Ok(tracing::Level::DEBUG),
            "info" => Ok(tracing::Level::INFO),
            "warn" | "warning" => Ok(tracing::Level::WARN),
            "error" => Ok(tracing::Level::ERROR),
            _ => Err(anyhow::anyhow!("Invalid log level: {}. Valid levels are: trace, debug, info, warn, error", self.log_level))
        }
    }

    pub fn parse(content: &str) -> Result<Self> {
        let config: HealthConfig = serde_json::from_str(content)?;
        config.get_tracing_level()?;
        if config.probe_timeout_ms == 0 {
            return Err(anyhow::anyhow!("probe_timeout_ms must be greater than zero"));
        }
        Ok(config)
    }
}

pub struct ConfigManager {
    pub config: Arc<RwLock<HealthConfig>>,
}

impl ConfigManager {
    /// Loads `$HEALTH_CONFIG` (default `health.json`) and keeps re-reading it
    /// every `$CONFIG_POLL_INTERVAL_SECONDS`. A missing file means defaults.
    pub async fn start() -> Result<Self> {
        let config_file = std::env::var("HEALTH_CONFIG")
            .unwrap_or_else(|_| "health.json".to_string());

        println!("Starting with local file: {}", config_file);

        let initial = Self::load_file_config(&config_file).await?;
        let config = Arc::new(RwLock::new(initial));

        let poll_interval_sec: u64 = std::env::var("CONFIG_POLL_INTERVAL_SECONDS")
            .unwrap_or_else(|_| "30".to_string())
            .parse()
            .unwrap_or(30);

        // Spawn background task to watch file for changes
        {
            let config_clone = config.clone();
            let config_file_clone = config_file.clone();

            tokio::spawn(async move {
                loop {
                    tokio::time::sleep(tokio::time::Duration::from_secs(poll_interval_sec)).await;
                    match Self::load_file_config(&config_file_clone).await {
                        Ok(new_cfg) => {
                            let mut c = config_clone.write().await;
                            if *c != new_cfg {
                                tracing::info!(file = %config_file_clone, "Local config file updated");
                                *c = new_cfg;
                            }
                        }
                        Err(e) => {
                            tracing::error!("Error reading config file {}: {:?}", config_file_clone, e);
                        }
                    }
                }
            });
        }

        Ok(ConfigManager { config })
    }

    async fn load_file_config(file_path: &str) -> Result<HealthConfig> {
        if !Path::new(file_path).exists() {
            return Ok(HealthConfig::default());
        }

        let content = fs::read_to_string(file_path).await?;
        HealthConfig::parse(&content)
    }
}
