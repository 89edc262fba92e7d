use std::time::Duration;

use serde::Serialize;

use crate::prober::{Probe, Status};

const DEFAULT_INTERVAL_SECS: u64 = 60;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum IndicatorStatus {
    Checking,
    Online,
    Offline,
    Disabled,
}

impl From<Status> for IndicatorStatus {
    fn from(status: Status) -> Self {
        match status {
            Status::Online => IndicatorStatus::Online,
            Status::Offline => IndicatorStatus::Offline,
        }
    }
}

/// Badge state for one target. `checking` only shows while the very first
/// check is in flight.
#[derive(Debug, Clone)]
pub struct HealthIndicator {
    url: String,
    status: IndicatorStatus,
    first_check: bool,
}

impl HealthIndicator {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            status: IndicatorStatus::Checking,
            first_check: true,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn status(&self) -> IndicatorStatus {
        self.status
    }

    /// Starts a check. Returns the URL to probe, or `None` when checks are
    /// disabled (no network call must happen then).
    pub fn begin_check(&mut self, enabled: bool) -> Option<&str> {
        if !enabled || self.url.is_empty() {
            self.status = IndicatorStatus::Disabled;
            return None;
        }

        if self.first_check {
            self.status = IndicatorStatus::Checking;
            self.first_check = false;
        }
        Some(&self.url)
    }

    pub fn finish_check(&mut self, status: Status) {
        self.status = status.into();
    }

    pub async fn refresh<P: Probe>(&mut self, enabled: bool, prober: &P) -> IndicatorStatus {
        if self.begin_check(enabled).is_none() {
            return self.status;
        }
        let result = prober.probe(&self.url).await;
        self.finish_check(result.status());
        self.status
    }

    pub fn title(&self) -> &'static str {
        match self.status {
            IndicatorStatus::Online => "Service is online",
            IndicatorStatus::Offline => "Service is offline",
            IndicatorStatus::Checking => "Checking status...",
            IndicatorStatus::Disabled => "",
        }
    }
}

/// Polling interval from the configured seconds; unset or zero falls back to 60s.
pub fn poll_interval(interval_secs: Option<u64>) -> Duration {
    match interval_secs {
        Some(secs) if secs > 0 => Duration::from_secs(secs),
        _ => Duration::from_secs(DEFAULT_INTERVAL_SECS),
    }
}
