use std::collections::HashMap;
use std::sync::Arc;

use futures::future::join_all;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::config::HealthConfig;
use crate::indicator::{poll_interval, HealthIndicator};
use crate::metrics::{forget_indicator, set_indicator};
use crate::prober::Probe;
use crate::scheduler::Scheduler;

/// Keeps one indicator per configured target fresh, forever.
///
/// Config is re-read on every tick, so target list, enabled flag and interval
/// changes from a reload take effect on the next round.
pub async fn run<P: Probe>(config: Arc<RwLock<HealthConfig>>, prober: P) {
    let mut indicators: Vec<HealthIndicator> = Vec::new();
    let mut scheduler = Scheduler::new();

    loop {
        let interval = poll_interval(config.read().await.health_check_interval);
        scheduler.tick(interval).await;

        let (enabled, targets) = {
            let c = config.read().await;
            (c.health_check_enabled, c.targets.clone())
        };
        sync_targets(&mut indicators, &targets);
        check_all(&mut indicators, enabled, &prober).await;
    }
}

/// Lines the indicators up with `targets`, keeping state for targets that stay.
fn sync_targets(indicators: &mut Vec<HealthIndicator>, targets: &[String]) {
    let mut existing: HashMap<String, HealthIndicator> = indicators
        .drain(..)
        .map(|i| (i.url().to_string(), i))
        .collect();

    *indicators = targets
        .iter()
        .map(|t| existing.remove(t).unwrap_or_else(|| HealthIndicator::new(t.clone())))
        .collect();

    for (url, _) in existing {
        debug!(target_url = %url, "target removed from config");
        forget_indicator(&url);
    }
}

async fn check_all<P: Probe>(indicators: &mut [HealthIndicator], enabled: bool, prober: &P) {
    join_all(indicators.iter_mut().map(|indicator| async move {
        let before = indicator.status();
        let after = indicator.refresh(enabled, prober).await;
        if before != after {
            info!(target_url = %indicator.url(), from = ?before, to = ?after, "{}", indicator.title());
        }
        set_indicator(indicator.url(), after);
    }))
    .await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicator::IndicatorStatus;
    use crate::prober::{ProbeResult, Status};

    #[derive(Clone)]
    struct UpIfHttps;

    impl Probe for UpIfHttps {
        async fn probe(&self, url: &str) -> ProbeResult {
            let status = if url.starts_with("https://") { Status::Online } else { Status::Offline };
            ProbeResult::answered(url, status)
        }
    }

    fn urls(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn sync_keeps_state_and_order() {
        let mut indicators = vec![HealthIndicator::new("https://a.test")];
        indicators[0].begin_check(true);
        indicators[0].finish_check(Status::Online);

        sync_targets(&mut indicators, &urls(&["http://b.test", "https://a.test"]));

        assert_eq!(indicators.len(), 2);
        assert_eq!(indicators[0].url(), "http://b.test");
        assert_eq!(indicators[0].status(), IndicatorStatus::Checking);
        assert_eq!(indicators[1].url(), "https://a.test");
        assert_eq!(indicators[1].status(), IndicatorStatus::Online);
    }

    #[test]
    fn sync_drops_removed_targets() {
        let mut indicators = vec![HealthIndicator::new("https://a.test"), HealthIndicator::new("https://b.test")];
        sync_targets(&mut indicators, &urls(&["https://b.test"]));
        assert_eq!(indicators.len(), 1);
        assert_eq!(indicators[0].url(), "https://b.test");
    }

    #[tokio::test]
    async fn check_all_refreshes_every_indicator() {
        let mut indicators = vec![HealthIndicator::new("https://up.test"), HealthIndicator::new("http://down.test")];

        check_all(&mut indicators, true, &UpIfHttps).await;
        assert_eq!(indicators[0].status(), IndicatorStatus::Online);
        assert_eq!(indicators[1].status(), IndicatorStatus::Offline);

        check_all(&mut indicators, false, &UpIfHttps).await;
        assert!(indicators.iter().all(|i| i.status() == IndicatorStatus::Disabled));
    }
}
