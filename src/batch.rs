use futures::future::join_all;
use tracing::{debug, warn};

use crate::prober::{Probe, ProbeResult};

/// Probes every URL at once and returns one result per URL, in input order.
///
/// Each probe runs on its own task. A task that dies (panics) is reported as an
/// offline entry for its URL; the rest of the batch is unaffected.
pub async fn probe_batch<P>(prober: &P, urls: Vec<String>) -> Vec<ProbeResult>
where
    P: Probe + Clone + 'static,
{
    debug!(count = urls.len(), "probing batch");

    let handles: Vec<_> = urls
        .iter()
        .cloned()
        .map(|url| {
            let prober = prober.clone();
            tokio::spawn(async move { prober.probe(&url).await })
        })
        .collect();

    // join_all yields in handle order, not completion order
    join_all(handles)
        .await
        .into_iter()
        .zip(urls)
        .map(|(joined, url)| match joined {
            Ok(result) => result,
            Err(e) => {
                warn!(url = %url, error = %e, "probe task failed");
                ProbeResult::failed(url, format!("probe task failed: {}", e))
            }
        })
        .collect()
}
