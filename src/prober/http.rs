use reqwest::{Client, StatusCode, redirect};
use tokio::time::{Duration, Instant, timeout};
use tracing::debug;

use super::error::ProbeError;
use super::{Probe, ProbeResult, classify};
use crate::config::HealthConfig;
use crate::metrics::observe_probe;
use crate::util::ProbeTarget;

/// HEAD-request prober over HTTP and HTTPS.
///
/// The client is owned by the prober and configured for reachability checks
/// only:
///
/// * redirects are never followed, a 3xx is already an answer;
/// * no idle connections are kept, every probe opens its own connection;
/// * with `accept_invalid_certs`, certificate verification is switched off
///   for this client alone, so self-signed targets still count as reachable.
#[derive(Debug, Clone)]
pub struct HttpProber {
    client: Client,
    timeout: Duration,
}

impl HttpProber {
    pub fn new(timeout: Duration, accept_invalid_certs: bool) -> Result<Self, ProbeError> {
        let client = Client::builder()
            .use_rustls_tls()
            .danger_accept_invalid_certs(accept_invalid_certs)
            .redirect(redirect::Policy::none())
            .pool_max_idle_per_host(0)
            .connect_timeout(timeout)
            .build()
            .map_err(ProbeError::Transport)?;
        Ok(Self { client, timeout })
    }

    pub fn from_config(config: &HealthConfig) -> Result<Self, ProbeError> {
        Self::new(
            Duration::from_millis(config.probe_timeout_ms),
            config.accept_invalid_certs,
        )
    }

    async fn request_status(&self, url: &str) -> Result<StatusCode, ProbeError> {
        let target = ProbeTarget::parse(url)?;
        debug!(url, transport = ?target.transport, host = %target.host, port = target.port, "sending HEAD");

        let resp_fut = self.client.head(target.request_url()).send();
        // dropping the future on expiry aborts the request
        match timeout(self.timeout, resp_fut).await {
            Ok(Ok(resp)) => Ok(resp.status()),
            Ok(Err(e)) => Err(ProbeError::from_transport(e)),
            Err(_) => Err(ProbeError::Timeout),
        }
    }
}

impl Probe for HttpProber {
    async fn probe(&self, url: &str) -> ProbeResult {
        let start = Instant::now();
        let result = match self.request_status(url).await {
            Ok(code) => {
                let status = classify(code);
                debug!(url, code = code.as_u16(), %status, "probe answered");
                ProbeResult::answered(url, status)
            }
            Err(e) => {
                debug!(url, error = %e, "probe failed");
                ProbeResult::failed(url, e)
            }
        };
        observe_probe(result.status(), start.elapsed());
        result
    }
}
