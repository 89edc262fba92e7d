use prometheus::{Encoder, HistogramOpts, HistogramVec, IntCounterVec, IntGaugeVec, Opts, Registry, TextEncoder};
use warp::Filter;
use warp::http::StatusCode;
use std::net::SocketAddr;
use std::time::Duration;
use once_cell::sync::Lazy;
use tracing::error;

use crate::indicator::IndicatorStatus;
use crate::prober::Status;

static REGISTRY: Lazy<Registry> = Lazy::new(Registry::new);

static PROBE_COUNTER: Lazy<IntCounterVec> = Lazy::new(|| {
    let opts = Opts::new("url_health_probe_total", "Total number of probes by outcome");
    let ctr = IntCounterVec::new(opts, &["status"]).expect("valid probe counter");
    REGISTRY.register(Box::new(ctr.clone())).expect("probe counter registered once");
    ctr
});

static PROBE_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    let opts = HistogramOpts::new(
        "url_health_probe_duration_milliseconds",
        "Probe duration in milliseconds by outcome",
    )
    .buckets(vec![
        1.0, 5.0, 10.0, 25.0, 50.0, 100.0, 250.0, 500.0, 1000.0, 2500.0, 5000.0, 10000.0,
    ]);
    let hist = HistogramVec::new(opts, &["status"]).expect("valid probe histogram");
    REGISTRY.register(Box::new(hist.clone())).expect("probe histogram registered once");
    hist
});

// 1 online, 0 offline, -1 checking, -2 disabled
static INDICATOR_STATE: Lazy<IntGaugeVec> = Lazy::new(|| {
    let opts = Opts::new("url_health_indicator_state", "Current indicator state per monitored target");
    let gauge = IntGaugeVec::new(opts, &["target"]).expect("valid indicator gauge");
    REGISTRY.register(Box::new(gauge.clone())).expect("indicator gauge registered once");
    gauge
});

pub fn observe_probe(status: Status, elapsed: Duration) {
    PROBE_COUNTER.with_label_values(&[status.as_str()]).inc();
    PROBE_DURATION
        .with_label_values(&[status.as_str()])
        .observe(elapsed.as_secs_f64() * 1000.0);
}

pub fn set_indicator(target: &str, state: IndicatorStatus) {
    let value = match state {
        IndicatorStatus::Online => 1,
        IndicatorStatus::Offline => 0,
        IndicatorStatus::Checking => -1,
        IndicatorStatus::Disabled => -2,
    };
    INDICATOR_STATE.with_label_values(&[target]).set(value);
}

pub fn forget_indicator(target: &str) {
    let _ = INDICATOR_STATE.remove_label_values(&[target]);
}

/// Text exposition of everything registered so far.
pub fn render() -> Result<(String, Vec<u8>), prometheus::Error> {
    // touch the lazies so the families show up before the first probe
    Lazy::force(&PROBE_COUNTER);
    Lazy::force(&PROBE_DURATION);
    Lazy::force(&INDICATOR_STATE);

    let encoder = TextEncoder::new();
    let mut buf = Vec::new();
    encoder.encode(&REGISTRY.gather(), &mut buf)?;
    Ok((encoder.format_type().to_string(), buf))
}

pub async fn serve_metrics(addr: SocketAddr) {
    let metrics_route = warp::path!("metrics").and(warp::get()).map(|| {
        let response = match render() {
            Ok((content_type, body)) => warp::http::Response::builder()
                .header("Content-Type", content_type)
                .body(body),
            Err(e) => {
                error!("encoding metrics failed: {:?}", e);
                warp::http::Response::builder()
                    .status(StatusCode::INTERNAL_SERVER_ERROR)
                    .body(Vec::new())
            }
        };
        response.unwrap_or_else(|_| warp::http::Response::new(Vec::new()))
    });

    warp::serve(metrics_route).run(addr).await;
}
