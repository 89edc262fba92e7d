use std::convert::Infallible;

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};
use warp::http::StatusCode;
use warp::{Filter, Rejection, Reply};

use crate::batch::probe_batch;
use crate::prober::{Probe, ProbeResult};

const MAX_BODY_BYTES: u64 = 1024 * 1024;

#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    success: bool,
    data: T,
}

impl<T> Envelope<T> {
    fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    success: bool,
    error: String,
}

/// Request-shape errors; the only thing that keeps a caller from getting an envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    MissingUrl,
    MissingUrls,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        StatusCode::BAD_REQUEST
    }

    pub fn message(&self) -> &'static str {
        match self {
            ApiError::MissingUrl => "URL is required",
            ApiError::MissingUrls => "URLs array is required",
        }
    }
}

impl warp::reject::Reject for ApiError {}

// Non-string values are checked as their JSON text, which never parses as an
// absolute URL, so they come back offline in their own slot.
fn url_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Pulls `url` out of a single-probe body. Only absent, null or empty is rejected.
pub fn parse_single(body: &Value) -> Result<String, ApiError> {
    match body.get("url") {
        None | Some(Value::Null) => Err(ApiError::MissingUrl),
        Some(Value::String(s)) if s.is_empty() => Err(ApiError::MissingUrl),
        Some(value) => Ok(url_text(value)),
    }
}

/// Pulls `urls` out of a batch body. An empty array is fine.
pub fn parse_batch(body: &Value) -> Result<Vec<String>, ApiError> {
    let items = body
        .get("urls")
        .and_then(Value::as_array)
        .ok_or(ApiError::MissingUrls)?;

    Ok(items.iter().map(url_text).collect())
}

pub async fn check_one<P: Probe>(prober: &P, body: &Value) -> Result<Envelope<ProbeResult>, ApiError> {
    let url = parse_single(body)?;
    let result = prober.probe(&url).await;
    debug!(url = result.url(), status = %result.status(), error = ?result.error(), "single check");
    Ok(Envelope::ok(result))
}

pub async fn check_many<P>(prober: &P, body: &Value) -> Result<Envelope<Vec<ProbeResult>>, ApiError>
where
    P: Probe + Clone + 'static,
{
    let urls = parse_batch(body)?;
    Ok(Envelope::ok(probe_batch(prober, urls).await))
}

pub fn routes<P>(prober: P) -> impl Filter<Extract = (impl Reply,), Error = Infallible> + Clone
where
    P: Probe + Clone + 'static,
{
    let with_prober = warp::any().map(move || prober.clone());
    let json_body = warp::body::content_length_limit(MAX_BODY_BYTES).and(warp::body::json::<Value>());

    let single = warp::path!("health-check")
        .and(warp::post())
        .and(with_prober.clone())
        .and(json_body.clone())
        .and_then(|prober: P, body: Value| async move {
            match check_one(&prober, &body).await {
                Ok(envelope) => Ok(warp::reply::json(&envelope)),
                Err(e) => Err(warp::reject::custom(e)),
            }
        });

    let batch = warp::path!("health-check" / "batch")
        .and(warp::post())
        .and(with_prober)
        .and(json_body)
        .and_then(|prober: P, body: Value| async move {
            match check_many(&prober, &body).await {
                Ok(envelope) => Ok(warp::reply::json(&envelope)),
                Err(e) => Err(warp::reject::custom(e)),
            }
        });

    single
        .or(batch)
        .recover(handle_rejection)
        .with(warp::log::custom(|req| {
            info!(
                method = %req.method(),
                path = req.path(),
                status = req.status().as_u16(),
                elapsed_ms = req.elapsed().as_millis() as u64,
                "request"
            );
        }))
}

async fn handle_rejection(err: Rejection) -> Result<impl Reply, Infallible> {
    let (status, message) = if let Some(e) = err.find::<ApiError>() {
        (e.status(), e.message().to_string())
    } else if err.find::<warp::filters::body::BodyDeserializeError>().is_some() {
        (StatusCode::BAD_REQUEST, "Invalid JSON body".to_string())
    } else if err.find::<warp::reject::PayloadTooLarge>().is_some() {
        (StatusCode::PAYLOAD_TOO_LARGE, "Request body too large".to_string())
    } else if err.find::<warp::reject::LengthRequired>().is_some() {
        (StatusCode::LENGTH_REQUIRED, "Content-Length is required".to_string())
    } else if err.find::<warp::reject::UnsupportedMediaType>().is_some() {
        (StatusCode::UNSUPPORTED_MEDIA_TYPE, "Expected a JSON body".to_string())
    } else if err.is_not_found() {
        (StatusCode::NOT_FOUND, "Not found".to_string())
    } else if err.find::<warp::reject::MethodNotAllowed>().is_some() {
        (StatusCode::METHOD_NOT_ALLOWED, "Method not allowed".to_string())
    } else {
        warn!("unhandled rejection: {:?}", err);
        (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
    };

    let body = ErrorBody {
        success: false,
        error: message,
    };
    Ok(warp::reply::with_status(warp::reply::json(&body), status))
}
