use std::fmt;
use std::future::Future;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::timestamp;

pub mod error;
pub mod http;

pub use http::HttpProber;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Online,
    Offline,
}

impl Status {
    pub fn as_str(self) -> &'static str {
        match self {
            Status::Online => "online",
            Status::Offline => "offline",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reachability policy: anything the server actually answered below 500 counts
/// as online, including redirects and client errors.
///
/// Note that a 4xx means "the server is up", not "the resource exists".
pub fn classify(code: reqwest::StatusCode) -> Status {
    if code.as_u16() < 500 {
        Status::Online
    } else {
        Status::Offline
    }
}

/// Outcome of one probe. Built once, never changed.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProbeResult {
    url: String,
    status: Status,
    #[serde(serialize_with = "timestamp::serialize_iso8601")]
    checked_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl ProbeResult {
    /// The server answered; `status` is whatever `classify` made of it.
    pub fn answered(url: impl Into<String>, status: Status) -> Self {
        Self {
            url: url.into(),
            status,
            checked_at: timestamp::now(),
            error: None,
        }
    }

    /// The probe never got a status back.
    pub fn failed(url: impl Into<String>, error: impl fmt::Display) -> Self {
        Self {
            url: url.into(),
            status: Status::Offline,
            checked_at: timestamp::now(),
            error: Some(error.to_string()),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

/// Anything that can turn a URL into a `ProbeResult`.
///
/// Implementations must not fail: every problem ends up as an offline result.
pub trait Probe: Send + Sync {
    fn probe(&self, url: &str) -> impl Future<Output = ProbeResult> + Send;
}
