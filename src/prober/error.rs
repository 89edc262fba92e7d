use std::fmt::Write;
use thiserror::Error;

/// Everything that can keep a probe from getting an HTTP status back.
///
/// The `Display` output is what ends up in `ProbeResult::error`, so it has to
/// read well on its own.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("unsupported URL scheme: {0}")]
    UnsupportedScheme(String),

    #[error("URL has no host")]
    MissingHost,

    #[error("request timeout")]
    Timeout,

    #[error("{}", report(.0))]
    Transport(reqwest::Error),
}

impl ProbeError {
    /// reqwest reports its own timeouts separately from ours; both mean the same thing here.
    pub fn from_transport(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ProbeError::Timeout
        } else {
            ProbeError::Transport(err)
        }
    }
}

/// Flattens an error and its `source()` chain into one line.
fn report(mut err: &(dyn std::error::Error + 'static)) -> String {
    let mut s = err.to_string();
    while let Some(src) = err.source() {
        let _ = write!(s, ": {}", src);
        err = src;
    }
    s
}
