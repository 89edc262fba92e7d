// URL -> network target resolution for probes.

use url::Url;

use crate::prober::error::ProbeError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transport {
    Plain,
    Tls,
}

impl Transport {
    fn from_scheme(scheme: &str) -> Result<Self, ProbeError> {
        match scheme {
            "https" => Ok(Transport::Tls),
            "http" => Ok(Transport::Plain),
            other => Err(ProbeError::UnsupportedScheme(other.to_string())),
        }
    }

    pub fn scheme(self) -> &'static str {
        match self {
            Transport::Plain => "http",
            Transport::Tls => "https",
        }
    }

    pub fn default_port(self) -> u16 {
        match self {
            Transport::Plain => 80,
            Transport::Tls => 443,
        }
    }
}

/// Where a probe actually connects: host, port and path, nothing else.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeTarget {
    pub transport: Transport,
    pub host: String,
    pub port: u16,
    pub path: String,
}

impl ProbeTarget {
    pub fn parse(input: &str) -> Result<Self, ProbeError> {
        let url = Url::parse(input)?;
        let transport = Transport::from_scheme(url.scheme())?;
        // Host's Display keeps the brackets around IPv6 literals
        let host = url.host().ok_or(ProbeError::MissingHost)?.to_string();
        let port = url.port().unwrap_or(transport.default_port());
        let path = match url.path() {
            "" => "/".to_string(),
            p => p.to_string(),
        };

        Ok(Self {
            transport,
            host,
            port,
            path,
        })
    }

    /// The URL handed to the HTTP client. Query and fragment are not sent.
    pub fn request_url(&self) -> String {
        format!(
            "{}://{}:{}{}",
            self.transport.scheme(),
            self.host,
            self.port,
            self.path
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_ports_follow_scheme() {
        let t = ProbeTarget::parse("https://example.com").unwrap();
        assert_eq!(t.transport, Transport::Tls);
        assert_eq!(t.port, 443);
        assert_eq!(t.path, "/");

        let t = ProbeTarget::parse("http://example.com").unwrap();
        assert_eq!(t.transport, Transport::Plain);
        assert_eq!(t.port, 80);
    }

    #[test]
    fn explicit_port_wins() {
        let t = ProbeTarget::parse("http://127.0.0.1:8080/status").unwrap();
        assert_eq!(t.host, "127.0.0.1");
        assert_eq!(t.port, 8080);
        assert_eq!(t.path, "/status");
        assert_eq!(t.request_url(), "http://127.0.0.1:8080/status");
    }

    #[test]
    fn query_and_fragment_are_dropped() {
        let t = ProbeTarget::parse("https://example.com/a/b?token=1#top").unwrap();
        assert_eq!(t.request_url(), "https://example.com:443/a/b");
    }

    #[test]
    fn ipv6_host_keeps_brackets() {
        let t = ProbeTarget::parse("http://[::1]:9000").unwrap();
        assert_eq!(t.request_url(), "http://[::1]:9000/");
    }

    #[test]
    fn unsupported_scheme_fails_fast() {
        match ProbeTarget::parse("ftp://example.com") {
            Err(ProbeError::UnsupportedScheme(s)) => assert_eq!(s, "ftp"),
            other => panic!("expected UnsupportedScheme, got {:?}", other),
        }
    }

    #[test]
    fn garbage_is_a_parse_error() {
        assert!(matches!(
            ProbeTarget::parse("definitely not a url"),
            Err(ProbeError::InvalidUrl(_))
        ));
    }
}
