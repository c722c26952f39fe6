//! URL validation and page fetching.
//!
//! Validation runs before any network call and rejects targets that could
//! reach internal infrastructure (SSRF guard): non-http(s) schemes and
//! hosts that are loopback, private, or link-local addresses.

use crate::config::ImporterConfig;
use crate::error::ImportError;
use log::debug;
use reqwest::Client;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::time::Duration;
use url::{Host, Url};

pub struct Fetcher {
    client: Client,
    allow_private_hosts: bool,
}

/// Validate a URL string for fetching. Returns the parsed URL or a
/// `BadRequest` naming what was wrong.
pub fn validate_url(raw: &str) -> Result<Url, ImportError> {
    validate_url_with(raw, false)
}

fn validate_url_with(raw: &str, allow_private_hosts: bool) -> Result<Url, ImportError> {
    let url = Url::parse(raw)
        .map_err(|e| ImportError::BadRequest(format!("invalid URL '{raw}': {e}")))?;

    match url.scheme() {
        "http" | "https" => {}
        other => {
            return Err(ImportError::BadRequest(format!(
                "unsupported URL scheme '{other}'"
            )))
        }
    }

    if allow_private_hosts {
        return Ok(url);
    }

    match url.host() {
        None => return Err(ImportError::BadRequest("URL has no host".to_string())),
        Some(Host::Domain(domain)) => {
            if domain.eq_ignore_ascii_case("localhost") {
                return Err(ImportError::BadRequest(
                    "refusing to fetch localhost".to_string(),
                ));
            }
        }
        Some(Host::Ipv4(addr)) => {
            if is_private_v4(addr) {
                return Err(ImportError::BadRequest(format!(
                    "refusing to fetch private address {addr}"
                )));
            }
        }
        Some(Host::Ipv6(addr)) => {
            if is_private_v6(addr) {
                return Err(ImportError::BadRequest(format!(
                    "refusing to fetch private address {addr}"
                )));
            }
        }
    }

    Ok(url)
}

fn is_private_v4(addr: Ipv4Addr) -> bool {
    let octets = addr.octets();
    addr.is_loopback()
        || addr.is_private()
        || addr.is_link_local()
        || addr.is_unspecified()
        || octets[0] == 0
}

fn is_private_v6(addr: Ipv6Addr) -> bool {
    if addr.is_loopback() || addr.is_unspecified() {
        return true;
    }
    // IPv4-mapped addresses carry the embedded address's reachability
    if let Some(mapped) = addr.to_ipv4_mapped() {
        return is_private_v4(mapped);
    }
    let segments = addr.segments();
    // fc00::/7 unique-local, fe80::/10 link-local
    (segments[0] & 0xfe00) == 0xfc00 || (segments[0] & 0xffc0) == 0xfe80
}

/// IP-literal check shared with callers that resolve hostnames themselves.
pub fn is_private_ip(addr: IpAddr) -> bool {
    match addr {
        IpAddr::V4(v4) => is_private_v4(v4),
        IpAddr::V6(v6) => is_private_v6(v6),
    }
}

/// Resolve a domain and reject it if any of its addresses is private.
/// IP literals are caught by `validate_url` before any network touch; this
/// closes the remaining gap where a DNS name points at internal ranges.
async fn reject_private_resolution(domain: &str, port: u16) -> Result<(), ImportError> {
    let addrs = tokio::net::lookup_host((domain, port))
        .await
        .map_err(|e| ImportError::Fetch(format!("failed to resolve host '{domain}': {e}")))?;

    for addr in addrs {
        if is_private_ip(addr.ip()) {
            return Err(ImportError::BadRequest(format!(
                "refusing to fetch '{domain}': resolves to private address {}",
                addr.ip()
            )));
        }
    }
    Ok(())
}

impl Fetcher {
    pub fn new(config: &ImporterConfig) -> Result<Self, ImportError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()?;
        Ok(Self {
            client,
            allow_private_hosts: config.allow_private_hosts,
        })
    }

    /// Validate and fetch a page, returning its body text. Non-2xx
    /// responses and timeouts surface as `ImportError::Fetch`.
    pub async fn fetch(&self, raw_url: &str) -> Result<String, ImportError> {
        let url = validate_url_with(raw_url, self.allow_private_hosts)?;

        if !self.allow_private_hosts {
            if let Some(Host::Domain(domain)) = url.host() {
                let port = url.port_or_known_default().unwrap_or(443);
                reject_private_resolution(domain, port).await?;
            }
        }

        debug!("fetching {url}");

        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                ImportError::Fetch(format!("request timed out: {e}"))
            } else {
                ImportError::Fetch(format!("request failed: {e}"))
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ImportError::Fetch(format!(
                "fetch returned status {status}"
            )));
        }

        response
            .text()
            .await
            .map_err(|e| ImportError::Fetch(format!("failed to read body: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_public_urls() {
        assert!(validate_url("https://example.com/recipe").is_ok());
        assert!(validate_url("http://8.8.8.8/page").is_ok());
    }

    #[test]
    fn test_rejects_malformed() {
        assert!(validate_url("not a url").is_err());
        assert!(validate_url("").is_err());
    }

    #[test]
    fn test_rejects_non_http_schemes() {
        assert!(validate_url("ftp://example.com/file").is_err());
        assert!(validate_url("file:///etc/passwd").is_err());
    }

    #[test]
    fn test_rejects_loopback_and_private() {
        assert!(validate_url("http://localhost/admin").is_err());
        assert!(validate_url("http://127.0.0.1:8080/").is_err());
        assert!(validate_url("http://10.0.0.5/").is_err());
        assert!(validate_url("http://172.16.1.1/").is_err());
        assert!(validate_url("http://192.168.1.1/").is_err());
        assert!(validate_url("http://169.254.169.254/latest/meta-data").is_err());
        assert!(validate_url("http://[::1]/").is_err());
        assert!(validate_url("http://[fe80::1]/").is_err());
        assert!(validate_url("http://[fc00::1]/").is_err());
    }

    #[test]
    fn test_is_private_ip() {
        assert!(is_private_ip("127.0.0.1".parse().unwrap()));
        assert!(is_private_ip("10.1.2.3".parse().unwrap()));
        assert!(is_private_ip("::1".parse().unwrap()));
        assert!(is_private_ip("::ffff:192.168.0.1".parse().unwrap()));
        assert!(!is_private_ip("93.184.216.34".parse().unwrap()));
        assert!(!is_private_ip("2606:2800:220:1::1".parse().unwrap()));
    }

    #[test]
    fn test_rejection_is_bad_request() {
        let err = validate_url("http://127.0.0.1/").unwrap_err();
        assert_eq!(err.status_code(), 400);
    }

    fn local_test_config() -> ImporterConfig {
        ImporterConfig {
            allow_private_hosts: true,
            ..ImporterConfig::default()
        }
    }

    #[tokio::test]
    async fn test_fetch_non_2xx_is_fetch_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/missing")
            .with_status(404)
            .create_async()
            .await;

        let fetcher = Fetcher::new(&local_test_config()).unwrap();
        let result = fetcher.fetch(&format!("{}/missing", server.url())).await;
        assert!(matches!(result, Err(ImportError::Fetch(_))));
    }

    #[tokio::test]
    async fn test_fetch_rejects_private_host_by_default() {
        let fetcher = Fetcher::new(&ImporterConfig::default()).unwrap();
        let result = fetcher.fetch("http://127.0.0.1:1/page").await;
        assert!(matches!(result, Err(ImportError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_domain_resolving_to_loopback_is_rejected() {
        // "localhost" resolves to 127.0.0.1 via the system resolver on any
        // sane host, exercising the post-DNS guard without external DNS
        let result = reject_private_resolution("localhost", 80).await;
        assert!(matches!(result, Err(ImportError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_fetch_returns_body() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/page")
            .with_status(200)
            .with_body("<html>hello</html>")
            .create_async()
            .await;

        let fetcher = Fetcher::new(&local_test_config()).unwrap();
        let body = fetcher
            .fetch(&format!("{}/page", server.url()))
            .await
            .unwrap();
        assert!(body.contains("hello"));
    }
}
