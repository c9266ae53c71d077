use crate::config::CrawlConfig;
use crate::error::Result;
use crate::result::LinkStatus;
use reqwest::Client;
use reqwest::header::LOCATION;
use tracing::debug;
use url::Url;

/// Outcome of a single liveness probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Probe {
    pub status_code: Option<u16>,
    pub status: LinkStatus,
    pub redirect_to: Option<String>,
}

impl Probe {
    pub fn unreachable() -> Self {
        Self {
            status_code: None,
            status: LinkStatus::Timeout,
            redirect_to: None,
        }
    }
}

/// Maps an HTTP answer onto a link status. `location` is only kept for
/// redirects.
pub fn classify_status(code: u16, location: Option<&str>) -> Probe {
    let status = match code {
        200..=299 => LinkStatus::Ok,
        300..=399 => LinkStatus::Redirect,
        _ => LinkStatus::Broken,
    };

    let redirect_to = match status {
        LinkStatus::Redirect => location.map(String::from),
        _ => None,
    };

    Probe {
        status_code: Some(code),
        status,
        redirect_to,
    }
}

/// Issues HEAD probes without following redirects, so a 3xx is observed
/// rather than chased.
pub struct LinkChecker {
    client: Client,
}

impl LinkChecker {
    pub fn new(config: &CrawlConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.probe_timeout)
            .redirect(reqwest::redirect::Policy::none())
            .build()?;

        Ok(Self { client })
    }

    pub async fn check(&self, link_url: &str) -> Probe {
        match self.client.head(link_url).send().await {
            Ok(response) => {
                let code = response.status().as_u16();
                let location = response
                    .headers()
                    .get(LOCATION)
                    .and_then(|v| v.to_str().ok())
                    .map(|loc| resolve_location(link_url, loc));

                debug!("Probed {} -> {}", link_url, code);
                classify_status(code, location.as_deref())
            }
            Err(e) => {
                debug!("Probe failed for {}: {}", link_url, e);
                Probe::unreachable()
            }
        }
    }
}

/// Relative `Location` values are made absolute against the probed URL.
fn resolve_location(link_url: &str, location: &str) -> String {
    Url::parse(link_url)
        .and_then(|base| base.join(location))
        .map(|u| u.to_string())
        .unwrap_or_else(|_| location.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{method, path},
    };

    #[test]
    fn test_classify_success_range() {
        assert_eq!(classify_status(200, None).status, LinkStatus::Ok);
        assert_eq!(classify_status(204, None).status, LinkStatus::Ok);
        assert_eq!(classify_status(299, None).status, LinkStatus::Ok);
    }

    #[test]
    fn test_classify_redirect_range() {
        let probe = classify_status(301, Some("https://example.com/new"));
        assert_eq!(probe.status, LinkStatus::Redirect);
        assert_eq!(probe.status_code, Some(301));
        assert_eq!(probe.redirect_to.as_deref(), Some("https://example.com/new"));

        let probe = classify_status(304, None);
        assert_eq!(probe.status, LinkStatus::Redirect);
        assert!(probe.redirect_to.is_none());
    }

    #[test]
    fn test_classify_error_range() {
        assert_eq!(classify_status(400, None).status, LinkStatus::Broken);
        assert_eq!(classify_status(404, None).status, LinkStatus::Broken);
        assert_eq!(classify_status(503, None).status, LinkStatus::Broken);
    }

    #[test]
    fn test_location_ignored_outside_redirects() {
        let probe = classify_status(200, Some("https://example.com/elsewhere"));
        assert!(probe.redirect_to.is_none());
    }

    #[test]
    fn test_resolve_relative_location() {
        assert_eq!(
            resolve_location("https://example.com/docs/old", "new"),
            "https://example.com/docs/new"
        );
        assert_eq!(
            resolve_location("https://example.com/a", "https://other.com/b"),
            "https://other.com/b"
        );
    }

    fn checker(timeout: Duration) -> LinkChecker {
        LinkChecker::new(&CrawlConfig::new().with_probe_timeout(timeout)).unwrap()
    }

    #[tokio::test]
    async fn test_probe_uses_head_and_reports_ok() {
        let mock_server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .and(path("/alive"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&mock_server)
            .await;

        let probe = checker(Duration::from_secs(2))
            .check(&format!("{}/alive", mock_server.uri()))
            .await;

        assert_eq!(probe.status, LinkStatus::Ok);
        assert_eq!(probe.status_code, Some(200));
    }

    #[tokio::test]
    async fn test_probe_does_not_follow_redirects() {
        let mock_server = MockServer::start().await;
        let target = format!("{}/new", mock_server.uri());
        Mock::given(method("HEAD"))
            .and(path("/old"))
            .respond_with(ResponseTemplate::new(302).insert_header("location", target.as_str()))
            .mount(&mock_server)
            .await;
        Mock::given(method("HEAD"))
            .and(path("/new"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&mock_server)
            .await;

        let probe = checker(Duration::from_secs(2))
            .check(&format!("{}/old", mock_server.uri()))
            .await;

        assert_eq!(probe.status, LinkStatus::Redirect);
        assert_eq!(probe.status_code, Some(302));
        assert_eq!(probe.redirect_to, Some(target));
    }

    #[tokio::test]
    async fn test_probe_reports_broken() {
        let mock_server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .and(path("/gone"))
            .respond_with(ResponseTemplate::new(410))
            .mount(&mock_server)
            .await;

        let probe = checker(Duration::from_secs(2))
            .check(&format!("{}/gone", mock_server.uri()))
            .await;

        assert_eq!(probe.status, LinkStatus::Broken);
        assert_eq!(probe.status_code, Some(410));
    }

    #[tokio::test]
    async fn test_probe_timeout() {
        let mock_server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
            .mount(&mock_server)
            .await;

        let probe = checker(Duration::from_millis(200))
            .check(&format!("{}/slow", mock_server.uri()))
            .await;

        assert_eq!(probe, Probe::unreachable());
    }

    #[tokio::test]
    async fn test_unsupported_scheme_is_unreachable() {
        let probe = checker(Duration::from_millis(200))
            .check("ftp://files.example.com/a.txt")
            .await;
        assert_eq!(probe.status, LinkStatus::Timeout);
        assert!(probe.status_code.is_none());
    }
}
