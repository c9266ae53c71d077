use crate::config::CrawlConfig;
use crate::error::Result;
use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use tracing::debug;
use url::Url;

/// What came back from fetching one page during discovery.
#[derive(Debug)]
pub struct FetchedPage {
    /// URL of the response after redirects.
    pub final_url: Url,
    pub status_code: u16,
    pub redirected: bool,
    /// Present only for 2xx responses with an HTML content type.
    pub html: Option<String>,
}

impl FetchedPage {
    /// A 2xx answer at the exact URL requested.
    pub fn is_reachable(&self) -> bool {
        !self.redirected && (200..300).contains(&self.status_code)
    }
}

pub struct PageFetcher {
    client: Client,
}

impl PageFetcher {
    pub fn new(config: &CrawlConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.fetch_timeout)
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()?;

        Ok(Self { client })
    }

    /// GETs a page. Transport failures and timeouts come back as errors for
    /// the frontier to swallow; HTTP error statuses are not errors.
    pub async fn fetch(&self, url: &Url) -> std::result::Result<FetchedPage, reqwest::Error> {
        debug!("Fetching page {}", url);

        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();
        let final_url = response.url().clone();
        let redirected = final_url != *url;

        let is_html = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|ct| ct.to_ascii_lowercase().contains("text/html"))
            .unwrap_or(false);

        let html = if status.is_success() && is_html {
            Some(response.text().await?)
        } else {
            debug!("Not expanding {} (status {}, html: {})", url, status, is_html);
            None
        };

        Ok(FetchedPage {
            final_url,
            status_code: status.as_u16(),
            redirected,
            html,
        })
    }
}
