use std::time::Duration;

pub const DEFAULT_USER_AGENT: &str = "DeadLinkBot/1.0 (+https://deadlink.app/about)";

/// Tunables for a single crawl.
///
/// The defaults match what a one-off scan of a public site should use. Tests
/// shrink the delays and timeouts so scenarios run in milliseconds.
#[derive(Debug, Clone)]
pub struct CrawlConfig {
    /// Upper bound on the number of pages fetched during discovery.
    pub max_pages: usize,
    pub fetch_timeout: Duration,
    pub probe_timeout: Duration,
    /// Pause between successive page fetches.
    pub page_delay: Duration,
    /// Pause after each liveness probe that hit the network.
    pub probe_delay: Duration,
    /// How many probes may be in flight at once. 1 keeps probing sequential.
    pub probe_concurrency: usize,
    pub user_agent: String,
    /// Anchor text is cut to this many characters.
    pub anchor_text_limit: usize,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            max_pages: 20,
            fetch_timeout: Duration::from_secs(10),
            probe_timeout: Duration::from_secs(10),
            page_delay: Duration::from_millis(300),
            probe_delay: Duration::from_millis(200),
            probe_concurrency: 1,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            anchor_text_limit: 100,
        }
    }
}

impl CrawlConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_pages(mut self, max_pages: usize) -> Self {
        self.max_pages = max_pages;
        self
    }

    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    pub fn with_probe_timeout(mut self, timeout: Duration) -> Self {
        self.probe_timeout = timeout;
        self
    }

    /// Sets both fetch and probe timeouts.
    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_fetch_timeout(timeout).with_probe_timeout(timeout)
    }

    pub fn with_page_delay(mut self, delay: Duration) -> Self {
        self.page_delay = delay;
        self
    }

    pub fn with_probe_delay(mut self, delay: Duration) -> Self {
        self.probe_delay = delay;
        self
    }

    pub fn with_probe_concurrency(mut self, concurrency: usize) -> Self {
        self.probe_concurrency = concurrency.max(1);
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn with_anchor_text_limit(mut self, limit: usize) -> Self {
        self.anchor_text_limit = limit;
        self
    }
}
