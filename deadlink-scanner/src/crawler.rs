use crate::aggregate::check_links;
use crate::checker::LinkChecker;
use crate::config::CrawlConfig;
use crate::error::Result;
use crate::fetch::PageFetcher;
use crate::frontier::discover;
use crate::normalize::parse_root;
use crate::result::CrawlOutcome;
use std::sync::Arc;
use tracing::info;

/// Called with the cumulative result count after every checked link.
pub type ProgressCallback = Arc<dyn Fn(usize) + Send + Sync>;

pub struct Crawler {
    fetcher: PageFetcher,
    checker: LinkChecker,
    config: CrawlConfig,
    progress_callback: Option<ProgressCallback>,
}

impl Crawler {
    pub fn new(config: CrawlConfig) -> Result<Self> {
        Ok(Self {
            fetcher: PageFetcher::new(&config)?,
            checker: LinkChecker::new(&config)?,
            config,
            progress_callback: None,
        })
    }

    pub fn with_progress_callback(mut self, callback: ProgressCallback) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    /// Crawls the site under `root_url` and checks every link found.
    ///
    /// Fails only when the root URL cannot be parsed, before any request is
    /// made. Every per-page and per-link failure ends up in the results.
    /// All crawl state is local to this call, so one `Crawler` can run many
    /// crawls at once.
    pub async fn crawl(&self, root_url: &str) -> Result<CrawlOutcome> {
        let root = parse_root(root_url)?;
        info!(
            "Starting crawl of {} (max {} pages)",
            root, self.config.max_pages
        );

        let state = discover(&self.fetcher, &self.config, &root).await;
        let pages_scanned = state.visited.len();

        let progress = self.progress_callback.clone();
        let results = check_links(
            state.link_map,
            &state.reachable,
            &self.checker,
            &self.config,
            |count| {
                if let Some(ref callback) = progress {
                    callback(count);
                }
            },
        )
        .await;

        info!(
            "Crawl of {} complete: {} pages, {} links checked",
            root,
            pages_scanned,
            results.len()
        );

        Ok(CrawlOutcome {
            results,
            pages_scanned,
        })
    }
}
