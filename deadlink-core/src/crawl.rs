use chrono::{DateTime, Utc};
use deadlink_scanner::{CrawlConfig, CrawlOutcome, Crawler, LinkResult, LinkStatus};
use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::warn;
use uuid::Uuid;

/// Options for configuring a single site scan
pub struct ScanOptions {
    pub url: String,
    /// Identifier of the registered site. Ad-hoc scans get `instant_<report_id>`.
    pub site_id: Option<String>,
    pub config: CrawlConfig,
    pub show_progress_bars: bool,
}

/// Callback for reporting scan progress messages
pub type ScanProgressCallback = Arc<dyn Fn(String) + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportStatus {
    Running,
    Completed,
    Failed,
}

impl ReportStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportStatus::Running => "running",
            ReportStatus::Completed => "completed",
            ReportStatus::Failed => "failed",
        }
    }
}

/// The record a caller persists for one scan. Nothing here is stored by
/// deadlink itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanReport {
    pub report_id: Uuid,
    pub site_id: String,
    pub url: String,
    pub scanned_at: DateTime<Utc>,
    pub status: ReportStatus,
    pub total_links: usize,
    /// Broken and timed out links together.
    pub broken_links: usize,
    pub redirected_links: usize,
    pub pages_scanned: usize,
    pub duration_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub results: Vec<LinkResult>,
}

impl ScanReport {
    pub fn running(url: &str, site_id: Option<String>) -> Self {
        let report_id = Uuid::new_v4();
        Self {
            report_id,
            site_id: site_id.unwrap_or_else(|| format!("instant_{}", report_id)),
            url: url.to_string(),
            scanned_at: Utc::now(),
            status: ReportStatus::Running,
            total_links: 0,
            broken_links: 0,
            redirected_links: 0,
            pages_scanned: 0,
            duration_ms: 0,
            error: None,
            results: Vec::new(),
        }
    }

    pub fn complete(mut self, outcome: CrawlOutcome, duration: Duration) -> Self {
        self.status = ReportStatus::Completed;
        self.total_links = outcome.results.len();
        self.broken_links = outcome.broken_count();
        self.redirected_links = outcome.redirect_count();
        self.pages_scanned = outcome.pages_scanned;
        self.duration_ms = duration.as_millis() as u64;
        self.results = outcome.results;
        self
    }

    /// A failed report carries zero totals, as if no link had been seen.
    pub fn fail(mut self, error: impl ToString, duration: Duration) -> Self {
        self.status = ReportStatus::Failed;
        self.total_links = 0;
        self.broken_links = 0;
        self.redirected_links = 0;
        self.duration_ms = duration.as_millis() as u64;
        self.error = Some(error.to_string());
        self.results.clear();
        self
    }

    pub fn has_problems(&self) -> bool {
        self.broken_links > 0
    }

    pub fn problem_links(&self) -> impl Iterator<Item = &LinkResult> {
        self.results.iter().filter(|r| r.status.is_problem())
    }

    pub fn links_with_status(&self, status: LinkStatus) -> impl Iterator<Item = &LinkResult> {
        self.results.iter().filter(move |r| r.status == status)
    }
}

fn spinner(url: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_message(format!("Crawling {}...", url));
    pb
}

/// Execute one scan. Never fails: a scan that cannot start comes back as a
/// `failed` report.
pub async fn execute_scan(
    options: ScanOptions,
    progress_callback: Option<ScanProgressCallback>,
) -> ScanReport {
    let ScanOptions {
        url,
        site_id,
        config,
        show_progress_bars,
    } = options;

    let report = ScanReport::running(&url, site_id);
    let started = Instant::now();

    let progress_bar = show_progress_bars.then(|| Arc::new(spinner(&url)));

    let crawler = match Crawler::new(config) {
        Ok(crawler) => crawler,
        Err(e) => {
            warn!("Could not build crawler for {}: {}", url, e);
            if let Some(ref pb) = progress_bar {
                pb.finish_and_clear();
            }
            return report.fail(e, started.elapsed());
        }
    };

    let crawler = match progress_bar {
        Some(ref pb) => {
            let pb = pb.clone();
            crawler.with_progress_callback(Arc::new(move |count: usize| {
                pb.set_message(format!("Checking links... {} checked", count));
            }))
        }
        None => crawler,
    };

    let report = match crawler.crawl(&url).await {
        Ok(outcome) => report.complete(outcome, started.elapsed()),
        Err(e) => {
            if let Some(ref callback) = progress_callback {
                callback(format!("[!] Failed to scan {}: {}", url, e));
            }
            report.fail(e, started.elapsed())
        }
    };

    if let Some(ref pb) = progress_bar {
        match report.status {
            ReportStatus::Completed => pb.finish_with_message(format!(
                "Scanned {} pages, checked {} links",
                report.pages_scanned, report.total_links
            )),
            _ => pb.finish_and_clear(),
        }
    }

    report
}

/// Scan several sites one after the other. Each scan is independent and gets
/// its own report.
pub async fn execute_scans(
    urls: &[String],
    config: &CrawlConfig,
    show_progress_bars: bool,
    progress_callback: Option<ScanProgressCallback>,
) -> Vec<ScanReport> {
    let mut reports = Vec::with_capacity(urls.len());

    for (idx, url) in urls.iter().enumerate() {
        if let Some(ref callback) = progress_callback
            && urls.len() > 1
        {
            callback(format!("Scanning site {}/{}: {}", idx + 1, urls.len(), url));
        }

        let options = ScanOptions {
            url: url.clone(),
            site_id: None,
            config: config.clone(),
            show_progress_bars,
        };
        reports.push(execute_scan(options, progress_callback.clone()).await);
    }

    reports
}

#[cfg(test)]
mod tests {
    use super::*;
    use deadlink_scanner::LinkType;

    fn result(path: &str, status: LinkStatus, code: Option<u16>) -> LinkResult {
        LinkResult {
            link_url: format!("https://example.com{}", path),
            source_page: "https://example.com/".to_string(),
            status_code: code,
            status,
            redirect_to: None,
            anchor_text: path.to_string(),
            link_type: LinkType::Internal,
            checked_at: Utc::now(),
        }
    }

    #[test]
    fn test_running_report_defaults() {
        let report = ScanReport::running("https://example.com", None);
        assert_eq!(report.status, ReportStatus::Running);
        assert_eq!(report.site_id, format!("instant_{}", report.report_id));
        assert_eq!(report.total_links, 0);
    }

    #[test]
    fn test_running_report_keeps_site_id() {
        let report = ScanReport::running("https://example.com", Some("site-42".to_string()));
        assert_eq!(report.site_id, "site-42");
    }

    #[test]
    fn test_complete_counts_timeouts_as_broken() {
        let outcome = CrawlOutcome {
            results: vec![
                result("/a", LinkStatus::Ok, Some(200)),
                result("/b", LinkStatus::Broken, Some(404)),
                result("/c", LinkStatus::Timeout, None),
                result("/d", LinkStatus::Redirect, Some(301)),
            ],
            pages_scanned: 3,
        };

        let report = ScanReport::running("https://example.com", None)
            .complete(outcome, Duration::from_millis(1500));

        assert_eq!(report.status, ReportStatus::Completed);
        assert_eq!(report.total_links, 4);
        assert_eq!(report.broken_links, 2);
        assert_eq!(report.redirected_links, 1);
        assert_eq!(report.pages_scanned, 3);
        assert_eq!(report.duration_ms, 1500);
        assert!(report.has_problems());
        assert_eq!(report.problem_links().count(), 2);
    }

    #[test]
    fn test_fail_clears_totals() {
        let report = ScanReport::running("nope", None).fail("Invalid URL: nope", Duration::ZERO);
        assert_eq!(report.status, ReportStatus::Failed);
        assert_eq!(report.error.as_deref(), Some("Invalid URL: nope"));
        assert!(!report.has_problems());
        assert!(report.results.is_empty());
    }
}
