use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkStatus {
    Ok,
    Redirect,
    Broken,
    Timeout,
}

impl LinkStatus {
    /// Broken and timed out links are the ones worth reporting.
    pub fn is_problem(&self) -> bool {
        matches!(self, LinkStatus::Broken | LinkStatus::Timeout)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LinkStatus::Ok => "ok",
            LinkStatus::Redirect => "redirect",
            LinkStatus::Broken => "broken",
            LinkStatus::Timeout => "timeout",
        }
    }
}

impl fmt::Display for LinkStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkType {
    Internal,
    External,
}

impl LinkType {
    pub fn as_str(&self) -> &'static str {
        match self {
            LinkType::Internal => "internal",
            LinkType::External => "external",
        }
    }
}

impl fmt::Display for LinkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of checking one distinct link found during a crawl.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkResult {
    pub link_url: String,
    /// First page the link was seen on.
    pub source_page: String,
    pub status_code: Option<u16>,
    pub status: LinkStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redirect_to: Option<String>,
    pub anchor_text: String,
    pub link_type: LinkType,
    pub checked_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlOutcome {
    pub results: Vec<LinkResult>,
    pub pages_scanned: usize,
}

impl CrawlOutcome {
    pub fn broken_count(&self) -> usize {
        self.results.iter().filter(|r| r.status.is_problem()).count()
    }

    pub fn redirect_count(&self) -> usize {
        self.results
            .iter()
            .filter(|r| r.status == LinkStatus::Redirect)
            .count()
    }
}
