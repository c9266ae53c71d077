use crate::checker::{LinkChecker, Probe};
use crate::config::CrawlConfig;
use crate::frontier::{LinkEntry, LinkMap};
use crate::result::{LinkResult, LinkStatus, LinkType};
use chrono::Utc;
use futures::stream::{self, StreamExt};
use std::collections::HashSet;

/// Phase two: one result per link map entry, in discovery order.
///
/// Internal links that were themselves crawled successfully are reported ok
/// without a probe. Everything else is probed with at most
/// `probe_concurrency` requests in flight. `on_progress` sees the running
/// result count after every result.
pub async fn check_links<F>(
    link_map: LinkMap,
    reachable: &HashSet<String>,
    checker: &LinkChecker,
    config: &CrawlConfig,
    mut on_progress: F,
) -> Vec<LinkResult>
where
    F: FnMut(usize),
{
    let probe_delay = config.probe_delay;
    let mut results = Vec::with_capacity(link_map.len());

    let mut pending = stream::iter(link_map.into_entries())
        .map(|(url, entry)| async move {
            if is_known_good(&url, &entry, reachable) {
                return into_result(url, entry, known_good());
            }

            let probe = checker.check(&url).await;
            if !probe_delay.is_zero() {
                tokio::time::sleep(probe_delay).await;
            }
            into_result(url, entry, probe)
        })
        .buffered(config.probe_concurrency.max(1));

    while let Some(result) = pending.next().await {
        results.push(result);
        on_progress(results.len());
    }

    results
}

fn is_known_good(url: &str, entry: &LinkEntry, reachable: &HashSet<String>) -> bool {
    entry.link_type == LinkType::Internal && reachable.contains(url)
}

fn known_good() -> Probe {
    Probe {
        status_code: Some(200),
        status: LinkStatus::Ok,
        redirect_to: None,
    }
}

fn into_result(link_url: String, entry: LinkEntry, probe: Probe) -> LinkResult {
    LinkResult {
        link_url,
        source_page: entry.source_page,
        status_code: probe.status_code,
        status: probe.status,
        redirect_to: probe.redirect_to,
        anchor_text: entry.anchor_text,
        link_type: entry.link_type,
        checked_at: Utc::now(),
    }
}
