use crate::config::CrawlConfig;
use crate::extract::{Anchor, extract_anchors};
use crate::fetch::PageFetcher;
use crate::normalize::{classify, normalize_href};
use crate::result::LinkType;
use std::collections::{HashMap, HashSet, VecDeque};
use tracing::{debug, info, warn};
use url::Url;

/// Where a link was first seen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkEntry {
    pub source_page: String,
    pub anchor_text: String,
    pub link_type: LinkType,
}

/// Links keyed by normalized URL, iterated in discovery order.
#[derive(Debug, Default)]
pub struct LinkMap {
    entries: Vec<(String, LinkEntry)>,
    index: HashMap<String, usize>,
}

impl LinkMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// First writer wins. Returns false when the URL was already present.
    pub fn insert_if_absent(&mut self, url: String, entry: LinkEntry) -> bool {
        if self.index.contains_key(&url) {
            return false;
        }
        self.index.insert(url.clone(), self.entries.len());
        self.entries.push((url, entry));
        true
    }

    pub fn get(&self, url: &str) -> Option<&LinkEntry> {
        self.index.get(url).map(|&i| &self.entries[i].1)
    }

    pub fn contains(&self, url: &str) -> bool {
        self.index.contains_key(url)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &LinkEntry)> {
        self.entries.iter().map(|(url, entry)| (url.as_str(), entry))
    }

    pub fn into_entries(self) -> Vec<(String, LinkEntry)> {
        self.entries
    }
}

/// Mutable state of one crawl. Created at crawl start and dropped when the
/// crawl returns.
#[derive(Debug)]
pub struct CrawlState {
    /// Every page the frontier attempted to fetch.
    pub visited: HashSet<String>,
    /// Pages that answered 2xx at the requested URL.
    pub reachable: HashSet<String>,
    pub frontier: VecDeque<Url>,
    queued: HashSet<String>,
    /// Pages already fetched as the target of a followed redirect.
    landed: HashSet<String>,
    pub link_map: LinkMap,
    root_host: String,
}

impl CrawlState {
    pub fn new(root: &Url) -> Self {
        let mut state = Self {
            visited: HashSet::new(),
            reachable: HashSet::new(),
            frontier: VecDeque::new(),
            queued: HashSet::new(),
            landed: HashSet::new(),
            link_map: LinkMap::new(),
            root_host: root.host_str().unwrap_or_default().to_string(),
        };
        state.enqueue(root.clone());
        state
    }

    fn enqueue(&mut self, url: Url) {
        if self.visited.contains(url.as_str()) || !self.queued.insert(url.to_string()) {
            return;
        }
        self.frontier.push_back(url);
    }

    /// Next page to fetch, or `None` once the budget is spent or the queue is
    /// drained. Marks the page visited.
    pub fn next_page(&mut self, max_pages: usize) -> Option<Url> {
        while self.visited.len() < max_pages {
            let url = self.frontier.pop_front()?;
            if self.landed.contains(url.as_str()) {
                debug!("Skipping {}, already fetched through a redirect", url);
                continue;
            }
            if self.visited.insert(url.to_string()) {
                return Some(url);
            }
        }
        None
    }

    /// Records the page a followed redirect ended on so the frontier does not
    /// fetch it again. The landing page does not count against the budget.
    pub fn record_landing(&mut self, final_url: &Url, success: bool) {
        let key = final_url.to_string();
        if self.visited.contains(&key) {
            return;
        }
        if success {
            self.reachable.insert(key.clone());
        }
        self.queued.insert(key.clone());
        self.landed.insert(key);
    }

    /// Folds the anchors of one page into the link map and queues internal
    /// pages that have not been visited yet.
    pub fn record_anchors(&mut self, page_url: &Url, anchors: Vec<Anchor>) {
        for anchor in anchors {
            let Some(link) = normalize_href(&anchor.href, page_url) else {
                continue;
            };
            let link_type = classify(&link, &self.root_host);
            let key = link.to_string();

            let added = self.link_map.insert_if_absent(
                key,
                LinkEntry {
                    source_page: page_url.to_string(),
                    anchor_text: anchor.text,
                    link_type,
                },
            );
            if added {
                debug!("Found {} link {} on {}", link_type, link, page_url);
            }

            if link_type == LinkType::Internal {
                self.enqueue(link);
            }
        }
    }
}

/// Phase one: breadth-first discovery over internal pages.
///
/// Page failures of any kind leave the page visited but unexpanded.
pub async fn discover(fetcher: &PageFetcher, config: &CrawlConfig, root: &Url) -> CrawlState {
    let mut state = CrawlState::new(root);
    let mut first = true;

    while let Some(page_url) = state.next_page(config.max_pages) {
        if !first && !config.page_delay.is_zero() {
            tokio::time::sleep(config.page_delay).await;
        }
        first = false;

        match fetcher.fetch(&page_url).await {
            Ok(page) => {
                if page.is_reachable() {
                    state.reachable.insert(page_url.to_string());
                } else if page.redirected
                    && classify(&page.final_url, &state.root_host) == LinkType::Internal
                {
                    let success = (200..300).contains(&page.status_code);
                    state.record_landing(&page.final_url, success);
                }
                // A redirect may land off-site; only internal pages are expanded.
                if let Some(html) = page.html
                    && classify(&page.final_url, &state.root_host) == LinkType::Internal
                {
                    let anchors = extract_anchors(&html, config.anchor_text_limit);
                    state.record_anchors(&page.final_url, anchors);
                }
            }
            Err(e) => {
                warn!("Failed to fetch {}: {}", page_url, e);
            }
        }
    }

    info!(
        "Discovery finished: {} pages visited, {} links found",
        state.visited.len(),
        state.link_map.len()
    );
    state
}

#[cfg(test)]
mod tests {
    use super::*;

    fn anchor(href: &str, text: &str) -> Anchor {
        Anchor {
            href: href.to_string(),
            text: text.to_string(),
        }
    }

    fn root() -> Url {
        Url::parse("https://example.com/").unwrap()
    }

    #[test]
    fn test_link_map_keeps_first_entry() {
        let mut map = LinkMap::new();
        let first = LinkEntry {
            source_page: "https://example.com/".to_string(),
            anchor_text: "first".to_string(),
            link_type: LinkType::Internal,
        };
        let second = LinkEntry {
            anchor_text: "second".to_string(),
            ..first.clone()
        };

        assert!(map.insert_if_absent("https://example.com/a".to_string(), first));
        assert!(!map.insert_if_absent("https://example.com/a".to_string(), second));
        assert_eq!(map.len(), 1);
        assert_eq!(map.get("https://example.com/a").unwrap().anchor_text, "first");
    }

    #[test]
    fn test_link_map_iterates_in_insertion_order() {
        let mut map = LinkMap::new();
        for path in ["c", "a", "b"] {
            map.insert_if_absent(
                format!("https://example.com/{}", path),
                LinkEntry {
                    source_page: "https://example.com/".to_string(),
                    anchor_text: path.to_string(),
                    link_type: LinkType::Internal,
                },
            );
        }
        let order: Vec<_> = map.iter().map(|(_, e)| e.anchor_text.as_str()).collect();
        assert_eq!(order, vec!["c", "a", "b"]);
    }

    #[test]
    fn test_root_is_first_in_frontier() {
        let mut state = CrawlState::new(&root());
        assert_eq!(state.next_page(10).unwrap().as_str(), "https://example.com/");
        assert!(state.next_page(10).is_none());
        assert_eq!(state.visited.len(), 1);
    }

    #[test]
    fn test_fragment_variants_fold_into_one_entry() {
        let mut state = CrawlState::new(&root());
        let page = state.next_page(10).unwrap();
        state.record_anchors(
            &page,
            vec![anchor("/page#a", "Alpha"), anchor("/page#b", "Beta")],
        );

        assert_eq!(state.link_map.len(), 1);
        let entry = state.link_map.get("https://example.com/page").unwrap();
        assert_eq!(entry.anchor_text, "Alpha");
        assert_eq!(state.frontier.len(), 1);
    }

    #[test]
    fn test_external_links_are_recorded_not_queued() {
        let mut state = CrawlState::new(&root());
        let page = state.next_page(10).unwrap();
        state.record_anchors(
            &page,
            vec![anchor("https://rust-lang.org/", "Rust"), anchor("/about", "About")],
        );

        assert_eq!(state.link_map.len(), 2);
        assert_eq!(
            state.link_map.get("https://rust-lang.org/").unwrap().link_type,
            LinkType::External
        );
        let queued: Vec<_> = state.frontier.iter().map(|u| u.path().to_string()).collect();
        assert_eq!(queued, vec!["/about"]);
    }

    #[test]
    fn test_visited_pages_are_not_requeued() {
        let mut state = CrawlState::new(&root());
        let page = state.next_page(10).unwrap();
        state.record_anchors(&page, vec![anchor("/", "Home")]);

        assert!(state.frontier.is_empty());
        assert!(state.link_map.contains("https://example.com/"));
    }

    #[test]
    fn test_skipped_hrefs_never_reach_link_map() {
        let mut state = CrawlState::new(&root());
        let page = state.next_page(10).unwrap();
        state.record_anchors(
            &page,
            vec![
                anchor("#top", "Top"),
                anchor("mailto:a@example.com", "Mail"),
                anchor("javascript:void(0)", "JS"),
                anchor("tel:123", "Call"),
                anchor("http://[::1", "Bad"),
            ],
        );
        assert!(state.link_map.is_empty());
    }

    #[test]
    fn test_budget_bounds_visited() {
        let mut state = CrawlState::new(&root());
        let page = state.next_page(2).unwrap();
        state.record_anchors(
            &page,
            vec![anchor("/a", "A"), anchor("/b", "B"), anchor("/c", "C")],
        );

        assert_eq!(state.next_page(2).unwrap().path(), "/a");
        assert!(state.next_page(2).is_none());
        assert_eq!(state.visited.len(), 2);
        assert_eq!(state.link_map.len(), 3);
    }

    #[test]
    fn test_redirect_landing_is_not_fetched_again() {
        let mut state = CrawlState::new(&root());
        let home = state.next_page(3).unwrap();
        state.record_anchors(
            &home,
            vec![anchor("/c", "C"), anchor("/d", "D"), anchor("/e", "E")],
        );

        let c = state.next_page(3).unwrap();
        assert_eq!(c.path(), "/c");
        let d = Url::parse("https://example.com/d").unwrap();
        state.record_landing(&d, true);
        state.record_anchors(&d, vec![anchor("/d", "Self")]);

        assert_eq!(state.next_page(3).unwrap().path(), "/e");
        assert!(state.next_page(3).is_none());
        assert_eq!(state.visited.len(), 3);
        assert!(!state.visited.contains("https://example.com/d"));
        assert!(state.reachable.contains("https://example.com/d"));
    }

    #[test]
    fn test_failed_redirect_landing_is_not_reachable() {
        let mut state = CrawlState::new(&root());
        state.next_page(10).unwrap();
        let gone = Url::parse("https://example.com/gone").unwrap();
        state.record_landing(&gone, false);

        assert!(!state.reachable.contains("https://example.com/gone"));
        state.record_anchors(&root(), vec![anchor("/gone", "Gone")]);
        assert!(state.frontier.is_empty());
    }

    #[test]
    fn test_breadth_first_order() {
        let mut state = CrawlState::new(&root());
        let home = state.next_page(10).unwrap();
        state.record_anchors(&home, vec![anchor("/a", "A"), anchor("/b", "B")]);

        let a = state.next_page(10).unwrap();
        state.record_anchors(&a, vec![anchor("/a/deep", "Deep")]);

        assert_eq!(state.next_page(10).unwrap().path(), "/b");
        assert_eq!(state.next_page(10).unwrap().path(), "/a/deep");
    }
}
