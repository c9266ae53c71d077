use crate::error::{Result, ScanError};
use crate::result::LinkType;
use url::Url;

const SKIPPED_SCHEMES: [&str; 3] = ["mailto:", "javascript:", "tel:"];

/// Parses the root URL of a crawl. The root must carry a host, since every
/// link is classified against it.
pub fn parse_root(root_url: &str) -> Result<Url> {
    let mut url = Url::parse(root_url.trim())
        .map_err(|e| ScanError::InvalidUrl(format!("{}: {}", root_url, e)))?;

    if url.host_str().is_none() {
        return Err(ScanError::InvalidUrl(format!("{}: URL has no host", root_url)));
    }

    url.set_fragment(None);
    Ok(url)
}

/// Resolves an href found on `page_url` to an absolute, fragment-free URL.
///
/// Returns `None` for hrefs that are not worth checking: empty, pure
/// fragments, `mailto:`, `javascript:` and `tel:` links, and anything that
/// fails to resolve.
pub fn normalize_href(href: &str, page_url: &Url) -> Option<Url> {
    let href = href.trim();
    if href.is_empty() || href.starts_with('#') || has_skipped_scheme(href) {
        return None;
    }

    let mut resolved = page_url.join(href).ok()?;
    resolved.set_fragment(None);
    Some(resolved)
}

fn has_skipped_scheme(href: &str) -> bool {
    SKIPPED_SCHEMES.iter().any(|scheme| {
        href.get(..scheme.len())
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case(scheme))
    })
}

/// Internal means the exact same hostname as the root. Ports and
/// subdomains are not considered.
pub fn classify(url: &Url, root_host: &str) -> LinkType {
    match url.host_str() {
        Some(host) if host.eq_ignore_ascii_case(root_host) => LinkType::Internal,
        _ => LinkType::External,
    }
}
