use scraper::{Html, Selector};
use std::sync::LazyLock;

static ANCHOR_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a[href]").expect("anchor selector is valid"));

/// An `<a href>` as it appears in the document, before any URL resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Anchor {
    pub href: String,
    pub text: String,
}

/// Collects every anchor with an href, in document order.
///
/// Anchor text is the trimmed visible text of the element, cut to
/// `text_limit` characters.
pub fn extract_anchors(html: &str, text_limit: usize) -> Vec<Anchor> {
    let document = Html::parse_document(html);

    document
        .select(&ANCHOR_SELECTOR)
        .filter_map(|element| {
            let href = element.value().attr("href")?;
            let text: String = element.text().collect();
            Some(Anchor {
                href: href.to_string(),
                text: truncate_chars(text.trim(), text_limit),
            })
        })
        .collect()
}

fn truncate_chars(text: &str, limit: usize) -> String {
    text.chars().take(limit).collect()
}
