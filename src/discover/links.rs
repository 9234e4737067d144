//! Anchor extraction and link pattern matching.

use regex::Regex;
use scraper::{Html, Selector};

/// Session folder links: a known numeric prefix plus a word label,
/// e.g. `13-alpha/`.
pub const SESSION_LINK_PATTERN: &str = r"^(13|14|15|16|17|18)-\w+/$";

/// Video file links: digits plus `.mp4`, e.g. `007.mp4`.
pub const VIDEO_LINK_PATTERN: &str = r"^\d+\.mp4$";

/// All anchor hrefs in a document, in document order.
pub fn extract_hrefs(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    let anchors = Selector::parse("a").expect("static selector");

    document
        .select(&anchors)
        .filter_map(|a| a.value().attr("href"))
        .map(str::to_string)
        .collect()
}

/// Hrefs matching the given pattern, in document order.
pub fn matching_hrefs(html: &str, pattern: &Regex) -> Vec<String> {
    extract_hrefs(html)
        .into_iter()
        .filter(|href| pattern.is_match(href))
        .collect()
}
