//! Paragraph extraction from server-rendered HTML.

use std::collections::HashSet;

use lazy_static::lazy_static;
use sb_core::{ExtractionConfig, ExtractedContent};
use scraper::{Html, Selector};

use crate::html::{char_len, css, element_text, escape_text, remove_matching, PARAGRAPH};

/// Content containers, most specific first. PMC section divs lead the list.
pub const STATIC_CONTAINER_SELECTORS: &[&str] = &[
    "div.tsec",
    "div.sec",
    "div.article-content",
    "div.pmc-articlecontent",
    "div.article-body",
    "div.main-content",
    "article",
    "div.content",
];

pub const NOT_EXTRACTED_PLACEHOLDER: &str =
    "<p>Article content could not be extracted. Please visit the original link.</p>";

lazy_static! {
    static ref STRIPPED: Selector = css("script, style, nav, header, footer, aside");
    static ref CONTAINERS: Vec<Selector> = STATIC_CONTAINER_SELECTORS.iter().map(|s| css(s)).collect();
}

/// Extract long paragraphs from a static page.
///
/// The first container selector that yields paragraphs wins. If none does,
/// every paragraph of the document is considered.
pub fn extract_static(html: &str, config: &ExtractionConfig) -> ExtractedContent {
    let mut document = Html::parse_document(html);
    remove_matching(&mut document, &STRIPPED);

    let min_len = config.static_min_paragraph_len;
    let mut content = CONTAINERS
        .iter()
        .map(|selector| paragraphs_in(&document, Some(selector), min_len))
        .find(|content| !content.is_empty())
        .unwrap_or_default();

    if content.is_empty() {
        content = paragraphs_in(&document, None, min_len);
    }
    if content.is_empty() {
        content = NOT_EXTRACTED_PLACEHOLDER.to_string();
    }
    ExtractedContent::message(content)
}

fn paragraphs_in(document: &Html, container: Option<&Selector>, min_len: usize) -> String {
    // nested containers (a div.sec inside a div.sec) must not repeat paragraphs
    let mut seen = HashSet::new();
    let mut out = String::new();

    let mut push = |p: scraper::ElementRef| {
        if !seen.insert(p.id()) {
            return;
        }
        let text = element_text(&p);
        if char_len(&text) > min_len {
            out.push_str("<p>");
            out.push_str(&escape_text(&text));
            out.push_str("</p>");
        }
    };

    match container {
        Some(selector) => {
            for element in document.select(selector) {
                element.select(&PARAGRAPH).for_each(&mut push);
            }
        }
        None => document.select(&PARAGRAPH).for_each(&mut push),
    }
    out
}
