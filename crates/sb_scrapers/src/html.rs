//! Small DOM helpers shared by the static and rendered extractors.

use std::collections::HashSet;

use ego_tree::NodeId;
use lazy_static::lazy_static;
use sb_core::ExtractedContent;
use scraper::{ElementRef, Html, Selector};

lazy_static! {
    pub static ref PARAGRAPH: Selector = css("p");
    pub static ref DIV: Selector = css("div");
    pub static ref IMAGE: Selector = css("img");
    pub static ref TABLE: Selector = css("table");
    pub static ref TABLE_HEADER: Selector = css("th");
    pub static ref TABLE_ROW: Selector = css("tr");
    pub static ref TABLE_CELL: Selector = css("td");
}

/// Compile one of the built-in selectors. Only used with literals covered by tests.
pub(crate) fn css(selector: &str) -> Selector {
    Selector::parse(selector).unwrap_or_else(|e| panic!("invalid built-in selector {selector:?}: {e:?}"))
}

/// Element text with runs of whitespace collapsed to single spaces.
pub fn element_text(element: &ElementRef) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn char_len(text: &str) -> usize {
    text.chars().count()
}

pub fn escape_text(text: &str) -> String {
    html_escape::encode_text(text).into_owned()
}

pub fn escape_attr(value: &str) -> String {
    html_escape::encode_double_quoted_attribute(value).into_owned()
}

/// Detach every element matching `selector` from the document.
pub fn remove_matching(document: &mut Html, selector: &Selector) {
    let ids: Vec<NodeId> = document.select(selector).map(|el| el.id()).collect();
    for id in ids {
        if let Some(mut node) = document.tree.get_mut(id) {
            node.detach();
        }
    }
}

/// Mark an element and everything below it as consumed.
pub fn consume_subtree(element: &ElementRef, processed: &mut HashSet<NodeId>) {
    for node in element.descendants() {
        processed.insert(node.id());
    }
}

/// `<p>` error payload returned in place of content.
pub fn error_content(prefix: &str, error: &impl std::fmt::Display) -> ExtractedContent {
    ExtractedContent::message(format!("<p>{}: {}</p>", prefix, escape_text(&error.to_string())))
}
