use lazy_static::lazy_static;
use regex::RegexSet;

use crate::html::char_len;

/// Boilerplate phrases that mark a text block as page chrome rather than article prose.
pub const UNWANTED_PATTERNS: &[&str] = &[
    r"cookie",
    r"privacy policy",
    r"terms of service",
    r"subscribe",
    r"newsletter",
    r"advertisement",
    r"sponsored",
    r"related articles",
    r"share this",
    r"follow us",
    r"social media",
    r"navigation",
    r"menu",
    r"search",
    r"login",
    r"register",
    r"copyright",
    r"all rights reserved",
    r"contact us",
    r"about us",
];

/// Texts shorter than this are never article content.
pub const MIN_WANTED_TEXT_LEN: usize = 10;

lazy_static! {
    static ref UNWANTED: RegexSet = RegexSet::new(UNWANTED_PATTERNS.iter().map(|p| format!("(?i){}", p)))
        .unwrap_or_else(|e| panic!("invalid unwanted pattern: {e}"));
}

pub fn is_unwanted_text(text: &str) -> bool {
    char_len(text) < MIN_WANTED_TEXT_LEN || UNWANTED.is_match(text)
}

/// Markers the extractors put in content when they failed.
const FAILURE_MARKERS: &[&str] = &["could not be extracted", "error fetching"];

/// Whether a static extraction is good enough to skip rendering.
pub fn is_acceptable_static(content: &str, min_len: usize) -> bool {
    if char_len(content) <= min_len {
        return false;
    }
    let lowered = content.to_lowercase();
    !FAILURE_MARKERS.iter().any(|marker| lowered.contains(marker))
}
