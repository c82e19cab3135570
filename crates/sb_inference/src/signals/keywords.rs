use std::collections::HashMap;

use lazy_static::lazy_static;
use regex::Regex;

use super::re;
use super::text::strip_tags;

pub const STOP_WORDS: &[&str] = &[
    "the", "a", "an", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with", "by",
    "from", "as", "is", "was", "were", "been", "be", "this", "that", "these", "those", "are",
    "has", "have", "had",
];

pub const DEFAULT_KEYWORDS: [&str; 3] = ["space", "biology", "research"];

const MIN_WORD_LEN: usize = 2;
const MIN_OCCURRENCES: usize = 2;
const CANDIDATES: usize = 10;
const MAX_KEYWORDS: usize = 6;

lazy_static! {
    static ref NON_WORD: Regex = re(r"[^\w\s]");
}

/// Most frequent content words, most common first and earliest first on ties.
/// Falls back to [`DEFAULT_KEYWORDS`] when no word repeats often enough.
pub fn extract_keywords(text: &str) -> Vec<String> {
    let clean = NON_WORD.replace_all(&strip_tags(text), " ").into_owned();

    // word -> (count, first position)
    let mut counts: HashMap<String, (usize, usize)> = HashMap::new();
    for (position, word) in clean
        .split_whitespace()
        .filter(|w| w.chars().count() > MIN_WORD_LEN)
        .map(str::to_lowercase)
        .filter(|w| !STOP_WORDS.contains(&w.as_str()))
        .enumerate()
    {
        counts.entry(word).or_insert((0, position)).0 += 1;
    }

    let mut ranked: Vec<(String, usize, usize)> = counts
        .into_iter()
        .map(|(word, (count, first))| (word, count, first))
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.2.cmp(&b.2)));

    let keywords: Vec<String> = ranked
        .into_iter()
        .take(CANDIDATES)
        .filter(|(_, count, _)| *count > MIN_OCCURRENCES)
        .take(MAX_KEYWORDS)
        .map(|(word, _, _)| word)
        .collect();

    if keywords.is_empty() {
        DEFAULT_KEYWORDS.iter().map(|k| k.to_string()).collect()
    } else {
        keywords
    }
}
