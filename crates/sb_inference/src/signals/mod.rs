//! Regex-based signals pulled from article prose. No I/O.

pub mod keywords;
pub mod metadata;
pub mod numeric;
pub mod text;

use regex::Regex;

pub use keywords::{extract_keywords, DEFAULT_KEYWORDS, STOP_WORDS};
pub use metadata::{extract_metadata, ArticleMetadata};
pub use numeric::extract_numerical_data;
pub use text::{abstract_section, clean_article_text, strip_tags, truncate_chars};

/// Compile a built-in pattern. Every pattern is exercised by the module tests.
pub(crate) fn re(pattern: &str) -> Regex {
    Regex::new(pattern).unwrap_or_else(|e| panic!("invalid built-in pattern {pattern:?}: {e}"))
}
