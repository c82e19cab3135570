use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::re;

lazy_static! {
    static ref RECEIVED: Regex = re(r"(?i)Received:?\s*([0-9]{4}\s+[A-Za-z]+\s+[0-9]{1,2})");
    static ref ACCEPTED: Regex = re(r"(?i)Accepted:?\s*([0-9]{4}\s+[A-Za-z]+\s+[0-9]{1,2})");
    static ref PUBLISHED: Regex = re(r"(?i)(?:Published|Collection date):?\s*([0-9]{4})");
    static ref COMPETING_INTERESTS: Regex = re(r"(?i)Competing Interests:?\s*([^.]+)");
}

/// Publication history found in an article's front matter. Missing fields are omitted when serialized.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub received: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accepted: Option<String>,
    /// Year only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub competing_interests: Option<String>,
}

impl ArticleMetadata {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

fn first_group(pattern: &Regex, text: &str) -> Option<String> {
    pattern
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
}

pub fn extract_metadata(text: &str) -> ArticleMetadata {
    ArticleMetadata {
        received: first_group(&RECEIVED, text),
        accepted: first_group(&ACCEPTED, text),
        published: first_group(&PUBLISHED, text),
        competing_interests: first_group(&COMPETING_INTERESTS, text),
    }
}
