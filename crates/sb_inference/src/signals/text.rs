//! Turning extracted article HTML into plain prose for summarization.

use lazy_static::lazy_static;
use regex::Regex;

use super::re;

lazy_static! {
    static ref TAG: Regex = re(r"<[^>]+>");
    static ref WHITESPACE: Regex = re(r"\s+");
    static ref BODY_START: Regex = re(r"Abstract|ABSTRACT|Introduction|INTRODUCTION|1\.\s+Introduction");
    static ref NLM_CATALOG: Regex = re(r"(?i)View in NLM Catalog");
    static ref AUTHOR_INFO: Regex = re(r"(?i)Author information");
    static ref ARTICLE_NOTES: Regex = re(r"(?i)Article notes");
    static ref SECTION_START: Regex = re(r"(?i)Abstract|Introduction|[0-9]+\.");
    static ref RECEIVED_TO_PUBLISHED: Regex = re(r"(?s)Received:?\s*[0-9]{4}.*?Published:?\s*[0-9]{4}");
    static ref COMPETING_INTERESTS: Regex = re(r"Competing Interests:");
    static ref COMPETING_END: Regex = re(r"[0-9]+\.|[A-Z][a-z]+\s+[a-z]");
    static ref EMAIL: Regex = re(r"\*\s*E-mail:");
    static ref EMAIL_END: Regex = re(r"[0-9]+\.|[A-Z]");
    static ref STRAY_TOKEN: Regex =
        re(r"(?i)\b(?:bone|pubmed|spaceflight|google|scholar|ground|doi|pmc|ncbi)\b");
    static ref FOLLOWED_BY_WORD: Regex = re(r"^\s+\w");
    static ref ABSTRACT_HEAD: Regex = re(r"(?i)abstract[:\s]+");
    static ref ABSTRACT_END: Regex = re(r"(?i)introduction|keywords|1\.");
}

/// Replace every tag with a space.
pub fn strip_tags(html: &str) -> String {
    TAG.replace_all(html, " ").into_owned()
}

pub fn collapse_whitespace(text: &str) -> String {
    WHITESPACE.replace_all(text, " ").trim().to_string()
}

/// Prefix of `text` holding at most `max` characters.
pub fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Delete each `marker` occurrence up to (not including) the next `terminator`.
/// A marker with no terminator after it is left alone.
fn remove_until(text: &str, marker: &Regex, terminator: &Regex) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pos = 0;
    while let Some(start) = marker.find_at(text, pos) {
        let Some(end) = terminator.find_at(text, start.end()) else {
            break;
        };
        out.push_str(&text[pos..start.start()]);
        pos = end.start();
    }
    out.push_str(&text[pos..]);
    out
}

/// Drop navigation tokens that stand alone, keeping them when a word follows.
fn remove_stray_tokens(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pos = 0;
    for token in STRAY_TOKEN.find_iter(text) {
        if FOLLOWED_BY_WORD.is_match(&text[token.end()..]) {
            continue;
        }
        out.push_str(&text[pos..token.start()]);
        pos = token.end();
    }
    out.push_str(&text[pos..]);
    out
}

/// Plain article prose: tags and PMC front matter removed, starting at the
/// abstract or introduction when one is present.
pub fn clean_article_text(html: &str) -> String {
    let mut text = collapse_whitespace(&strip_tags(html));
    if let Some(start) = BODY_START.find(&text) {
        text = text[start.start()..].to_string();
    }

    for marker in [&*NLM_CATALOG, &*AUTHOR_INFO, &*ARTICLE_NOTES] {
        text = remove_until(&text, marker, &SECTION_START);
    }
    text = RECEIVED_TO_PUBLISHED.replace_all(&text, "").into_owned();
    text = remove_until(&text, &COMPETING_INTERESTS, &COMPETING_END);
    text = remove_until(&text, &EMAIL, &EMAIL_END);
    text = remove_stray_tokens(&text);

    collapse_whitespace(&text)
}

/// Text between an "Abstract" heading and the introduction, keywords or first numbered section.
pub fn abstract_section(clean_text: &str) -> Option<String> {
    let head = ABSTRACT_HEAD.find(clean_text)?;
    let end = ABSTRACT_END.find_at(clean_text, head.end())?;
    let section = clean_text[head.end()..end.start()].trim();
    (!section.is_empty()).then(|| section.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_and_collapse() {
        assert_eq!(
            collapse_whitespace(&strip_tags("<p>Bone <b>loss</b></p>\n\n<p>in mice</p>")),
            "Bone loss in mice"
        );
    }

    #[test]
    fn test_truncate_chars() {
        assert_eq!(truncate_chars("microgravity", 5), "micro");
        assert_eq!(truncate_chars("µg", 1), "µ");
        assert_eq!(truncate_chars("short", 50), "short");
    }

    #[test]
    fn test_starts_at_abstract() {
        let cleaned = clean_article_text("<p>Journal home</p><p>Abstract Mice were flown on STS-131.</p>");
        assert!(cleaned.starts_with("Abstract Mice were flown"));
    }

    #[test]
    fn test_front_matter_removed() {
        let html = "<p>Abstract Rodents lost muscle mass.</p>\
                    <p>Author information Department of Biology, NASA Ames Introduction Muscle atrophy is common.</p>\
                    <p>Received 2012 Mar 3; Accepted 2012 May 1; Published 2012 Jun 2.</p>\
                    <p>Competing Interests: none declared. The authors thank the crew.</p>";
        let cleaned = clean_article_text(html);
        assert!(!cleaned.contains("Department of Biology"));
        assert!(cleaned.contains("Introduction Muscle atrophy is common."));
        assert!(!cleaned.contains("Received 2012"));
        assert!(!cleaned.contains("none declared"));
        assert!(cleaned.contains("The authors thank the crew."));
    }

    #[test]
    fn test_marker_without_terminator_is_kept() {
        let cleaned = clean_article_text("<p>see the author information here</p>");
        assert_eq!(cleaned, "see the author information here");
    }

    #[test]
    fn test_stray_tokens() {
        // a token is kept when another word follows it
        let cleaned = clean_article_text("Abstract PubMed Google Scholar. Bone density fell. DOI");
        assert_eq!(cleaned, "Abstract PubMed Google . Bone density fell.");
    }

    #[test]
    fn test_abstract_section() {
        let text = "Abstract: Spaceflight reduced bone mineral density. Introduction Astronauts lose bone.";
        assert_eq!(
            abstract_section(text).as_deref(),
            Some("Spaceflight reduced bone mineral density.")
        );
        assert_eq!(abstract_section("Introduction only"), None);
        assert_eq!(abstract_section("Abstract: never terminated"), None);
    }
}
