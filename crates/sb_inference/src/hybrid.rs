//! Extract-then-abstract summarization for long articles.

use std::sync::Arc;

use sb_core::{Error, Result, TextGenerator};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::signals::text::collapse_whitespace;

const MIN_KEPT_SENTENCE_CHARS: usize = 30;
const MIN_EXTRACT_SENTENCE_CHARS: usize = 50;
const SHORT_LEAD_CHARS: usize = 100;
const EXTRACT_SENTENCES: usize = 6;
const SINGLE_PASS_MAX_CHARS: usize = 3000;
const CHUNK_CHARS: usize = 2500;
const MAX_CHUNKS: usize = 3;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HybridSummary {
    pub extractive: String,
    pub abstractive: String,
    #[serde(rename = "final")]
    pub final_summary: String,
}

/// Collapse whitespace, drop short fragments such as captions and headers, and
/// keep only the first of consecutive repeated sentences.
pub fn preprocess_text(text: &str) -> String {
    let text = collapse_whitespace(text);
    let mut kept: Vec<&str> = Vec::new();
    for sentence in text.split('.').map(str::trim) {
        if sentence.chars().count() <= MIN_KEPT_SENTENCE_CHARS {
            continue;
        }
        if kept.last().is_some_and(|prev| prev.eq_ignore_ascii_case(sentence)) {
            continue;
        }
        kept.push(sentence);
    }
    format!("{}.", kept.join(". "))
}

/// First meaningful sentences, skipping a short leading one that is likely a title.
pub fn extractive_summary(text: &str, num_sentences: usize) -> String {
    let sentences: Vec<&str> = text
        .split('.')
        .map(str::trim)
        .filter(|s| s.chars().count() > MIN_EXTRACT_SENTENCE_CHARS)
        .collect();
    let start = match sentences.first() {
        Some(first) if first.chars().count() < SHORT_LEAD_CHARS => 1,
        _ => 0,
    };
    let selected: Vec<&str> = sentences.iter().skip(start).take(num_sentences).copied().collect();
    format!("{}.", selected.join(". "))
}

/// Sentence-aligned chunks of under `chunk_size` characters. At most three are returned.
pub fn chunk_text(text: &str, chunk_size: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();
    for sentence in text.split('.') {
        if current.chars().count() + sentence.chars().count() < chunk_size {
            current.push_str(sentence);
            current.push('.');
        } else {
            if !current.is_empty() {
                chunks.push(std::mem::take(&mut current));
            }
            current = format!("{}.", sentence);
        }
    }
    if !current.is_empty() {
        chunks.push(current);
    }
    chunks.truncate(MAX_CHUNKS);
    chunks
}

fn excerpt_prompt(excerpt: &str, sentences: &str) -> String {
    format!(
        "You are a scientific assistant for space biology research. Summarize this NASA \
         research text in plain language, in {sentences} sentences. Skip repeated sentences and \
         figure references, keep abbreviations such as SF, SFV and GC exact, and add nothing \
         that is not in the text.\n\nText:\n{excerpt}\n\nSummary:"
    )
}

fn combine_prompt(summaries: &str) -> String {
    format!(
        "You are a scientific assistant for space biology research. Merge these partial \
         summaries into one summary of 3-5 sentences. Keep every fact exact, remove \
         repetition and add nothing new.\n\nSummaries:\n{summaries}\n\nCombined summary:"
    )
}

pub struct HybridSummarizer {
    model: Arc<dyn TextGenerator>,
}

impl HybridSummarizer {
    pub fn new(model: Arc<dyn TextGenerator>) -> Self {
        Self { model }
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        let text = self.model.generate(prompt).await?;
        let text = text.trim();
        if text.is_empty() {
            return Err(Error::Inference("empty completion".to_string()));
        }
        Ok(text.to_string())
    }

    async fn abstractive(&self, extracted: &str) -> Result<String> {
        if extracted.chars().count() <= SINGLE_PASS_MAX_CHARS {
            return self.generate(&excerpt_prompt(extracted, "3-5")).await;
        }

        let mut partials = Vec::new();
        for chunk in chunk_text(extracted, CHUNK_CHARS) {
            partials.push(self.generate(&excerpt_prompt(&chunk, "2-3")).await?);
        }
        let combined = partials.join(" ");
        Ok(self
            .generate(&combine_prompt(&combined))
            .await
            .unwrap_or(combined))
    }

    /// Never fails: without a working model the extractive summary is returned as the final one.
    pub async fn summarize(&self, article_text: &str) -> HybridSummary {
        let clean = preprocess_text(article_text);
        let extractive = extractive_summary(&clean, EXTRACT_SENTENCES);
        info!("🔹 Extracted {} chars from {} cleaned chars", extractive.len(), clean.len());

        let abstractive = match self.abstractive(&extractive).await {
            Ok(summary) => summary,
            Err(e) => {
                warn!("⚠️ Abstractive pass failed: {}", e);
                extractive.clone()
            }
        };

        HybridSummary {
            extractive,
            final_summary: abstractive.clone(),
            abstractive,
        }
    }
}
