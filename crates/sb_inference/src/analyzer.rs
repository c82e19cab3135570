//! Article-level AI features. Every call degrades to a fixed default when the
//! text generator fails, so callers always get a usable answer.

use std::sync::Arc;

use lazy_static::lazy_static;
use regex::Regex;
use sb_core::{ChartRecord, TextGenerator};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::signals::{
    abstract_section, clean_article_text, extract_keywords, extract_metadata, extract_numerical_data,
    re, truncate_chars, ArticleMetadata,
};

pub const SUMMARY_UNAVAILABLE: &str = "AI summarization temporarily unavailable.";
pub const ANALYSIS_UNAVAILABLE: &str = "AI analysis temporarily unavailable.";
pub const DEFAULT_AI_KEYWORDS: [&str; 4] = ["space biology", "microgravity", "NASA research", "biological systems"];
pub const SUMMARY_BUTTON_ANSWER: &str = "I can provide you with a comprehensive AI-generated summary with visualizations and detailed analysis. Click the button below to view it.";
pub const CHAT_UNAVAILABLE: &str = "I'm having trouble processing your question right now. Please try again.";
pub const GENERIC_SUMMARY: &str = "This article presents research findings from NASA's Space Biology program.";

/// Question fragments that ask for a summary rather than a specific fact.
pub const SUMMARY_REQUEST_MARKERS: &[&str] = &[
    "summar", "summery", "overview", "brief", "short form", "key point", "main finding", "tldr",
    "abstract",
];

const SUMMARIZE_INPUT_CHARS: usize = 3000;
const STRUCTURED_INPUT_CHARS: usize = 4000;
const CHAT_INPUT_CHARS: usize = 8000;
const KEYWORD_INPUT_CHARS: usize = 2000;
const COMPREHENSIVE_INPUT_CHARS: usize = 10000;
const METADATA_INPUT_CHARS: usize = 5000;
const MAX_AI_KEYWORDS: usize = 8;
const MIN_AI_SUMMARY_CHARS: usize = 200;
const MIN_FALLBACK_SENTENCE_CHARS: usize = 80;
const FALLBACK_SENTENCES: usize = 10;
const MAX_FALLBACK_SUMMARY_CHARS: usize = 2500;

lazy_static! {
    static ref BOLD: Regex = re(r"\*\*([^*]+)\*\*");
    static ref ITALIC: Regex = re(r"\*([^*]+)\*");
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatAnswer {
    pub answer: String,
    pub show_summary_button: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComprehensiveSummary {
    pub summary: String,
    pub keywords: Vec<String>,
    #[serde(rename = "chartData")]
    pub chart_data: ChartRecord,
    pub metadata: ArticleMetadata,
}

pub fn is_summary_request(question: &str) -> bool {
    let lowered = question.trim().to_lowercase();
    SUMMARY_REQUEST_MARKERS.iter().any(|m| lowered.contains(m))
}

fn split_terms(text: &str) -> Vec<String> {
    text.trim()
        .split(',')
        .map(|k| k.trim().to_string())
        .filter(|k| !k.is_empty())
        .take(MAX_AI_KEYWORDS)
        .collect()
}

fn strip_emphasis(text: &str) -> String {
    let text = BOLD.replace_all(text, "$1");
    ITALIC.replace_all(&text, "$1").into_owned()
}

/// Summary built from the article text alone.
pub fn extractive_fallback(clean_text: &str) -> String {
    let summary = abstract_section(clean_text).unwrap_or_else(|| {
        let sentences: Vec<String> = clean_text
            .split('.')
            .map(str::trim)
            .filter(|s| s.chars().count() > MIN_FALLBACK_SENTENCE_CHARS)
            .take(FALLBACK_SENTENCES)
            .map(|s| format!("{}.", s))
            .collect();
        if sentences.is_empty() {
            GENERIC_SUMMARY.to_string()
        } else {
            sentences.join(" ")
        }
    });

    if summary.chars().count() > MAX_FALLBACK_SUMMARY_CHARS {
        format!("{}...", truncate_chars(&summary, MAX_FALLBACK_SUMMARY_CHARS))
    } else {
        summary
    }
}

#[derive(Debug, Clone)]
pub struct ArticleAnalyzer {
    model: Arc<dyn TextGenerator>,
}

impl ArticleAnalyzer {
    pub fn new(model: Arc<dyn TextGenerator>) -> Self {
        Self { model }
    }

    pub fn model_name(&self) -> &str {
        self.model.name()
    }

    /// Non-empty completion, or `None` after logging the failure.
    async fn ask(&self, task: &str, prompt: &str) -> Option<String> {
        match self.model.generate(prompt).await {
            Ok(text) if !text.trim().is_empty() => Some(text.trim().to_string()),
            Ok(_) => {
                warn!("⚠️ {} returned an empty {}", self.model.name(), task);
                None
            }
            Err(e) => {
                warn!("⚠️ {} failed for {}: {}", self.model.name(), task, e);
                None
            }
        }
    }

    pub async fn summarize(&self, text: &str) -> String {
        let prompt = format!(
            "Summarize this NASA space biology research article in 2-3 sentences:\n\n{}",
            truncate_chars(text, SUMMARIZE_INPUT_CHARS)
        );
        self.ask("summary", &prompt)
            .await
            .unwrap_or_else(|| SUMMARY_UNAVAILABLE.to_string())
    }

    pub async fn structured_summary(&self, title: &str, content: &str) -> String {
        let prompt = format!(
            "Give a structured summary of this NASA space biology research article.\n\n\
             Title: {}\n\nContent:\n{}\n\n\
             Use these sections:\n\
             - Objective: 1-2 sentences\n\
             - Methods: 2-3 sentences\n\
             - Key Results: 3-4 bullet points\n\
             - Conclusions: 1-2 sentences",
            title,
            truncate_chars(content, STRUCTURED_INPUT_CHARS)
        );
        self.ask("structured summary", &prompt)
            .await
            .unwrap_or_else(|| ANALYSIS_UNAVAILABLE.to_string())
    }

    pub async fn keywords(&self, text: &str) -> Vec<String> {
        let prompt = format!(
            "List 8 key scientific terms from this text, separated by commas:\n\n{}",
            truncate_chars(text, SUMMARIZE_INPUT_CHARS)
        );
        let terms = self.ask("keyword list", &prompt).await.map(|t| split_terms(&t));
        match terms {
            Some(terms) if !terms.is_empty() => terms,
            _ => DEFAULT_AI_KEYWORDS.iter().map(|k| k.to_string()).collect(),
        }
    }

    /// Answer a question using only the article. Requests for a summary are
    /// answered with a pointer to the summary view without calling the model.
    pub async fn chat(&self, question: &str, title: &str, content: &str) -> ChatAnswer {
        if is_summary_request(question) {
            info!("💬 Summary request detected: {}", question);
            return ChatAnswer {
                answer: SUMMARY_BUTTON_ANSWER.to_string(),
                show_summary_button: true,
            };
        }

        let prompt = format!(
            "You answer questions about one research article and nothing else.\n\
             Only use facts stated in the article below. If the question is not about \
             this article, reply: \"I can only answer questions about this specific article. \
             Please ask about the research, methods, findings, or conclusions presented here.\"\n\n\
             Article Title: {}\n\nArticle Content:\n{}\n\nUser Question: {}\n\nAnswer:",
            title,
            truncate_chars(content, CHAT_INPUT_CHARS),
            question
        );
        let answer = self
            .ask("chat answer", &prompt)
            .await
            .unwrap_or_else(|| CHAT_UNAVAILABLE.to_string());
        ChatAnswer {
            answer,
            show_summary_button: false,
        }
    }

    /// Summary, keywords, chart data and metadata for the article view.
    pub async fn comprehensive_summary(&self, title: &str, content: &str) -> ComprehensiveSummary {
        let chart_data = extract_numerical_data(content);
        info!("📊 Found {} chart data points", chart_data.data.len());

        let clean = clean_article_text(content);

        let keyword_prompt = format!(
            "List 6 key scientific terms from this space biology article. Reply with comma-separated terms only: {}\n{}",
            title,
            truncate_chars(&clean, KEYWORD_INPUT_CHARS)
        );
        let keywords = match self.ask("keyword list", &keyword_prompt).await.map(|t| split_terms(&t)) {
            Some(terms) if !terms.is_empty() => terms,
            _ => extract_keywords(content),
        };

        let summary_prompt = format!(
            "Summarize this NASA space biology research article for scientists in 5-6 paragraphs.\n\n\
             Title: {}\n\nArticle:\n{}\n\n\
             Cover the research objective and its relevance to space missions, the methods and \
             subjects, key findings with their measurements, biological mechanisms, implications \
             for astronaut health, and open questions.",
            title,
            truncate_chars(&clean, COMPREHENSIVE_INPUT_CHARS)
        );
        let summary = self
            .ask("comprehensive summary", &summary_prompt)
            .await
            .map(|s| strip_emphasis(&s))
            .filter(|s| s.chars().count() >= MIN_AI_SUMMARY_CHARS)
            .unwrap_or_else(|| {
                info!("📝 Using extractive summary");
                extractive_fallback(&clean)
            });

        let metadata = extract_metadata(truncate_chars(content, METADATA_INPUT_CHARS));

        ComprehensiveSummary {
            summary,
            keywords,
            chart_data,
            metadata,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use sb_core::{Error, Result};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Replays canned replies in order; `None` entries fail.
    #[derive(Debug)]
    pub struct ScriptedModel {
        replies: Mutex<Vec<Option<String>>>,
        pub prompts: Mutex<Vec<String>>,
        pub calls: AtomicUsize,
    }

    impl ScriptedModel {
        pub fn new(replies: Vec<Option<&str>>) -> Arc<Self> {
            Arc::new(Self {
                replies: Mutex::new(replies.into_iter().rev().map(|r| r.map(String::from)).collect()),
                prompts: Mutex::new(Vec::new()),
                calls: AtomicUsize::new(0),
            })
        }

        pub fn failing() -> Arc<Self> {
            Self::new(vec![])
        }
    }

    #[async_trait]
    impl TextGenerator for ScriptedModel {
        fn name(&self) -> &str {
            "Scripted"
        }

        async fn generate(&self, prompt: &str) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.prompts.lock().unwrap().push(prompt.to_string());
            match self.replies.lock().unwrap().pop().flatten() {
                Some(reply) => Ok(reply),
                None => Err(Error::Inference("model offline".to_string())),
            }
        }
    }

    #[tokio::test]
    async fn test_summarize_defaults_on_failure() {
        let analyzer = ArticleAnalyzer::new(ScriptedModel::failing());
        assert_eq!(analyzer.summarize("text").await, SUMMARY_UNAVAILABLE);
        assert_eq!(analyzer.structured_summary("t", "c").await, ANALYSIS_UNAVAILABLE);
        assert_eq!(analyzer.keywords("text").await, DEFAULT_AI_KEYWORDS.to_vec());
    }

    #[tokio::test]
    async fn test_summarize_truncates_input() {
        let model = ScriptedModel::new(vec![Some("Short summary.")]);
        let analyzer = ArticleAnalyzer::new(model.clone());
        let text = "x".repeat(5000);
        assert_eq!(analyzer.summarize(&text).await, "Short summary.");
        let prompt = model.prompts.lock().unwrap()[0].clone();
        assert_eq!(prompt.matches('x').count(), SUMMARIZE_INPUT_CHARS);
    }

    #[tokio::test]
    async fn test_keywords_are_split_and_capped() {
        let model = ScriptedModel::new(vec![Some("a, b , c,d,e,f,g,h,i,j")]);
        let analyzer = ArticleAnalyzer::new(model);
        assert_eq!(
            analyzer.keywords("text").await,
            vec!["a", "b", "c", "d", "e", "f", "g", "h"]
        );
    }

    #[tokio::test]
    async fn test_summary_questions_skip_the_model() {
        let model = ScriptedModel::new(vec![Some("should not be used")]);
        let analyzer = ArticleAnalyzer::new(model.clone());
        for question in ["Can you summarize this?", "Give me an OVERVIEW", "What is the main finding?", "tldr please"] {
            let answer = analyzer.chat(question, "Title", "Content").await;
            assert!(answer.show_summary_button, "{}", question);
            assert_eq!(answer.answer, SUMMARY_BUTTON_ANSWER);
        }
        assert_eq!(model.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_chat_answers_and_apologizes() {
        let model = ScriptedModel::new(vec![Some("They were flown for 30 days."), None]);
        let analyzer = ArticleAnalyzer::new(model.clone());

        let answer = analyzer.chat("How long were mice flown?", "Title", "Content").await;
        assert_eq!(answer.answer, "They were flown for 30 days.");
        assert!(!answer.show_summary_button);
        assert!(model.prompts.lock().unwrap()[0].contains("User Question: How long were mice flown?"));

        let answer = analyzer.chat("Which strain?", "Title", "Content").await;
        assert_eq!(answer.answer, CHAT_UNAVAILABLE);
        assert!(!answer.show_summary_button);
    }

    #[tokio::test]
    async fn test_comprehensive_summary_with_model() {
        let long_summary = format!("**Objective** {}", "Mice lost bone in orbit. ".repeat(12));
        let model = ScriptedModel::new(vec![Some("bone loss, microgravity"), Some(&long_summary)]);
        let analyzer = ArticleAnalyzer::new(model);

        let content = "<p>Abstract Flight: 25, Control: 30</p><p>Received 2013 Jan 14</p>";
        let result = analyzer.comprehensive_summary("Bone loss", content).await;
        assert_eq!(result.keywords, vec!["bone loss", "microgravity"]);
        assert!(result.summary.starts_with("Objective Mice lost bone"));
        assert!(!result.summary.contains("**"));
        assert_eq!(result.chart_data.title, "Group Comparison");
        assert_eq!(result.metadata.received.as_deref(), Some("2013 Jan 14"));
    }

    #[tokio::test]
    async fn test_comprehensive_summary_falls_back() {
        let analyzer = ArticleAnalyzer::new(ScriptedModel::new(vec![None, Some("too short")]));
        let content = "<p>Abstract: Spaceflight reduced trabecular bone volume in mice. \
                       Introduction Bone loss is a risk.</p>";
        let result = analyzer.comprehensive_summary("Bone", content).await;
        assert_eq!(result.summary, "Spaceflight reduced trabecular bone volume in mice.");
        assert_eq!(result.keywords, vec!["space", "biology", "research"]);
        assert!(result.chart_data.data.is_empty());
    }

    #[test]
    fn test_extractive_fallback() {
        let sentence = "Hindlimb unloaded rats showed a marked decrease in soleus muscle mass after fourteen days";
        let text = format!("Short one. {}. {}.", sentence, sentence);
        assert_eq!(extractive_fallback(&text), format!("{}. {}.", sentence, sentence));
        assert_eq!(extractive_fallback("Nothing long."), GENERIC_SUMMARY);

        let huge = format!("Abstract: {} Introduction", "a".repeat(3000));
        let summary = extractive_fallback(&huge);
        assert_eq!(summary.chars().count(), MAX_FALLBACK_SUMMARY_CHARS + 3);
        assert!(summary.ends_with("..."));
    }

    #[test]
    fn test_serialized_shape() {
        let summary = ComprehensiveSummary {
            summary: "s".into(),
            keywords: vec!["k".into()],
            chart_data: ChartRecord::empty(),
            metadata: ArticleMetadata::default(),
        };
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["chartData"]["chartType"], "bar");
        assert_eq!(json["metadata"], serde_json::json!({}));
    }
}
