use serde::{Deserialize, Serialize};

/// An entry of the article catalog. `id` is the row index in load order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleReference {
    pub id: usize,
    pub title: String,
    pub link: String,
}

/// Readable HTML extracted from an article page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractedContent {
    pub content: String,
    pub tables: Vec<String>,
}

impl ExtractedContent {
    pub fn new(content: impl Into<String>, tables: Vec<String>) -> Self {
        Self {
            content: content.into(),
            tables,
        }
    }

    /// Content made of a single pre-rendered HTML message and no tables.
    pub fn message(html: impl Into<String>) -> Self {
        Self::new(html, Vec::new())
    }
}

/// What the transport layer hands back for `/articles/:id`, and what the cache stores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArticleResponse {
    pub id: usize,
    pub title: String,
    pub link: String,
    pub content: String,
    pub tables: Vec<String>,
}

impl ArticleResponse {
    pub fn new(article: &ArticleReference, extracted: ExtractedContent) -> Self {
        Self {
            id: article.id,
            title: article.title.clone(),
            link: article.link.clone(),
            content: extracted.content,
            tables: extracted.tables,
        }
    }

    pub fn extracted(&self) -> ExtractedContent {
        ExtractedContent::new(self.content.clone(), self.tables.clone())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartType {
    Bar,
    Pie,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    pub label: String,
    pub value: f64,
}

impl ChartPoint {
    pub fn new(label: impl Into<String>, value: f64) -> Self {
        Self {
            label: label.into(),
            value,
        }
    }
}

/// Chart-ready numbers for the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartRecord {
    pub chart_type: ChartType,
    pub title: String,
    pub unit: String,
    pub data: Vec<ChartPoint>,
}

impl ChartRecord {
    pub const DEFAULT_TITLE: &'static str = "Data Visualization";

    pub fn empty() -> Self {
        Self {
            chart_type: ChartType::Bar,
            title: Self::DEFAULT_TITLE.to_string(),
            unit: String::new(),
            data: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl Default for ChartRecord {
    fn default() -> Self {
        Self::empty()
    }
}
