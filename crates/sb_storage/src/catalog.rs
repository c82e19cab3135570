use std::io::Read;
use std::path::Path;

use sb_core::{ArticleReference, Error, Result};
use serde::Deserialize;
use tracing::{error, info};

#[derive(Debug, Deserialize)]
struct CatalogRow {
    #[serde(rename = "Title")]
    title: String,
    #[serde(rename = "Link")]
    link: String,
}

/// The publication list, loaded once. Ids are row indices.
#[derive(Debug, Clone, Default)]
pub struct ArticleCatalog {
    articles: Vec<ArticleReference>,
}

impl ArticleCatalog {
    pub fn new(articles: Vec<ArticleReference>) -> Self {
        Self { articles }
    }

    /// Parse a CSV with `Title` and `Link` columns. Extra columns are ignored.
    pub fn from_reader<R: Read>(mut reader: R) -> Result<Self> {
        let mut raw = String::new();
        reader.read_to_string(&mut raw)?;
        // spreadsheet exports often carry a UTF-8 BOM in front of the first header
        let raw = raw.strip_prefix('\u{feff}').unwrap_or(&raw);

        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(raw.as_bytes());

        let mut articles = Vec::new();
        for (id, row) in csv_reader.deserialize::<CatalogRow>().enumerate() {
            let row = row.map_err(|e| Error::Storage(format!("Invalid catalog row {}: {}", id, e)))?;
            articles.push(ArticleReference {
                id,
                title: row.title,
                link: row.link,
            });
        }
        Ok(Self { articles })
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let file = std::fs::File::open(path.as_ref())?;
        Self::from_reader(file)
    }

    /// Load the catalog, falling back to an empty one when the file is missing or malformed.
    pub fn load_or_empty(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::from_path(path) {
            Ok(catalog) => {
                info!("📚 Loaded {} articles from {}", catalog.len(), path.display());
                catalog
            }
            Err(e) => {
                error!("Error loading catalog {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    pub fn get(&self, id: usize) -> Option<&ArticleReference> {
        self.articles.get(id)
    }

    pub fn articles(&self) -> &[ArticleReference] {
        &self.articles
    }

    pub fn len(&self) -> usize {
        self.articles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.articles.is_empty()
    }
}
