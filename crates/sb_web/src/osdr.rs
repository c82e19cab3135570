//! Thin client for the NASA OSDR biological data API.

use std::time::Duration;

use futures::future::join_all;
use reqwest::{Client, StatusCode};
use sb_core::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

pub const OSDR_BASE_URL: &str = "https://visualization.osdr.nasa.gov/biodata/api/v2";
pub const BULK_BATCH_SIZE: usize = 20;

const NOT_AVAILABLE: &str = "N/A";
const NO_DESCRIPTION: &str = "No description available";
const LOAD_FAILED: &str = "Error loading details";

/// One row of the bulk dataset listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetSummary {
    pub accession: String,
    pub title: String,
    pub description: String,
    pub organism: String,
    pub material: String,
    pub factor: String,
    pub funding: String,
    pub publication: String,
}

impl DatasetSummary {
    fn from_metadata(accession: &str, metadata: &Value) -> Self {
        let field = |key: &str, default: &str| {
            metadata
                .get(key)
                .and_then(Value::as_str)
                .unwrap_or(default)
                .to_string()
        };
        Self {
            accession: accession.to_string(),
            title: field("study title", accession),
            description: field("study description", NO_DESCRIPTION),
            organism: field("organism", NOT_AVAILABLE),
            material: field("material type", NOT_AVAILABLE),
            factor: field("study factor name", NOT_AVAILABLE),
            funding: field("study funding agency", NOT_AVAILABLE),
            publication: field("study publication title", NOT_AVAILABLE),
        }
    }

    /// Stand-in row for a dataset whose details could not be read.
    pub fn unavailable(accession: &str) -> Self {
        Self {
            accession: accession.to_string(),
            title: accession.to_string(),
            description: LOAD_FAILED.to_string(),
            organism: NOT_AVAILABLE.to_string(),
            material: NOT_AVAILABLE.to_string(),
            factor: NOT_AVAILABLE.to_string(),
            funding: NOT_AVAILABLE.to_string(),
            publication: NOT_AVAILABLE.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct OsdrClient {
    client: Client,
    base_url: String,
}

impl OsdrClient {
    pub fn new() -> Result<Self> {
        Self::with_base_url(OSDR_BASE_URL)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder().timeout(Duration::from_secs(30)).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    async fn get_json(&self, path: &str) -> Result<Value> {
        let response = self.client.get(self.url(path)).send().await?.error_for_status()?;
        Ok(response.json().await?)
    }

    /// File listings are optional upstream: a 404 or any failure is an empty list.
    async fn get_listing(&self, path: &str) -> Value {
        let empty = Value::Array(Vec::new());
        match self.client.get(self.url(path)).send().await {
            Ok(response) if response.status() == StatusCode::NOT_FOUND => empty,
            Ok(response) => response.json().await.unwrap_or(empty),
            Err(e) => {
                warn!("⚠️ OSDR listing {} failed: {}", path, e);
                empty
            }
        }
    }

    pub async fn datasets(&self) -> Result<Value> {
        self.get_json("datasets/").await
    }

    pub async fn dataset(&self, id: &str) -> Result<Value> {
        self.get_json(&format!("dataset/{}/", id)).await
    }

    pub async fn dataset_assays(&self, id: &str) -> Result<Value> {
        self.get_json(&format!("dataset/{}/assays/", id)).await
    }

    pub async fn dataset_files(&self, id: &str) -> Value {
        self.get_listing(&format!("dataset/{}/files/", id)).await
    }

    pub async fn assay_samples(&self, id: &str, assay: &str) -> Result<Value> {
        self.get_json(&format!("dataset/{}/assay/{}/samples/", id, assay)).await
    }

    pub async fn assay_files(&self, id: &str, assay: &str) -> Value {
        self.get_listing(&format!("dataset/{}/assay/{}/files/", id, assay)).await
    }

    pub async fn sample_files(&self, id: &str, assay: &str, sample: &str) -> Value {
        self.get_listing(&format!("dataset/{}/assay/{}/sample/{}/files/", id, assay, sample))
            .await
    }

    /// `None` when the upstream answers with anything but 200.
    async fn dataset_summary(&self, id: &str) -> Option<DatasetSummary> {
        let response = match self.client.get(self.url(&format!("dataset/{}/", id))).send().await {
            Ok(response) => response,
            Err(e) => {
                warn!("⚠️ OSDR dataset {} failed: {}", id, e);
                return Some(DatasetSummary::unavailable(id));
            }
        };
        if response.status() != StatusCode::OK {
            return None;
        }
        let body: Value = match response.json().await {
            Ok(body) => body,
            Err(e) => {
                warn!("⚠️ OSDR dataset {} is not JSON: {}", id, e);
                return Some(DatasetSummary::unavailable(id));
            }
        };
        // the body is keyed by accession
        let dataset = body.as_object().and_then(|entries| entries.values().next());
        Some(match dataset {
            Some(dataset) => {
                DatasetSummary::from_metadata(id, dataset.get("metadata").unwrap_or(&Value::Null))
            }
            None => DatasetSummary::unavailable(id),
        })
    }

    /// Summaries of every listed dataset, fetched [`BULK_BATCH_SIZE`] at a time.
    pub async fn bulk_summaries(&self) -> Result<Vec<DatasetSummary>> {
        let listing = self.datasets().await?;
        let ids: Vec<String> = listing
            .as_object()
            .map(|datasets| datasets.keys().cloned().collect())
            .unwrap_or_default();
        info!("🛰️ Loading {} OSDR datasets", ids.len());

        let mut summaries = Vec::with_capacity(ids.len());
        for batch in ids.chunks(BULK_BATCH_SIZE) {
            let results = join_all(batch.iter().map(|id| self.dataset_summary(id))).await;
            summaries.extend(results.into_iter().flatten());
        }
        Ok(summaries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_files_not_found_is_empty() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/dataset/OSD-1/files/")
            .with_status(404)
            .create_async()
            .await;
        let client = OsdrClient::with_base_url(server.url()).unwrap();
        assert_eq!(client.dataset_files("OSD-1").await, json!([]));
    }

    #[tokio::test]
    async fn test_unreachable_listing_is_empty() {
        let client = OsdrClient::with_base_url("http://127.0.0.1:1").unwrap();
        assert_eq!(client.assay_files("OSD-1", "a1").await, json!([]));
    }

    #[tokio::test]
    async fn test_dataset_error_status_fails() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/dataset/OSD-9/")
            .with_status(500)
            .create_async()
            .await;
        let client = OsdrClient::with_base_url(server.url()).unwrap();
        assert!(client.dataset("OSD-9").await.is_err());
    }

    #[tokio::test]
    async fn test_bulk_summaries() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/datasets/")
            .with_status(200)
            .with_body(r#"{"OSD-1": {}, "OSD-2": {}, "OSD-3": {}}"#)
            .create_async()
            .await;
        server
            .mock("GET", "/dataset/OSD-1/")
            .with_status(200)
            .with_body(
                json!({"OSD-1": {"metadata": {
                    "study title": "Rodent Research 1",
                    "organism": "Mus musculus"
                }}})
                .to_string(),
            )
            .create_async()
            .await;
        server
            .mock("GET", "/dataset/OSD-2/")
            .with_status(503)
            .create_async()
            .await;
        server
            .mock("GET", "/dataset/OSD-3/")
            .with_status(200)
            .with_body("not json")
            .create_async()
            .await;

        let client = OsdrClient::with_base_url(server.url()).unwrap();
        let summaries = client.bulk_summaries().await.unwrap();

        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].accession, "OSD-1");
        assert_eq!(summaries[0].title, "Rodent Research 1");
        assert_eq!(summaries[0].organism, "Mus musculus");
        assert_eq!(summaries[0].description, NO_DESCRIPTION);
        assert_eq!(summaries[0].funding, NOT_AVAILABLE);
        assert_eq!(summaries[1], DatasetSummary::unavailable("OSD-3"));
    }
}
