//! Elasticsearch REST client

use std::time::Duration;

use bytes::Bytes;
use reqwest::{Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::subscription::StoreError;

/// Upper bound on hits returned by a single search
pub const MAX_SEARCH_SIZE: usize = 10_000;

#[derive(Deserialize)]
struct SearchResponse<T> {
    hits: Hits<T>,
}

#[derive(Deserialize)]
struct Hits<T> {
    hits: Vec<Hit<T>>,
}

#[derive(Deserialize)]
struct Hit<T> {
    #[serde(rename = "_source")]
    source: T,
}

/// Shared HTTP client for one index cluster
#[derive(Debug, Clone)]
pub struct ElasticClient {
    http: reqwest::Client,
    base_url: Url,
}

impl ElasticClient {
    /// Create a client for `base_url` with a per-request timeout
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, StoreError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| StoreError::InvalidInput(format!("bad index url {}: {}", base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(StoreError::InvalidInput(format!(
                "index url cannot be a base: {}",
                base_url
            )));
        }

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| StoreError::Backend(format!("failed to build http client: {}", e)))?;

        Ok(Self { http, base_url })
    }

    /// Base URL of the cluster
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Create `index` with the given field mappings; an existing index is accepted
    pub async fn ensure_index(&self, index: &str, properties: Value) -> Result<(), StoreError> {
        let url = self.url(&[index])?;
        let body = json!({ "mappings": { "properties": properties } });

        let response = self
            .http
            .put(url)
            .json(&body)
            .send()
            .await
            .map_err(transport_error)?;

        if response.status() == StatusCode::BAD_REQUEST {
            let text = response.bytes().await.map_err(transport_error)?;
            if String::from_utf8_lossy(&text).contains("resource_already_exists_exception") {
                tracing::debug!(index = index, "Index already exists");
                return Ok(());
            }
            return Err(StoreError::Backend(format!(
                "create index {} rejected: {}",
                index,
                String::from_utf8_lossy(&text)
            )));
        }

        read_body(response).await?;
        tracing::info!(index = index, "Index created");
        Ok(())
    }

    /// Index `document` under `id`, replacing any previous version
    ///
    /// Waits for the next refresh so the write is visible to searches.
    pub async fn put_document<T>(&self, index: &str, id: &str, document: &T) -> Result<(), StoreError>
    where
        T: Serialize + ?Sized,
    {
        let url = self.url(&[index, "_doc", id])?;

        let response = self
            .http
            .put(url)
            .query(&[("refresh", "wait_for")])
            .json(document)
            .send()
            .await
            .map_err(transport_error)?;

        read_body(response).await?;
        Ok(())
    }

    /// Delete the document `id`. Returns `false` if it did not exist.
    pub async fn delete_document(&self, index: &str, id: &str) -> Result<bool, StoreError> {
        let url = self.url(&[index, "_doc", id])?;

        let response = self
            .http
            .delete(url)
            .query(&[("refresh", "wait_for")])
            .send()
            .await
            .map_err(transport_error)?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(false);
        }

        read_body(response).await?;
        Ok(true)
    }

    /// Sources of every document whose `field` exactly equals `value`
    pub async fn search_term<T>(&self, index: &str, field: &str, value: &str) -> Result<Vec<T>, StoreError>
    where
        T: DeserializeOwned,
    {
        let url = self.url(&[index, "_search"])?;
        let body = json!({
            "size": MAX_SEARCH_SIZE,
            "query": { "term": { field: value } }
        });

        let response = self
            .http
            .post(url)
            .json(&body)
            .send()
            .await
            .map_err(transport_error)?;

        // Searching an index that was never created means no documents yet
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(Vec::new());
        }

        let bytes = read_body(response).await?;
        let parsed: SearchResponse<T> = serde_json::from_slice(&bytes)
            .map_err(|e| StoreError::Backend(format!("malformed search response: {}", e)))?;

        Ok(parsed.hits.hits.into_iter().map(|hit| hit.source).collect())
    }

    fn url(&self, segments: &[&str]) -> Result<Url, StoreError> {
        let mut url = self.base_url.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|_| StoreError::InvalidInput("index url cannot be a base".into()))?;
            path.pop_if_empty();
            for segment in segments {
                path.push(segment);
            }
        }
        Ok(url)
    }
}

fn transport_error(e: reqwest::Error) -> StoreError {
    StoreError::Unavailable(e.to_string())
}

async fn read_body(response: Response) -> Result<Bytes, StoreError> {
    let status = response.status();
    let body = response.bytes().await.map_err(transport_error)?;

    if status.is_success() {
        Ok(body)
    } else if status.is_server_error() {
        Err(StoreError::Unavailable(format!(
            "{}: {}",
            status,
            String::from_utf8_lossy(&body)
        )))
    } else {
        Err(StoreError::Backend(format!(
            "{}: {}",
            status,
            String::from_utf8_lossy(&body)
        )))
    }
}
