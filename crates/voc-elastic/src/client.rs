//! HTTP client for the Elasticsearch REST API.
//!
//! Wraps `reqwest` with API-key auth, status checking, and typed decoding of
//! the ES|QL and bulk responses. Every non-2xx answer surfaces as
//! [`ElasticError::UnexpectedStatus`] unless a method documents otherwise.

use std::time::Duration;

use reqwest::{Client, RequestBuilder, Response, StatusCode, Url};
use serde::{Deserialize, Serialize};
use voc_core::ElasticSettings;

use crate::error::ElasticError;

/// Column descriptor in an ES|QL response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryColumn {
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
}

/// Tabular ES|QL response: `{columns: [{name}], values: [[...]]}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryResult {
    pub columns: Vec<QueryColumn>,
    #[serde(default)]
    pub values: Vec<Vec<serde_json::Value>>,
}

impl QueryResult {
    /// Position of the named column, if the query returned it.
    #[must_use]
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }
}

/// Outcome of a `_bulk` upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BulkReport {
    pub indexed: usize,
    pub failed: usize,
}

#[derive(Serialize)]
struct QueryRequest<'a> {
    query: &'a str,
}

#[derive(Deserialize)]
struct CountResponse {
    count: u64,
}

#[derive(Deserialize)]
struct BulkResponse {
    #[serde(default)]
    errors: bool,
    #[serde(default)]
    items: Vec<serde_json::Map<String, serde_json::Value>>,
}

/// Client for one Elasticsearch deployment.
///
/// Use [`ElasticClient::new`] with loaded settings, or
/// [`ElasticClient::with_base_url`] to point at a mock server in tests.
#[derive(Debug, Clone)]
pub struct ElasticClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl ElasticClient {
    /// Creates a client from application settings.
    ///
    /// # Errors
    ///
    /// Returns [`ElasticError::InvalidBaseUrl`] for an unparseable base URL, or
    /// [`ElasticError::Http`] if the `reqwest::Client` cannot be built.
    pub fn new(settings: &ElasticSettings) -> Result<Self, ElasticError> {
        Self::with_base_url(
            &settings.base_url,
            &settings.api_key,
            settings.request_timeout_secs,
        )
    }

    /// Creates a client with an explicit base URL.
    ///
    /// # Errors
    ///
    /// Returns [`ElasticError::InvalidBaseUrl`] for an unparseable base URL, or
    /// [`ElasticError::Http`] if the `reqwest::Client` cannot be built.
    pub fn with_base_url(
        base_url: &str,
        api_key: &str,
        timeout_secs: u64,
    ) -> Result<Self, ElasticError> {
        let trimmed = base_url.trim_end_matches('/');
        Url::parse(trimmed).map_err(|e| ElasticError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("voc-radar/0.1 (review-analysis)")
            .build()?;

        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            base_url: trimmed.to_owned(),
        })
    }

    /// Runs an ES|QL query and returns its tabular result.
    ///
    /// # Errors
    ///
    /// - [`ElasticError::Http`] on network failure.
    /// - [`ElasticError::UnexpectedStatus`] on a non-2xx answer.
    /// - [`ElasticError::Deserialize`] if the body is not a columns/values table.
    pub async fn query(&self, esql: &str) -> Result<QueryResult, ElasticError> {
        let url = self.url("_query");
        tracing::debug!(query = esql, "running ES|QL query");

        let response = self
            .authorized(self.client.post(&url))
            .json(&QueryRequest { query: esql })
            .send()
            .await?;
        let response = check_status(response, &url).await?;

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| ElasticError::Deserialize {
            context: "ES|QL query result".to_string(),
            source: e,
        })
    }

    /// Writes `doc` into `index` under `id`.
    ///
    /// A `404` means the index is missing: it is created and the write is
    /// repeated exactly once.
    ///
    /// # Errors
    ///
    /// - [`ElasticError::Http`] on network failure.
    /// - [`ElasticError::UnexpectedStatus`] if the write (or the retry after
    ///   index creation) is rejected.
    pub async fn index_document<T: Serialize + ?Sized>(
        &self,
        index: &str,
        id: &str,
        doc: &T,
    ) -> Result<(), ElasticError> {
        let url = self.url(&format!("{index}/_doc/{id}"));

        let response = self
            .authorized(self.client.post(&url))
            .json(doc)
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            tracing::info!(index, "index missing; creating it before retrying write");
            self.create_index(index, None).await?;

            let retry = self
                .authorized(self.client.post(&url))
                .json(doc)
                .send()
                .await?;
            check_status(retry, &url).await?;
            return Ok(());
        }

        check_status(response, &url).await?;
        Ok(())
    }

    /// Creates `index`, optionally with a mapping body.
    ///
    /// An index that already exists counts as success.
    ///
    /// # Errors
    ///
    /// - [`ElasticError::Http`] on network failure.
    /// - [`ElasticError::UnexpectedStatus`] for any other rejection.
    pub async fn create_index(
        &self,
        index: &str,
        mapping: Option<&serde_json::Value>,
    ) -> Result<(), ElasticError> {
        let url = self.url(index);
        let empty = serde_json::json!({});
        let response = self
            .authorized(self.client.put(&url))
            .json(mapping.unwrap_or(&empty))
            .send()
            .await?;

        if response.status() == StatusCode::BAD_REQUEST {
            let body = response.text().await.unwrap_or_default();
            if body.contains("resource_already_exists_exception") {
                tracing::debug!(index, "index already exists");
                return Ok(());
            }
            return Err(ElasticError::UnexpectedStatus {
                status: StatusCode::BAD_REQUEST.as_u16(),
                url,
                body,
            });
        }

        check_status(response, &url).await?;
        Ok(())
    }

    /// Deletes `index`. A missing index is not an error.
    ///
    /// # Errors
    ///
    /// Returns [`ElasticError`] on network failure or any other rejection.
    pub async fn delete_index(&self, index: &str) -> Result<(), ElasticError> {
        let url = self.url(index);
        let response = self.authorized(self.client.delete(&url)).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(());
        }
        check_status(response, &url).await?;
        Ok(())
    }

    /// Returns whether `index` exists.
    ///
    /// # Errors
    ///
    /// Returns [`ElasticError`] on network failure or a status other than 200/404.
    pub async fn index_exists(&self, index: &str) -> Result<bool, ElasticError> {
        let url = self.url(index);
        let response = self.authorized(self.client.head(&url)).send().await?;
        match response.status() {
            StatusCode::NOT_FOUND => Ok(false),
            s if s.is_success() => Ok(true),
            s => Err(ElasticError::UnexpectedStatus {
                status: s.as_u16(),
                url,
                body: String::new(),
            }),
        }
    }

    /// Returns the number of documents in `index`.
    ///
    /// # Errors
    ///
    /// Returns [`ElasticError`] on network failure, rejection, or a malformed body.
    pub async fn count(&self, index: &str) -> Result<u64, ElasticError> {
        let url = self.url(&format!("{index}/_count"));
        let response = self.authorized(self.client.get(&url)).send().await?;
        let response = check_status(response, &url).await?;
        let body = response.text().await?;
        let parsed: CountResponse =
            serde_json::from_str(&body).map_err(|e| ElasticError::Deserialize {
                context: format!("_count({index})"),
                source: e,
            })?;
        Ok(parsed.count)
    }

    /// Uploads `docs` into `index` with a single `_bulk` request.
    ///
    /// Per-item failures do not fail the call; they are counted in the
    /// returned [`BulkReport`].
    ///
    /// # Errors
    ///
    /// Returns [`ElasticError`] on network failure, rejection of the whole
    /// request, or an unserializable document.
    pub async fn bulk_index<T: Serialize>(
        &self,
        index: &str,
        docs: &[T],
    ) -> Result<BulkReport, ElasticError> {
        if docs.is_empty() {
            return Ok(BulkReport::default());
        }

        let body = bulk_body(index, docs)?;
        let url = self.url("_bulk");
        let response = self
            .authorized(self.client.post(&url))
            .header(reqwest::header::CONTENT_TYPE, "application/x-ndjson")
            .body(body)
            .send()
            .await?;
        let response = check_status(response, &url).await?;

        let text = response.text().await?;
        let parsed: BulkResponse =
            serde_json::from_str(&text).map_err(|e| ElasticError::Deserialize {
                context: format!("_bulk({index})"),
                source: e,
            })?;

        let failed = if parsed.errors {
            parsed.items.iter().filter(|item| item_failed(item)).count()
        } else {
            0
        };
        if failed > 0 {
            tracing::warn!(index, failed, "bulk upload had per-item failures");
        }

        Ok(BulkReport {
            indexed: docs.len() - failed.min(docs.len()),
            failed,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url)
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        builder.header(
            reqwest::header::AUTHORIZATION,
            format!("ApiKey {}", self.api_key),
        )
    }
}

/// Builds the NDJSON body for `_bulk`: an action line then a source line per doc.
fn bulk_body<T: Serialize>(index: &str, docs: &[T]) -> Result<String, ElasticError> {
    let action = serde_json::json!({ "index": { "_index": index } }).to_string();
    let mut body = String::new();
    for doc in docs {
        let source = serde_json::to_string(doc).map_err(|e| ElasticError::Deserialize {
            context: format!("bulk document for {index}"),
            source: e,
        })?;
        body.push_str(&action);
        body.push('\n');
        body.push_str(&source);
        body.push('\n');
    }
    Ok(body)
}

fn item_failed(item: &serde_json::Map<String, serde_json::Value>) -> bool {
    item.values().any(|op| {
        op.get("error").is_some()
            || op
                .get("status")
                .and_then(serde_json::Value::as_u64)
                .is_some_and(|s| s >= 300)
    })
}

async fn check_status(response: Response, url: &str) -> Result<Response, ElasticError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(ElasticError::UnexpectedStatus {
        status: status.as_u16(),
        url: url.to_string(),
        body,
    })
}
