//! Low-level record store client.

use crate::config::StoreConfig;
use crate::error::{Result, StoreError};
use crate::filter::Filter;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::time::Duration;
use tracing::{debug, warn};

/// Sort direction for list requests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    fn as_str(self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

/// Sort specification for list requests
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec {
    /// Field to sort by
    pub field: String,

    /// Direction
    pub direction: SortDirection,
}

impl SortSpec {
    /// Ascending sort on a field
    pub fn ascending(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Asc,
        }
    }
}

/// Options for a list request
#[derive(Debug, Clone, Default)]
pub struct ListOptions {
    /// Filter formula
    pub filter: Option<Filter>,

    /// Sort order
    pub sort: Option<SortSpec>,
}

impl ListOptions {
    /// No filter, no sort
    pub fn none() -> Self {
        Self::default()
    }

    /// Filter only
    pub fn filtered(filter: Filter) -> Self {
        Self {
            filter: Some(filter),
            sort: None,
        }
    }

    /// Sort only
    pub fn sorted(sort: SortSpec) -> Self {
        Self {
            filter: None,
            sort: Some(sort),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ListPage {
    records: Vec<chorus_core::Record>,
    offset: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RecordBatch {
    records: Vec<chorus_core::Record>,
}

/// Client for the hosted tabular record store.
///
/// Reads follow continuation cursors transparently, so callers always see
/// complete result sets. Any non-success response surfaces as
/// [`StoreError::Api`] with the remote message; callers must not assume
/// partial success of a failed call.
pub struct RecordStoreClient {
    http: Client,
    config: StoreConfig,
}

impl RecordStoreClient {
    /// Create a client, validating and normalizing the base URL.
    pub fn new(config: StoreConfig) -> Result<Self> {
        if config.base_url.is_empty() {
            return Err(StoreError::InvalidUrl("URL cannot be empty".into()));
        }
        let base_url = config.base_url.trim_end_matches('/').to_string();
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(StoreError::InvalidUrl(
                "URL must start with http:// or https://".into(),
            ));
        }

        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(format!("ChorusPlayer/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(StoreError::Request)?;

        Ok(Self {
            http,
            config: StoreConfig { base_url, ..config },
        })
    }

    /// The configured store settings.
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    fn table_url(&self, table: &str) -> String {
        format!(
            "{}/{}/{}",
            self.config.base_url,
            self.config.workspace,
            urlencoding::encode(table)
        )
    }

    /// List records in a table, following continuation cursors until the
    /// result set is exhausted.
    pub async fn list(&self, table: &str, options: &ListOptions) -> Result<Vec<chorus_core::Record>> {
        let url = self.table_url(table);
        let mut records = Vec::new();
        let mut offset: Option<String> = None;

        loop {
            let mut query: Vec<(String, String)> = Vec::new();
            if let Some(filter) = &options.filter {
                query.push(("filterByFormula".into(), filter.to_formula()));
            }
            if let Some(sort) = &options.sort {
                query.push(("sort[0][field]".into(), sort.field.clone()));
                query.push(("sort[0][direction]".into(), sort.direction.as_str().into()));
            }
            if let Some(cursor) = &offset {
                query.push(("offset".into(), cursor.clone()));
            }

            let response = self
                .http
                .get(&url)
                .bearer_auth(&self.config.token)
                .query(&query)
                .send()
                .await
                .map_err(classify_transport)?;

            let page: ListPage = check(response).await?;
            records.extend(page.records);

            match page.offset {
                Some(cursor) => offset = Some(cursor),
                None => break,
            }
        }

        debug!(table, count = records.len(), "Listed records");
        Ok(records)
    }

    /// Fetch a single record by id.
    pub async fn get(&self, table: &str, id: &str) -> Result<chorus_core::Record> {
        let url = format!("{}/{}", self.table_url(table), id);
        let response = self
            .http
            .get(&url)
            .bearer_auth(&self.config.token)
            .send()
            .await
            .map_err(classify_transport)?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(StoreError::RecordNotFound(id.to_string()));
        }
        check(response).await
    }

    /// Create one record and return the stored row.
    pub async fn create(
        &self,
        table: &str,
        fields: Map<String, Value>,
    ) -> Result<chorus_core::Record> {
        let url = self.table_url(table);
        let body = serde_json::json!({ "records": [{ "fields": fields }] });

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.config.token)
            .json(&body)
            .send()
            .await
            .map_err(classify_transport)?;

        let batch: RecordBatch = check(response).await?;
        batch
            .records
            .into_iter()
            .next()
            .ok_or_else(|| StoreError::Parse("create returned no records".into()))
    }

    /// Patch the given fields of one record and return the stored row.
    pub async fn update(
        &self,
        table: &str,
        id: &str,
        fields: Map<String, Value>,
    ) -> Result<chorus_core::Record> {
        let url = self.table_url(table);
        let body = serde_json::json!({ "records": [{ "id": id, "fields": fields }] });

        let response = self
            .http
            .patch(&url)
            .bearer_auth(&self.config.token)
            .json(&body)
            .send()
            .await
            .map_err(classify_transport)?;

        let batch: RecordBatch = check(response).await?;
        batch
            .records
            .into_iter()
            .next()
            .ok_or_else(|| StoreError::Parse("update returned no records".into()))
    }
}

fn classify_transport(e: reqwest::Error) -> StoreError {
    if e.is_connect() || e.is_timeout() {
        StoreError::Unreachable(e.to_string())
    } else {
        StoreError::Request(e)
    }
}

/// Turn a non-success response into `StoreError::Api` with the remote
/// message, otherwise deserialize the body.
async fn check<T: serde::de::DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    let status = response.status();
    if status.is_success() {
        response
            .json::<T>()
            .await
            .map_err(|e| StoreError::Parse(e.to_string()))
    } else {
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<Value>(&body)
            .ok()
            .and_then(|v| {
                v.get("error")?
                    .get("message")
                    .and_then(Value::as_str)
                    .map(String::from)
            })
            .unwrap_or(body);
        warn!(status = status.as_u16(), %message, "Store returned an error");
        Err(StoreError::Api {
            status: status.as_u16(),
            message,
        })
    }
}
