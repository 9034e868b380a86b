//! Elasticsearch implementation of [SearchBackend].

use crate::backend::{CountResponse, SearchBackend, SearchResponse};
use crate::cli::CommandLineArgs;
use crate::error::QueryError;
use crate::metrics::BACKEND_REQUESTS;
use crate::query::RequestKind;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use url::Url;

/// Elasticsearch client.
///
/// Wraps a [reqwest::Client], which pools connections and is cheap to share. A single client is
/// created at startup and used by every request.
#[derive(Debug)]
pub struct ElasticsearchClient {
    reqwest_client: reqwest::Client,
    /// Base URL of the cluster
    url: Url,
}

impl ElasticsearchClient {
    /// Create a new Elasticsearch client.
    ///
    /// # Arguments
    ///
    /// * `url`: Base URL of the cluster
    /// * `timeout`: Optional timeout applied to each request
    pub fn new(url: Url, timeout: Option<Duration>) -> Result<Self, QueryError> {
        let builder = reqwest::Client::builder();
        let builder = match timeout {
            Some(timeout) => builder.timeout(timeout),
            None => builder,
        };
        Ok(Self {
            reqwest_client: builder.build()?,
            url,
        })
    }

    /// Create a client from command line arguments.
    pub fn from_args(args: &CommandLineArgs) -> Result<Self, QueryError> {
        Self::new(
            args.elasticsearch_url.clone(),
            args.backend_timeout.map(Duration::from_secs),
        )
    }

    /// Returns the URL of an endpoint of an index, e.g. `<url>/ceda-fbi/_count`.
    fn endpoint(&self, index: &str, endpoint: &str) -> Url {
        let mut url = self.url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(index).push(endpoint);
        }
        url
    }

    /// POST a JSON body to an index endpoint and decode the response.
    #[tracing::instrument(level = "DEBUG", skip(self, body))]
    async fn post<T: DeserializeOwned>(
        &self,
        index: &str,
        kind: RequestKind,
        body: &Value,
    ) -> Result<T, QueryError> {
        let endpoint = match kind {
            RequestKind::Count => "_count",
            RequestKind::Search => "_search",
        };
        BACKEND_REQUESTS
            .with_label_values(&[index, &kind.to_string()])
            .inc();
        let response = self
            .reqwest_client
            .post(self.endpoint(index, endpoint))
            .json(body)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            tracing::warn!(index, %status, "Search backend request failed");
            return Err(QueryError::BackendStatus {
                index: index.to_string(),
                status: status.as_u16(),
            });
        }
        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

#[async_trait]
impl SearchBackend for ElasticsearchClient {
    async fn count(&self, index: &str, body: &Value) -> Result<u64, QueryError> {
        let response: CountResponse = self.post(index, RequestKind::Count, body).await?;
        Ok(response.count)
    }

    async fn search(&self, index: &str, body: &Value) -> Result<SearchResponse, QueryError> {
        self.post(index, RequestKind::Search, body).await
    }
}
