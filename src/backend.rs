//! Search backend interface.
//!
//! The query engine needs only two capabilities from the search cluster: counting the documents
//! matching a query, and running a search that returns aggregations. [SearchBackend] captures
//! these so that the engine can be driven by a real cluster or a stub.

use crate::error::QueryError;

use async_trait::async_trait;
use hashbrown::HashMap;
use serde::Deserialize;
use serde_json::{Map, Value};

/// Search backend trait.
///
/// Implementations must be safe to share between concurrent requests.
#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// Count the documents in `index` matching `body`.
    ///
    /// # Arguments
    ///
    /// * `index`: Name of the index to query
    /// * `body`: Request body containing a `query`
    async fn count(&self, index: &str, body: &Value) -> Result<u64, QueryError>;

    /// Run a search against `index`.
    ///
    /// # Arguments
    ///
    /// * `index`: Name of the index to query
    /// * `body`: Request body, typically containing `aggs`
    async fn search(&self, index: &str, body: &Value) -> Result<SearchResponse, QueryError>;
}

/// Response to a count request.
#[derive(Debug, Deserialize)]
pub struct CountResponse {
    pub count: u64,
}

/// Response to a search request.
///
/// Only aggregations are of interest; hits are ignored.
#[derive(Debug, Default, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub aggregations: HashMap<String, AggregationResult>,
}

impl SearchResponse {
    /// Look up an aggregation result by name.
    pub fn aggregation(&self, name: &str) -> Result<&AggregationResult, QueryError> {
        self.aggregations
            .get(name)
            .ok_or_else(|| QueryError::MissingAggregation {
                name: name.to_string(),
            })
    }
}

/// Result of a single named aggregation.
///
/// Metric aggregations (e.g. `sum`) populate `value`. Composite aggregations populate `buckets`
/// and, while more pages remain, `after_key`.
#[derive(Debug, Default, Deserialize)]
pub struct AggregationResult {
    #[serde(default)]
    pub value: Option<f64>,
    #[serde(default)]
    pub buckets: Vec<CompositeBucket>,
    #[serde(default)]
    pub after_key: Option<Map<String, Value>>,
}

/// A bucket of a composite aggregation.
///
/// The key maps each composite source name to the value of that source for the bucket.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct CompositeBucket {
    pub key: Map<String, Value>,
    pub doc_count: u64,
}
