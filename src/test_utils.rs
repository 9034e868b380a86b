use crate::backend::{SearchBackend, SearchResponse};
use crate::error::QueryError;
use crate::query::RequestKind;

use async_trait::async_trait;
use serde_json::{json, Map, Value};
use std::collections::VecDeque;
use std::sync::Mutex;

/// A request received by a [StubBackend].
#[derive(Clone, Debug)]
pub(crate) struct RecordedRequest {
    pub index: String,
    pub kind: RequestKind,
    pub body: Value,
}

/// A search backend that replays scripted responses and records the requests it receives.
///
/// Count and search responses are consumed in the order they were added. A request with no
/// scripted response left fails as if the backend were unavailable.
#[derive(Default)]
pub(crate) struct StubBackend {
    counts: Mutex<VecDeque<u64>>,
    searches: Mutex<VecDeque<Value>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl StubBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the response to the next unanswered count request.
    pub fn with_count(self, count: u64) -> Self {
        self.counts.lock().unwrap().push_back(count);
        self
    }

    /// Script the response to the next unanswered search request.
    pub fn with_search(self, response: Value) -> Self {
        self.searches.lock().unwrap().push_back(response);
        self
    }

    /// Requests received so far.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    fn record(&self, index: &str, kind: RequestKind, body: &Value) {
        self.requests.lock().unwrap().push(RecordedRequest {
            index: index.to_string(),
            kind,
            body: body.clone(),
        });
    }

    fn unavailable(index: &str) -> QueryError {
        QueryError::BackendStatus {
            index: index.to_string(),
            status: 503,
        }
    }
}

#[async_trait]
impl SearchBackend for StubBackend {
    async fn count(&self, index: &str, body: &Value) -> Result<u64, QueryError> {
        self.record(index, RequestKind::Count, body);
        let count = self.counts.lock().unwrap().pop_front();
        count.ok_or_else(|| Self::unavailable(index))
    }

    async fn search(&self, index: &str, body: &Value) -> Result<SearchResponse, QueryError> {
        self.record(index, RequestKind::Search, body);
        let response = self.searches.lock().unwrap().pop_front();
        let response = response.ok_or_else(|| Self::unavailable(index))?;
        Ok(serde_json::from_value(response)?)
    }
}

/// Build a composite aggregation search response.
///
/// # Arguments
///
/// * `name`: Name of the aggregation
/// * `source`: Name of the composite source
/// * `buckets`: Key and document count of each bucket
/// * `after_key`: Whether to include an `after_key` pointing at the last bucket
pub(crate) fn composite_page(
    name: &str,
    source: &str,
    buckets: &[(String, u64)],
    after_key: bool,
) -> Value {
    let mut aggregation = Map::new();
    aggregation.insert(
        "buckets".to_string(),
        buckets
            .iter()
            .map(|(key, doc_count)| json!({"key": {source: key}, "doc_count": doc_count}))
            .collect(),
    );
    if let (true, Some((last, _))) = (after_key, buckets.last()) {
        aggregation.insert("after_key".to_string(), json!({ source: last }));
    }
    json!({
        "took": 1,
        "timed_out": false,
        "hits": {"total": {"value": 0, "relation": "eq"}, "max_score": null, "hits": []},
        "aggregations": { name: aggregation }
    })
}
