//! The five aggregate queries.
//!
//! Each query normalizes the requested path, builds the queries for its metric, runs them
//! against the backend in order and assembles the response. Queries never retry: a backend
//! failure fails the whole query.

use crate::assembler;
use crate::backend::SearchBackend;
use crate::error::QueryError;
use crate::models::{Bucket, MetricResult};
use crate::paginator::paginate_all;
use crate::path::{self, ArchivePath};
use crate::query::{self, BackendQuery, MetricKind, PagedQuery, QueryPlan, QuerySettings};

use std::sync::Arc;

/// Answers aggregate questions about the archive.
#[derive(Clone)]
pub struct QueryDispatcher {
    /// Backend client shared by all requests
    backend: Arc<dyn SearchBackend>,
    settings: QuerySettings,
}

impl QueryDispatcher {
    /// Create a dispatcher.
    ///
    /// # Arguments
    ///
    /// * `backend`: Shared search backend client
    /// * `settings`: Query settings
    pub fn new(backend: Arc<dyn SearchBackend>, settings: QuerySettings) -> Self {
        Self { backend, settings }
    }

    /// Answer `metric` for the files and directories under a path.
    ///
    /// # Arguments
    ///
    /// * `metric`: The question to answer
    /// * `raw_path`: Optional path as supplied by the caller. `None` covers the whole archive.
    #[tracing::instrument(level = "DEBUG", skip(self))]
    pub async fn query(
        &self,
        metric: MetricKind,
        raw_path: Option<&str>,
    ) -> Result<MetricResult, QueryError> {
        let path = path::normalize(raw_path);
        let result = match query::build(metric, path.as_ref(), &self.settings) {
            QueryPlan::Count { files, directories } => {
                let files = self.count(&files).await?;
                let directories = self.count(&directories).await?;
                MetricResult::Counts(assembler::counts(path, files, directories))
            }
            QueryPlan::TotalSize { sum } => {
                let response = self
                    .backend
                    .search(self.settings.index_name(sum.index), &sum.body)
                    .await?;
                MetricResult::TotalSize(assembler::total_size(path, &response)?)
            }
            QueryPlan::Formats { formats } => {
                let formats = self.paginate(&formats, path.as_ref()).await?;
                MetricResult::Formats(assembler::formats(path, formats))
            }
            QueryPlan::AggVariables {
                documents,
                variables,
            } => {
                let number_of_documents = self.count(&documents).await?;
                let variables = self.paginate(&variables, path.as_ref()).await?;
                MetricResult::AggVariables(assembler::agg_variables(
                    path,
                    number_of_documents,
                    variables,
                ))
            }
            QueryPlan::Coverage { total, parameters } => {
                let total_files = self.count(&total).await?;
                let parameter_files = self.count(&parameters).await?;
                MetricResult::Coverage(assembler::coverage(path, total_files, parameter_files))
            }
        };
        Ok(result)
    }

    async fn count(&self, query: &BackendQuery) -> Result<u64, QueryError> {
        self.backend
            .count(self.settings.index_name(query.index), &query.body)
            .await
    }

    /// Page through a composite aggregation.
    async fn paginate(
        &self,
        paged: &PagedQuery,
        path: Option<&ArchivePath>,
    ) -> Result<Vec<Bucket>, QueryError> {
        paginate_all(
            self.backend.as_ref(),
            self.settings.index_name(paged.index),
            &paged.aggregation,
            path,
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Counts;
    use crate::query::RequestKind;
    use crate::test_utils::{composite_page, StubBackend};

    use serde_json::{json, Value};

    fn dispatcher(backend: &Arc<StubBackend>) -> QueryDispatcher {
        QueryDispatcher::new(backend.clone(), QuerySettings::default())
    }

    async fn counts(backend: &Arc<StubBackend>, raw_path: Option<&str>) -> Counts {
        match dispatcher(backend).query(MetricKind::Count, raw_path).await {
            Ok(MetricResult::Counts(counts)) => counts,
            other => panic!("expected counts, got {:?}", other),
        }
    }

    async fn json_result(backend: &Arc<StubBackend>, metric: MetricKind, raw_path: &str) -> Value {
        let result = dispatcher(backend).query(metric, Some(raw_path)).await.unwrap();
        serde_json::to_value(&result).unwrap()
    }

    #[tokio::test]
    async fn counts_with_path() {
        let backend = Arc::new(StubBackend::new().with_count(1000).with_count(50));
        let counts = counts(&backend, Some("/badc/data")).await;
        assert_eq!(
            json!({"path": "/badc/data", "files": 1000, "directories": 50}),
            serde_json::to_value(&counts).unwrap()
        );
        let requests = backend.requests();
        assert_eq!(2, requests.len());
        assert_eq!("ceda-fbi", requests[0].index);
        assert_eq!("ceda-dirs", requests[1].index);
        assert_eq!(
            json!(3),
            requests[1].body["query"]["bool"]["filter"][0]["range"]["depth"]["gte"]
        );
    }

    #[tokio::test]
    async fn counts_without_path() {
        let backend = Arc::new(StubBackend::new().with_count(7).with_count(2));
        let counts = counts(&backend, None).await;
        assert_eq!(None, counts.path);
        assert_eq!(7, counts.files);
        assert_eq!(2, counts.directories);
        for request in backend.requests() {
            assert_eq!(json!({"query": {"match_all": {}}}), request.body);
        }
    }

    #[tokio::test]
    async fn counts_root_is_scoped() {
        let backend = Arc::new(StubBackend::new().with_count(7).with_count(2));
        let counts = counts(&backend, Some("//")).await;
        assert_eq!("/", counts.path.unwrap().as_str());
        let requests = backend.requests();
        assert_eq!(
            json!(1),
            requests[1].body["query"]["bool"]["filter"][0]["range"]["depth"]["gte"]
        );
    }

    #[tokio::test]
    async fn total_size() {
        let backend = Arc::new(StubBackend::new().with_search(json!({
            "aggregations": {"total_size": {"value": 4096.0}}
        })));
        assert_eq!(
            json!({"path": "/neodc", "total_file_size": 4096}),
            json_result(&backend, MetricKind::TotalSize, "neodc/").await
        );
        assert_eq!(RequestKind::Search, backend.requests()[0].kind);
    }

    #[tokio::test]
    async fn total_size_of_nothing() {
        let backend = Arc::new(StubBackend::new().with_search(json!({
            "aggregations": {"total_size": {"value": 0.0}}
        })));
        assert_eq!(
            json!({"path": "/x", "total_file_size": 0}),
            json_result(&backend, MetricKind::TotalSize, "/x").await
        );
    }

    #[tokio::test]
    async fn formats_single_page_without_path() {
        let backend = Arc::new(StubBackend::new().with_search(composite_page(
            "group_by_format",
            "format",
            &[("NetCDF".to_string(), 500), ("HDF5".to_string(), 20)],
            true,
        )));
        let formats = dispatcher(&backend)
            .query(MetricKind::Formats, None)
            .await
            .unwrap();
        assert_eq!(
            json!({
                "path": null,
                "formats": [
                    {"key": "NetCDF", "doc_count": 500},
                    {"key": "HDF5", "doc_count": 20}
                ]
            }),
            serde_json::to_value(&formats).unwrap()
        );
        let requests = backend.requests();
        assert_eq!(1, requests.len());
        assert_eq!("ceda-fbi", requests[0].index);
        assert_eq!(
            json!(100),
            requests[0].body["aggs"]["group_by_format"]["composite"]["size"]
        );
    }

    #[tokio::test]
    async fn agg_variables_counts_then_pages() {
        let settings = QuerySettings {
            page_size: 1,
            ..Default::default()
        };
        let backend = Arc::new(
            StubBackend::new()
                .with_count(12)
                .with_search(composite_page(
                    "group_by_agg_string",
                    "agg_string",
                    &[("air_temperature".to_string(), 10)],
                    true,
                ))
                .with_search(composite_page(
                    "group_by_agg_string",
                    "agg_string",
                    &[("precipitation_flux".to_string(), 4)],
                    true,
                ))
                .with_search(composite_page("group_by_agg_string", "agg_string", &[], false)),
        );
        let variables = QueryDispatcher::new(backend.clone(), settings)
            .query(MetricKind::AggVariables, Some("/badc"))
            .await
            .unwrap();
        assert_eq!(
            json!({
                "path": "/badc",
                "number_of_documents": 12,
                "agg_variables": [
                    {"key": "air_temperature", "doc_count": 10},
                    {"key": "precipitation_flux", "doc_count": 4}
                ]
            }),
            serde_json::to_value(&variables).unwrap()
        );
        let requests = backend.requests();
        let kinds: Vec<RequestKind> = requests.iter().map(|r| r.kind).collect();
        assert_eq!(
            vec![
                RequestKind::Count,
                RequestKind::Search,
                RequestKind::Search,
                RequestKind::Search
            ],
            kinds
        );
        // Pages use the page size from the settings.
        assert_eq!(
            json!(1),
            requests[1].body["aggs"]["group_by_agg_string"]["composite"]["size"]
        );
    }

    #[tokio::test]
    async fn coverage() {
        let backend = Arc::new(StubBackend::new().with_count(200).with_count(57));
        assert_eq!(
            json!({
                "path": "/badc",
                "total_files": 200,
                "parameter_files": 57,
                "percentage_coverage": 28.5
            }),
            json_result(&backend, MetricKind::Coverage, "/badc").await
        );
        let requests = backend.requests();
        assert_eq!(
            None,
            requests[0].body["query"].get("bool"),
            "total must be requested first"
        );
        assert_eq!(
            json!({"exists": {"field": "info.phenomena"}}),
            requests[1].body["query"]["bool"]["filter"]
        );
    }

    #[tokio::test]
    async fn coverage_of_empty_path() {
        let backend = Arc::new(StubBackend::new().with_count(0).with_count(0));
        let coverage = json_result(&backend, MetricKind::Coverage, "/empty").await;
        assert_eq!(json!(0.0), coverage["percentage_coverage"]);
    }

    #[tokio::test]
    async fn backend_failure_fails_query() {
        let backend = Arc::new(StubBackend::new().with_count(1000));
        let err = dispatcher(&backend)
            .query(MetricKind::Count, Some("/badc"))
            .await
            .unwrap_err();
        assert!(matches!(err, QueryError::BackendStatus { status: 503, .. }));
        // No retry.
        assert_eq!(2, backend.requests().len());
    }
}
