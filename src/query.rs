//! Query construction.
//!
//! Pure functions mapping a metric and an optional [ArchivePath] to the request bodies sent to the
//! search backend. Every query built here follows the same filter policy: when a path is present
//! the query is scoped to it, and when absent the query matches everything.

use crate::path::ArchivePath;

use serde_json::{json, Map, Value};
use strum_macros::Display;

/// Field holding the analysed directory of a file document.
pub const FILE_DIRECTORY_FIELD: &str = "info.directory.analyzed";
/// Field holding the size in bytes of a file document.
pub const FILE_SIZE_FIELD: &str = "info.size";
/// Field holding the format of a file document.
pub const FILE_FORMAT_FIELD: &str = "info.type.keyword";
/// Field holding the best name of each variable in a file document.
pub const VARIABLE_NAME_FIELD: &str = "info.phenomena.best_name.keyword";
/// Field present on file documents with aggregated variable strings.
pub const VARIABLE_EXISTS_FIELD: &str = "info.phenomena.agg_string";
/// Field present on file documents with physical parameters.
pub const PARAMETERS_FIELD: &str = "info.phenomena";
/// Field holding the path of a directory document.
pub const DIRECTORY_PATH_FIELD: &str = "archive_path.keyword";
/// Field holding the depth of a directory document.
pub const DIRECTORY_DEPTH_FIELD: &str = "depth";

/// Name of the sum aggregation used for total file size.
pub const TOTAL_SIZE_AGGREGATION: &str = "total_size";

/// The aggregate questions that may be asked about a path.
#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
#[strum(serialize_all = "snake_case")]
pub enum MetricKind {
    /// Number of files and directories
    Count,
    /// Total size of files
    TotalSize,
    /// Distribution of file formats
    Formats,
    /// Distribution of aggregated variables
    AggVariables,
    /// Percentage of files with physical parameters
    Coverage,
}

impl MetricKind {
    /// Every metric, in route order.
    pub const ALL: [MetricKind; 5] = [
        MetricKind::Count,
        MetricKind::TotalSize,
        MetricKind::Formats,
        MetricKind::AggVariables,
        MetricKind::Coverage,
    ];
}

/// The two indices addressed by queries.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Index {
    /// One document per archived file
    Files,
    /// One document per archive directory
    Directories,
}

/// Kind of backend round-trip.
#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
#[strum(serialize_all = "lowercase")]
pub enum RequestKind {
    Count,
    Search,
}

/// A single request to the search backend.
#[derive(Clone, Debug, PartialEq)]
pub struct BackendQuery {
    pub index: Index,
    pub kind: RequestKind,
    pub body: Value,
}

impl BackendQuery {
    fn count(index: Index, body: Value) -> Self {
        Self {
            index,
            kind: RequestKind::Count,
            body,
        }
    }

    fn search(index: Index, body: Value) -> Self {
        Self {
            index,
            kind: RequestKind::Search,
            body,
        }
    }
}

/// A composite aggregation over a single terms source.
///
/// Composite aggregations return their buckets a page at a time. The request for the next page
/// carries the `after_key` returned with the previous one.
#[derive(Clone, Debug, PartialEq)]
pub struct CompositeAggregation {
    /// Name of the aggregation in the request and response
    pub name: &'static str,
    /// Name of the terms source, used as the bucket key
    pub source: &'static str,
    /// Field to group on
    pub field: &'static str,
    /// Number of buckets per page
    pub page_size: u32,
}

impl CompositeAggregation {
    /// Composite aggregation grouping files by format.
    pub fn formats(page_size: u32) -> Self {
        Self {
            name: "group_by_format",
            source: "format",
            field: FILE_FORMAT_FIELD,
            page_size,
        }
    }

    /// Composite aggregation grouping files by variable name.
    pub fn agg_variables(page_size: u32) -> Self {
        Self {
            name: "group_by_agg_string",
            source: "agg_string",
            field: VARIABLE_NAME_FIELD,
            page_size,
        }
    }

    /// Build the search body requesting one page of buckets.
    ///
    /// # Arguments
    ///
    /// * `path`: Optional path to scope the files by
    /// * `after`: Continuation key from the previous page, or `None` for the first page
    pub fn page_body(
        &self,
        path: Option<&ArchivePath>,
        after: Option<&Map<String, Value>>,
    ) -> Value {
        let mut composite = json!({
            "size": self.page_size,
            "sources": [
                { self.source: { "terms": { "field": self.field } } }
            ]
        });
        if let Some(after) = after {
            composite["after"] = Value::Object(after.clone());
        }
        json!({
            "size": 0,
            "query": file_filter(path),
            "aggs": { self.name: { "composite": composite } }
        })
    }
}

/// Settings that shape queries.
#[derive(Clone, Debug)]
pub struct QuerySettings {
    /// Name of the file index
    pub file_index: String,
    /// Name of the directory index
    pub directory_index: String,
    /// Number of buckets per composite aggregation page
    pub page_size: u32,
}

impl QuerySettings {
    /// Returns the name of an index.
    pub fn index_name(&self, index: Index) -> &str {
        match index {
            Index::Files => &self.file_index,
            Index::Directories => &self.directory_index,
        }
    }
}

impl Default for QuerySettings {
    fn default() -> Self {
        Self {
            file_index: "ceda-fbi".to_string(),
            directory_index: "ceda-dirs".to_string(),
            page_size: 100,
        }
    }
}

/// Query clause selecting file documents under a path.
pub fn file_filter(path: Option<&ArchivePath>) -> Value {
    match path {
        Some(path) => json!({ "match_phrase_prefix": { FILE_DIRECTORY_FIELD: path.as_str() } }),
        None => json!({ "match_all": {} }),
    }
}

/// Query clause selecting file documents under a path that have `field`.
pub fn file_filter_with_field(path: Option<&ArchivePath>, field: &str) -> Value {
    json!({
        "bool": {
            "must": [file_filter(path)],
            "filter": { "exists": { "field": field } }
        }
    })
}

/// Minimum depth of the directories below a path.
///
/// A directory is below `path` when its depth is at least one more than the depth of `path`, so
/// the root gives 1 and `/a/b` gives 3.
pub fn minimum_depth(path: &ArchivePath) -> usize {
    1 + path.depth()
}

/// Query clause selecting directory documents below a path.
pub fn directory_filter(path: Option<&ArchivePath>) -> Value {
    match path {
        Some(path) => json!({
            "bool": {
                "must": [
                    { "prefix": { DIRECTORY_PATH_FIELD: { "value": path.as_str() } } }
                ],
                "filter": [
                    { "range": { DIRECTORY_DEPTH_FIELD: { "gte": minimum_depth(path) } } }
                ]
            }
        }),
        None => json!({ "match_all": {} }),
    }
}

/// Search body summing file sizes under a path.
pub fn total_size_body(path: Option<&ArchivePath>) -> Value {
    json!({
        "size": 0,
        "query": file_filter(path),
        "aggs": { TOTAL_SIZE_AGGREGATION: { "sum": { "field": FILE_SIZE_FIELD } } }
    })
}

/// A composite aggregation paged over an index.
#[derive(Clone, Debug, PartialEq)]
pub struct PagedQuery {
    pub index: Index,
    pub aggregation: CompositeAggregation,
}

impl PagedQuery {
    fn files(aggregation: CompositeAggregation) -> Self {
        Self {
            index: Index::Files,
            aggregation,
        }
    }
}

/// The backend requests answering one metric, in the order they must be issued.
#[derive(Clone, Debug, PartialEq)]
pub enum QueryPlan {
    Count {
        files: BackendQuery,
        directories: BackendQuery,
    },
    TotalSize {
        sum: BackendQuery,
    },
    Formats {
        formats: PagedQuery,
    },
    AggVariables {
        documents: BackendQuery,
        variables: PagedQuery,
    },
    /// The total is counted before the parameter files.
    Coverage {
        total: BackendQuery,
        parameters: BackendQuery,
    },
}

/// Build the backend queries needed to answer `metric` for `path`.
///
/// Grouped metrics return a [PagedQuery]; its pages are requested by the paginator.
///
/// # Arguments
///
/// * `metric`: The metric to build queries for
/// * `path`: Optional path to scope the queries by
/// * `settings`: Query settings
pub fn build(
    metric: MetricKind,
    path: Option<&ArchivePath>,
    settings: &QuerySettings,
) -> QueryPlan {
    match metric {
        MetricKind::Count => QueryPlan::Count {
            files: BackendQuery::count(Index::Files, json!({ "query": file_filter(path) })),
            directories: BackendQuery::count(
                Index::Directories,
                json!({ "query": directory_filter(path) }),
            ),
        },
        MetricKind::TotalSize => QueryPlan::TotalSize {
            sum: BackendQuery::search(Index::Files, total_size_body(path)),
        },
        MetricKind::Formats => QueryPlan::Formats {
            formats: PagedQuery::files(CompositeAggregation::formats(settings.page_size)),
        },
        MetricKind::AggVariables => QueryPlan::AggVariables {
            documents: BackendQuery::count(
                Index::Files,
                json!({ "query": file_filter_with_field(path, VARIABLE_EXISTS_FIELD) }),
            ),
            variables: PagedQuery::files(CompositeAggregation::agg_variables(settings.page_size)),
        },
        MetricKind::Coverage => QueryPlan::Coverage {
            total: BackendQuery::count(Index::Files, json!({ "query": file_filter(path) })),
            parameters: BackendQuery::count(
                Index::Files,
                json!({ "query": file_filter_with_field(path, PARAMETERS_FIELD) }),
            ),
        },
    }
}
