//! Response data types

use crate::path::ArchivePath;

use serde::Serialize;
use serde_json::Value;

/// One distinct value of a grouped field and the number of documents holding it
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Bucket {
    /// The grouped value, e.g. a format name
    pub key: Value,
    /// Number of documents with this value
    pub doc_count: u64,
}

/// Number of files and directories under a path
#[derive(Debug, PartialEq, Serialize)]
pub struct Counts {
    pub path: Option<ArchivePath>,
    pub files: u64,
    pub directories: u64,
}

/// Total size in bytes of files under a path
#[derive(Debug, PartialEq, Serialize)]
pub struct TotalSize {
    pub path: Option<ArchivePath>,
    pub total_file_size: u64,
}

/// Distribution of file formats under a path
#[derive(Debug, PartialEq, Serialize)]
pub struct Formats {
    pub path: Option<ArchivePath>,
    pub formats: Vec<Bucket>,
}

/// Distribution of aggregated variables under a path
#[derive(Debug, PartialEq, Serialize)]
pub struct AggVariables {
    pub path: Option<ArchivePath>,
    /// Number of files with aggregated variables
    pub number_of_documents: u64,
    pub agg_variables: Vec<Bucket>,
}

/// Proportion of files under a path that carry physical parameters
#[derive(Debug, PartialEq, Serialize)]
pub struct Coverage {
    pub path: Option<ArchivePath>,
    pub total_files: u64,
    pub parameter_files: u64,
    /// Percentage of `total_files` that are `parameter_files`, to two decimal places
    pub percentage_coverage: f64,
}

/// Answer to one metric.
///
/// Serialized as the inner response, without a tag.
#[derive(Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MetricResult {
    Counts(Counts),
    TotalSize(TotalSize),
    Formats(Formats),
    AggVariables(AggVariables),
    Coverage(Coverage),
}
