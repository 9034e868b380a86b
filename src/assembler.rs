//! Result assembly.
//!
//! Maps raw backend results into the response types in [crate::models].

use crate::backend::SearchResponse;
use crate::error::QueryError;
use crate::models::{AggVariables, Bucket, Coverage, Counts, Formats, TotalSize};
use crate::path::ArchivePath;
use crate::query::TOTAL_SIZE_AGGREGATION;

/// Assemble a [Counts] response.
pub fn counts(path: Option<ArchivePath>, files: u64, directories: u64) -> Counts {
    Counts {
        path,
        files,
        directories,
    }
}

/// Assemble a [TotalSize] response from the sum aggregation in `response`.
///
/// A sum over no documents is reported as zero.
pub fn total_size(
    path: Option<ArchivePath>,
    response: &SearchResponse,
) -> Result<TotalSize, QueryError> {
    let value = response.aggregation(TOTAL_SIZE_AGGREGATION)?.value;
    let total_file_size = value.filter(|v| v.is_finite() && *v > 0.0).unwrap_or(0.0);
    Ok(TotalSize {
        path,
        total_file_size: total_file_size.round() as u64,
    })
}

pub fn formats(path: Option<ArchivePath>, formats: Vec<Bucket>) -> Formats {
    Formats { path, formats }
}

pub fn agg_variables(
    path: Option<ArchivePath>,
    number_of_documents: u64,
    agg_variables: Vec<Bucket>,
) -> AggVariables {
    AggVariables {
        path,
        number_of_documents,
        agg_variables,
    }
}

/// Assemble a [Coverage] response.
pub fn coverage(path: Option<ArchivePath>, total_files: u64, parameter_files: u64) -> Coverage {
    Coverage {
        path,
        total_files,
        parameter_files,
        percentage_coverage: percentage(parameter_files, total_files),
    }
}

/// Percentage of `total` that `part` represents, rounded to two decimal places.
///
/// Zero when `total` is zero.
pub fn percentage(part: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let percentage = (part as f64 * 100.0) / total as f64;
    (percentage * 100.0).round() / 100.0
}
