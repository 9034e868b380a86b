//! Composite aggregation pagination.
//!
//! A composite aggregation returns its buckets a page at a time along with an opaque `after_key`.
//! [CompositePaginator] requests pages in order, each carrying the key returned with the previous
//! page, until the backend signals that there are no more.

use crate::backend::{CompositeBucket, SearchBackend};
use crate::error::QueryError;
use crate::models::Bucket;
use crate::path::ArchivePath;
use crate::query::CompositeAggregation;

use hashbrown::{HashMap, HashSet};
use serde_json::{Map, Value};

/// Progress through a composite aggregation.
#[derive(Debug)]
enum Cursor {
    /// No page has been requested yet.
    Start,
    /// More pages follow the given continuation key.
    After(Map<String, Value>),
    /// The backend has signalled the last page.
    Done,
}

/// One page of buckets from a composite aggregation.
#[derive(Debug)]
pub struct AggregationPage {
    pub buckets: Vec<CompositeBucket>,
    pub after_key: Option<Map<String, Value>>,
}

/// Drives a composite aggregation to completion.
///
/// Pages are fetched lazily by [CompositePaginator::next_page]. A paginator is not restartable;
/// create a new one to repeat the aggregation.
pub struct CompositePaginator<'a> {
    backend: &'a dyn SearchBackend,
    index: &'a str,
    aggregation: &'a CompositeAggregation,
    path: Option<&'a ArchivePath>,
    cursor: Cursor,
    /// Serialised continuation keys returned so far
    seen: HashSet<String>,
    round_trips: usize,
}

impl<'a> CompositePaginator<'a> {
    /// Create a paginator positioned before the first page.
    ///
    /// # Arguments
    ///
    /// * `backend`: Search backend to query
    /// * `index`: Name of the index to query
    /// * `aggregation`: The composite aggregation to page through
    /// * `path`: Optional path to scope the aggregation by
    pub fn new(
        backend: &'a dyn SearchBackend,
        index: &'a str,
        aggregation: &'a CompositeAggregation,
        path: Option<&'a ArchivePath>,
    ) -> Self {
        Self {
            backend,
            index,
            aggregation,
            path,
            cursor: Cursor::Start,
            seen: HashSet::new(),
            round_trips: 0,
        }
    }

    /// Number of backend round-trips made so far.
    pub fn round_trips(&self) -> usize {
        self.round_trips
    }

    /// Fetch the next page.
    ///
    /// Returns `None` once the last page has been returned.
    pub async fn next_page(&mut self) -> Result<Option<AggregationPage>, QueryError> {
        let after = match &self.cursor {
            Cursor::Start => None,
            Cursor::After(after) => Some(after),
            Cursor::Done => return Ok(None),
        };
        let body = self.aggregation.page_body(self.path, after);
        tracing::debug!(
            aggregation = self.aggregation.name,
            after = ?after,
            "Requesting composite aggregation page"
        );
        let response = self.backend.search(self.index, &body).await?;
        self.round_trips += 1;
        let result = response.aggregation(self.aggregation.name)?;
        let page = AggregationPage {
            buckets: result.buckets.clone(),
            after_key: result.after_key.clone(),
        };

        let page_size = usize::try_from(self.aggregation.page_size).unwrap_or(usize::MAX);
        self.cursor = match &page.after_key {
            Some(after_key) if page.buckets.len() >= page_size => {
                let serialised = Value::Object(after_key.clone()).to_string();
                if !self.seen.insert(serialised.clone()) {
                    return Err(QueryError::PaginationStalled {
                        after_key: serialised,
                    });
                }
                Cursor::After(after_key.clone())
            }
            _ => Cursor::Done,
        };
        Ok(Some(page))
    }

    /// Fetch all remaining pages and accumulate their buckets.
    ///
    /// Buckets are returned in the order first seen. Should a key appear on more than one page,
    /// its counts are summed into the first occurrence.
    pub async fn collect(&mut self) -> Result<Vec<Bucket>, QueryError> {
        let mut buckets: Vec<Bucket> = Vec::new();
        let mut positions: HashMap<String, usize> = HashMap::new();
        while let Some(page) = self.next_page().await? {
            for bucket in page.buckets {
                let key = bucket_key(&bucket, self.aggregation.source);
                let id = key.to_string();
                match positions.get(&id) {
                    Some(&position) => buckets[position].doc_count += bucket.doc_count,
                    None => {
                        positions.insert(id, buckets.len());
                        buckets.push(Bucket {
                            key,
                            doc_count: bucket.doc_count,
                        });
                    }
                }
            }
        }
        tracing::debug!(
            aggregation = self.aggregation.name,
            round_trips = self.round_trips,
            buckets = buckets.len(),
            "Composite aggregation complete"
        );
        Ok(buckets)
    }
}

/// Extract the value of `source` from a composite bucket key.
///
/// Falls back to the whole key object if the source is absent.
fn bucket_key(bucket: &CompositeBucket, source: &str) -> Value {
    bucket
        .key
        .get(source)
        .cloned()
        .unwrap_or_else(|| Value::Object(bucket.key.clone()))
}

/// Page through a composite aggregation, returning every bucket.
///
/// # Arguments
///
/// * `backend`: Search backend to query
/// * `index`: Name of the index to query
/// * `aggregation`: The composite aggregation to page through
/// * `path`: Optional path to scope the aggregation by
pub async fn paginate_all(
    backend: &dyn SearchBackend,
    index: &str,
    aggregation: &CompositeAggregation,
    path: Option<&ArchivePath>,
) -> Result<Vec<Bucket>, QueryError> {
    CompositePaginator::new(backend, index, aggregation, path)
        .collect()
        .await
}
