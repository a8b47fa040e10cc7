use serde::Serialize;

/// A paged set of results plus metadata about the underlying data set.
/// Built per request; never persisted.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PagedResultSet<T> {
    /// Results in this page, in creation-time order.
    pub results: Vec<T>,
    /// How many items exist within the underlying (unpaged) data set.
    pub total_count: Option<i64>,
}

impl<T> PagedResultSet<T> {
    pub fn new(results: Vec<T>, total_count: impl Into<Option<i64>>) -> Self {
        Self { results, total_count: total_count.into() }
    }
}
