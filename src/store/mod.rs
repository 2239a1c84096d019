//! Document store boundary.
//!
//! # Data Flow
//! ```text
//! portfolio services
//!     → DocumentStore (find_one / find_many / insert_one / count / ping)
//!     → MemoryStore (memory.rs), or any other backend
//! ```
//!
//! Documents are JSON objects. Filters are field equality, all fields ANDed.
//! Sort specs list field names, a leading `-` meaning descending.

pub mod memory;

use async_trait::async_trait;
use serde_json::{Map, Value};

pub use memory::MemoryStore;

pub type Document = Value;

/// Equality filter over top-level fields.
pub type Filter = Map<String, Value>;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("record not found")]
    NotFound,

    #[error("duplicate id {0} in collection {1}")]
    Duplicate(String, String),

    #[error("document is not a JSON object")]
    NotAnObject,

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// One sort key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortField {
    pub field: String,
    pub descending: bool,
}

/// Ordered list of sort keys.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SortSpec(pub Vec<SortField>);

impl SortSpec {
    /// Parse `["category", "-createdAt"]` style field lists.
    pub fn parse<S: AsRef<str>>(fields: &[S]) -> Self {
        SortSpec(
            fields
                .iter()
                .map(|f| {
                    let f = f.as_ref();
                    match f.strip_prefix('-') {
                        Some(name) => SortField {
                            field: name.to_string(),
                            descending: true,
                        },
                        None => SortField {
                            field: f.to_string(),
                            descending: false,
                        },
                    }
                })
                .collect(),
        )
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Build a filter from `(field, value)` pairs.
pub fn filter<const N: usize>(pairs: [(&str, Value); N]) -> Filter {
    pairs
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// First document matching `filter`, or [`StoreError::NotFound`].
    async fn find_one(&self, collection: &str, filter: &Filter) -> Result<Document, StoreError>;

    async fn find_many(
        &self,
        collection: &str,
        filter: &Filter,
        sort: &SortSpec,
    ) -> Result<Vec<Document>, StoreError>;

    async fn insert_one(&self, collection: &str, document: Document) -> Result<(), StoreError>;

    async fn count(&self, collection: &str, filter: &Filter) -> Result<u64, StoreError>;

    /// Cheap liveness check.
    async fn ping(&self) -> Result<(), StoreError>;
}
