//! In-memory document store.
//!
//! Collections live in a `DashMap` keyed by name. An optional JSON seed file
//! of the shape `{"profiles": [...], "skills": [...]}` populates it at start.

use std::cmp::Ordering;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};

use async_trait::async_trait;
use chrono::DateTime;
use dashmap::DashMap;
use serde_json::Value;

use super::{Document, DocumentStore, Filter, SortSpec, StoreError};

#[derive(Debug)]
pub struct MemoryStore {
    collections: DashMap<String, Vec<Document>>,
    available: AtomicBool,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            collections: DashMap::new(),
            available: AtomicBool::new(true),
        }
    }

    /// Load collections from a JSON seed file.
    pub fn from_seed_file(path: &Path) -> Result<Self, StoreError> {
        let content = std::fs::read_to_string(path)?;
        let store = Self::from_seed(serde_json::from_str(&content)?)?;
        tracing::info!(
            path = %path.display(),
            collections = store.collections.len(),
            "Loaded seed data"
        );
        Ok(store)
    }

    pub fn from_seed(seed: Value) -> Result<Self, StoreError> {
        let Value::Object(collections) = seed else {
            return Err(StoreError::NotAnObject);
        };

        let store = Self::new();
        for (name, documents) in collections {
            let documents = match documents {
                Value::Array(docs) => docs,
                _ => return Err(StoreError::NotAnObject),
            };
            for document in documents {
                store.insert(&name, document)?;
            }
        }
        Ok(store)
    }

    /// Simulate an outage: every operation fails while unavailable.
    pub fn set_available(&self, available: bool) {
        self.available.store(available, AtomicOrdering::SeqCst);
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if self.available.load(AtomicOrdering::SeqCst) {
            Ok(())
        } else {
            Err(StoreError::Unavailable("memory store marked unavailable".into()))
        }
    }

    fn insert(&self, collection: &str, document: Document) -> Result<(), StoreError> {
        let Value::Object(ref fields) = document else {
            return Err(StoreError::NotAnObject);
        };

        let mut docs = self.collections.entry(collection.to_string()).or_default();
        if let Some(id) = fields.get("id") {
            if docs.iter().any(|d| d.get("id") == Some(id)) {
                return Err(StoreError::Duplicate(id.to_string(), collection.to_string()));
            }
        }
        docs.push(document);
        Ok(())
    }
}

fn matches(document: &Document, filter: &Filter) -> bool {
    filter
        .iter()
        .all(|(field, expected)| document.get(field) == Some(expected))
}

fn compare_field(a: Option<&Value>, b: Option<&Value>, chronological: bool) -> Ordering {
    match (a, b) {
        (None | Some(Value::Null), None | Some(Value::Null)) => Ordering::Equal,
        (None | Some(Value::Null), _) => Ordering::Less,
        (_, None | Some(Value::Null)) => Ordering::Greater,
        (Some(Value::Number(x)), Some(Value::Number(y))) => {
            let x = x.as_f64().unwrap_or_default();
            let y = y.as_f64().unwrap_or_default();
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Some(Value::String(x)), Some(Value::String(y))) if chronological => {
            match (
                DateTime::parse_from_rfc3339(x),
                DateTime::parse_from_rfc3339(y),
            ) {
                (Ok(x), Ok(y)) => x.cmp(&y),
                _ => x.cmp(y),
            }
        }
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        (Some(x), Some(y)) => type_rank(x).cmp(&type_rank(y)),
    }
}

/// A field sorts chronologically only when every string value it holds is
/// an RFC 3339 timestamp. Mixing the two orders per pair is not transitive.
fn is_timestamp_field(documents: &[Document], field: &str) -> bool {
    let mut strings = documents
        .iter()
        .filter_map(|d| d.get(field).and_then(Value::as_str))
        .peekable();
    strings.peek().is_some() && strings.all(|s| DateTime::parse_from_rfc3339(s).is_ok())
}

fn type_rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Number(_) => 1,
        Value::String(_) => 2,
        Value::Object(_) => 3,
        Value::Array(_) => 4,
        Value::Bool(_) => 5,
    }
}

fn sort_documents(documents: &mut [Document], sort: &SortSpec) {
    if sort.is_empty() {
        return;
    }
    let chronological: Vec<bool> = sort
        .0
        .iter()
        .map(|key| is_timestamp_field(documents, &key.field))
        .collect();
    documents.sort_by(|a, b| {
        for (key, &chronological) in sort.0.iter().zip(&chronological) {
            let ordering = compare_field(a.get(&key.field), b.get(&key.field), chronological);
            let ordering = if key.descending {
                ordering.reverse()
            } else {
                ordering
            };
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    });
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn find_one(&self, collection: &str, filter: &Filter) -> Result<Document, StoreError> {
        self.check_available()?;
        self.collections
            .get(collection)
            .and_then(|docs| docs.iter().find(|d| matches(d, filter)).cloned())
            .ok_or(StoreError::NotFound)
    }

    async fn find_many(
        &self,
        collection: &str,
        filter: &Filter,
        sort: &SortSpec,
    ) -> Result<Vec<Document>, StoreError> {
        self.check_available()?;
        let mut found: Vec<Document> = self
            .collections
            .get(collection)
            .map(|docs| docs.iter().filter(|d| matches(d, filter)).cloned().collect())
            .unwrap_or_default();
        sort_documents(&mut found, sort);
        Ok(found)
    }

    async fn insert_one(&self, collection: &str, document: Document) -> Result<(), StoreError> {
        self.check_available()?;
        self.insert(collection, document)
    }

    async fn count(&self, collection: &str, filter: &Filter) -> Result<u64, StoreError> {
        self.check_available()?;
        Ok(self
            .collections
            .get(collection)
            .map(|docs| docs.iter().filter(|d| matches(d, filter)).count() as u64)
            .unwrap_or(0))
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.check_available()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::filter;
    use serde_json::json;
    use std::io::Write;

    fn seeded() -> MemoryStore {
        MemoryStore::from_seed(json!({
            "skills": [
                {"id": "1", "profileId": "p", "name": "Rust", "category": "backend"},
                {"id": "2", "profileId": "p", "name": "CSS", "category": "frontend"},
                {"id": "3", "profileId": "p", "name": "Go", "category": "backend"},
                {"id": "4", "profileId": "q", "name": "Zig", "category": "backend"}
            ],
            "projects": [
                {"id": "a", "createdAt": "2024-01-01T00:00:00Z"},
                {"id": "b", "createdAt": "2024-01-01T00:00:00.500Z"},
                {"id": "c", "createdAt": "2023-06-01T00:00:00Z"}
            ]
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn test_find_many_filters_and_sorts() {
        let store = seeded();
        let docs = store
            .find_many(
                "skills",
                &filter([("profileId", json!("p"))]),
                &SortSpec::parse(&["category", "name"]),
            )
            .await
            .unwrap();

        let names: Vec<_> = docs.iter().map(|d| d["name"].as_str().unwrap()).collect();
        assert_eq!(names, vec!["Go", "Rust", "CSS"]);
    }

    #[tokio::test]
    async fn test_descending_timestamps_sort_chronologically() {
        let store = seeded();
        let docs = store
            .find_many("projects", &Filter::new(), &SortSpec::parse(&["-createdAt"]))
            .await
            .unwrap();

        let ids: Vec<_> = docs.iter().map(|d| d["id"].as_str().unwrap()).collect();
        assert_eq!(ids, vec!["b", "a", "c"]);
    }

    #[tokio::test]
    async fn test_mixed_timestamp_field_sorts_lexicographically() {
        let mut projects: Vec<Value> = (0..30)
            .map(|i| {
                let created = match i % 3 {
                    0 => "2024-01-01T00:00:00+05:00",
                    1 => "2023-12-31T20:00:00Z",
                    _ => "2023-12-31T21",
                };
                json!({"id": i.to_string(), "createdAt": created})
            })
            .collect();
        projects.reverse();
        let store = MemoryStore::from_seed(json!({ "projects": projects })).unwrap();

        let docs = store
            .find_many("projects", &Filter::new(), &SortSpec::parse(&["createdAt"]))
            .await
            .unwrap();

        let created: Vec<_> = docs.iter().map(|d| d["createdAt"].as_str().unwrap()).collect();
        let mut expected = created.clone();
        expected.sort();
        assert_eq!(created, expected);
        assert_eq!(created[0], "2023-12-31T20:00:00Z");
        assert_eq!(created[29], "2024-01-01T00:00:00+05:00");
    }

    #[tokio::test]
    async fn test_find_one_and_count() {
        let store = seeded();
        let doc = store
            .find_one("skills", &filter([("id", json!("3"))]))
            .await
            .unwrap();
        assert_eq!(doc["name"], "Go");

        let missing = store.find_one("skills", &filter([("id", json!("99"))])).await;
        assert!(matches!(missing, Err(StoreError::NotFound)));

        let count = store
            .count("skills", &filter([("category", json!("backend"))]))
            .await
            .unwrap();
        assert_eq!(count, 3);
        assert_eq!(store.count("nothing", &Filter::new()).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_insert_rejects_duplicate_ids() {
        let store = MemoryStore::new();
        store
            .insert_one("contacts", json!({"id": "x"}))
            .await
            .unwrap();
        let dup = store.insert_one("contacts", json!({"id": "x"})).await;
        assert!(matches!(dup, Err(StoreError::Duplicate(_, _))));

        let not_object = store.insert_one("contacts", json!([1, 2])).await;
        assert!(matches!(not_object, Err(StoreError::NotAnObject)));
    }

    #[tokio::test]
    async fn test_unavailable_store_fails_everything() {
        let store = seeded();
        store.set_available(false);
        assert!(store.ping().await.is_err());
        assert!(store.count("skills", &Filter::new()).await.is_err());

        store.set_available(true);
        assert!(store.ping().await.is_ok());
    }

    #[test]
    fn test_seed_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"profiles": [{{"id": "p1", "name": "Ada"}}]}}"#).unwrap();

        let store = MemoryStore::from_seed_file(file.path()).unwrap();
        assert_eq!(store.collections.get("profiles").unwrap().len(), 1);
    }
}
