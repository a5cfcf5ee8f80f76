//! Persisted embedding store.
//!
//! The store file is a JSON array of records, each holding the hosted URL of
//! a source photo and one face embedding:
//!
//! ```json
//! [{"imageUrl": "https://cdn.example/events/a.jpg", "embedding": [0.01, ...]}]
//! ```
//!
//! The index builder is the sole writer; the daemon loads the file once at
//! startup and treats the result as immutable for the process lifetime.
//! Shape problems (ragged dimensions, non-finite values) are rejected at load
//! time so a bad file fails visibly at startup instead of on the first query.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::types::PhotoRecord;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("failed to read store file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("store file {path} is not a valid record list: {source}")]
    Malformed {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("record {index} ({url}) has an empty embedding")]
    EmptyEmbedding { index: usize, url: String },
    #[error("record {index} ({url}) has a {got}-dim embedding, expected {expected}")]
    DimensionMismatch {
        index: usize,
        url: String,
        got: usize,
        expected: usize,
    },
    #[error("record {index} ({url}) contains a non-finite embedding value")]
    NonFiniteValue { index: usize, url: String },
}

/// An in-memory, read-only table of indexed face embeddings.
///
/// Record order is insertion order from the file and is significant: the
/// matcher uses it to break score ties deterministically.
#[derive(Debug, Default)]
pub struct PhotoStore {
    records: Vec<PhotoRecord>,
}

impl PhotoStore {
    /// Load a store from `path`.
    ///
    /// A missing file yields an empty store (the bootstrap case before any
    /// index has been built). An existing but malformed or mis-shaped file is
    /// an error; it is never silently treated as empty.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::warn!(path = %path.display(), "store file does not exist, starting empty");
            return Ok(Self::default());
        }

        let raw = fs::read_to_string(path).map_err(|source| StoreError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let records: Vec<PhotoRecord> =
            serde_json::from_str(&raw).map_err(|source| StoreError::Malformed {
                path: path.display().to_string(),
                source,
            })?;

        let store = Self::from_records(records)?;
        tracing::info!(
            path = %path.display(),
            records = store.len(),
            dimension = store.dimension(),
            "store loaded"
        );
        Ok(store)
    }

    /// Like [`load`](Self::load), but creates an empty store file when the
    /// path does not exist yet, so a freshly deployed daemon leaves a visible
    /// placeholder for the operator to replace with indexer output.
    pub fn load_or_init(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::warn!(path = %path.display(), "store file does not exist, creating empty one");
            fs::write(path, "[]").map_err(|source| StoreError::Io {
                path: path.display().to_string(),
                source,
            })?;
            return Ok(Self::default());
        }
        Self::load(path)
    }

    /// Build a store from records already in memory, validating shape.
    pub fn from_records(records: Vec<PhotoRecord>) -> Result<Self, StoreError> {
        let expected = match records.first() {
            Some(first) => first.embedding.len(),
            None => return Ok(Self::default()),
        };

        for (index, rec) in records.iter().enumerate() {
            if rec.embedding.is_empty() {
                return Err(StoreError::EmptyEmbedding {
                    index,
                    url: rec.image_url.clone(),
                });
            }
            if rec.embedding.len() != expected {
                return Err(StoreError::DimensionMismatch {
                    index,
                    url: rec.image_url.clone(),
                    got: rec.embedding.len(),
                    expected,
                });
            }
            if rec.embedding.values.iter().any(|v| !v.is_finite()) {
                return Err(StoreError::NonFiniteValue {
                    index,
                    url: rec.image_url.clone(),
                });
            }
        }

        Ok(Self { records })
    }

    pub fn records(&self) -> &[PhotoRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Embedding dimension shared by every record, or `None` when empty.
    pub fn dimension(&self) -> Option<usize> {
        self.records.first().map(|r| r.embedding.len())
    }
}

/// Serialize records to the store format at `path`. Indexer-side counterpart
/// of [`PhotoStore::load`].
pub fn write_records(path: impl AsRef<Path>, records: &[PhotoRecord]) -> Result<(), StoreError> {
    let path = path.as_ref();
    let json = serde_json::to_string_pretty(records).map_err(|source| StoreError::Malformed {
        path: path.display().to_string(),
        source,
    })?;
    fs::write(path, json).map_err(|source| StoreError::Io {
        path: path.display().to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Embedding;

    fn record(url: &str, values: Vec<f32>) -> PhotoRecord {
        PhotoRecord {
            image_url: url.to_string(),
            embedding: Embedding::new(values),
        }
    }

    #[test]
    fn test_missing_file_is_empty_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = PhotoStore::load(dir.path().join("nope.json")).unwrap();
        assert!(store.is_empty());
        assert_eq!(store.dimension(), None);
    }

    #[test]
    fn test_load_or_init_creates_placeholder() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("embeddings.json");
        let store = PhotoStore::load_or_init(&path).unwrap();
        assert!(store.is_empty());
        assert_eq!(fs::read_to_string(&path).unwrap(), "[]");
        // Second load reads the placeholder back.
        assert!(PhotoStore::load_or_init(&path).unwrap().is_empty());
    }

    #[test]
    fn test_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("embeddings.json");
        let records = vec![
            record("https://cdn.example/a.jpg", vec![1.0, 0.0]),
            record("https://cdn.example/b.jpg", vec![0.0, 1.0]),
        ];
        write_records(&path, &records).unwrap();

        let store = PhotoStore::load(&path).unwrap();
        assert_eq!(store.records(), &records[..]);
        assert_eq!(store.dimension(), Some(2));
    }

    #[test]
    fn test_load_twice_is_identical() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("embeddings.json");
        write_records(&path, &[record("a.jpg", vec![0.6, 0.8])]).unwrap();

        let first = PhotoStore::load(&path).unwrap();
        let second = PhotoStore::load(&path).unwrap();
        assert_eq!(first.records(), second.records());
    }

    #[test]
    fn test_malformed_json_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("embeddings.json");
        fs::write(&path, "{not json").unwrap();
        assert!(matches!(
            PhotoStore::load(&path),
            Err(StoreError::Malformed { .. })
        ));
    }

    #[test]
    fn test_ragged_dimensions_rejected_at_load() {
        let err = PhotoStore::from_records(vec![
            record("a.jpg", vec![1.0, 0.0]),
            record("b.jpg", vec![1.0, 0.0, 0.0]),
        ])
        .unwrap_err();
        match err {
            StoreError::DimensionMismatch {
                index,
                got,
                expected,
                ..
            } => {
                assert_eq!(index, 1);
                assert_eq!(got, 3);
                assert_eq!(expected, 2);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_non_finite_value_rejected() {
        let err = PhotoStore::from_records(vec![record("a.jpg", vec![1.0, f32::NAN])]).unwrap_err();
        assert!(matches!(err, StoreError::NonFiniteValue { index: 0, .. }));
    }

    #[test]
    fn test_empty_embedding_rejected() {
        let err = PhotoStore::from_records(vec![record("a.jpg", vec![])]).unwrap_err();
        assert!(matches!(err, StoreError::EmptyEmbedding { index: 0, .. }));
    }
}
