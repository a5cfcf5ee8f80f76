//! Similarity search over a [`PhotoStore`].
//!
//! The only implementation today is an exhaustive linear scan, which is fine
//! for stores in the low thousands of faces. The [`NearestNeighbor`] trait is
//! the seam where an ANN index would slot in without touching the query path.

use thiserror::Error;

use crate::store::PhotoStore;
use crate::types::{Embedding, Match};

#[derive(Error, Debug)]
pub enum MatchError {
    #[error("query embedding has {query} dimensions but the store holds {store}-dim embeddings")]
    DimensionMismatch { query: usize, store: usize },
    #[error("top_k must be at least 1")]
    InvalidTopK,
    #[error("min_score must lie in [-1, 1], got {0}")]
    InvalidMinScore(f32),
}

/// Search knobs: how many hits to return and the score floor below which a
/// face is considered unrelated.
#[derive(Debug, Clone, Copy)]
pub struct SearchParams {
    pub top_k: usize,
    pub min_score: f32,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            top_k: 20,
            min_score: 0.3,
        }
    }
}

/// Strategy for finding the stored faces most similar to a query embedding.
pub trait NearestNeighbor {
    /// Return at most `top_k` matches scoring at least `min_score`, ordered
    /// by score descending. An empty result is not an error.
    fn search(&self, query: &Embedding, params: SearchParams) -> Result<Vec<Match>, MatchError>;
}

/// Exhaustive cosine-similarity scan. O(N·D) per query, no precomputed state.
pub struct LinearScan<'a> {
    store: &'a PhotoStore,
}

impl<'a> LinearScan<'a> {
    pub fn new(store: &'a PhotoStore) -> Self {
        Self { store }
    }
}

impl NearestNeighbor for LinearScan<'_> {
    fn search(&self, query: &Embedding, params: SearchParams) -> Result<Vec<Match>, MatchError> {
        if params.top_k < 1 {
            return Err(MatchError::InvalidTopK);
        }
        if !(-1.0..=1.0).contains(&params.min_score) {
            return Err(MatchError::InvalidMinScore(params.min_score));
        }

        let Some(dimension) = self.store.dimension() else {
            return Ok(Vec::new());
        };
        if query.len() != dimension {
            return Err(MatchError::DimensionMismatch {
                query: query.len(),
                store: dimension,
            });
        }

        // Score before building results: URLs are only cloned for records
        // that clear the floor, which on a mostly-miss store is few of them.
        let mut matches: Vec<Match> = Vec::new();
        for rec in self.store.records() {
            let score = query.similarity(&rec.embedding);
            if score >= params.min_score {
                matches.push(Match {
                    image_url: rec.image_url.clone(),
                    score,
                });
            }
        }

        // Stable sort: equal scores keep store insertion order, so results
        // are deterministic across runs.
        matches.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        matches.truncate(params.top_k);
        Ok(matches)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PhotoRecord;

    fn store(entries: &[(&str, &[f32])]) -> PhotoStore {
        PhotoStore::from_records(
            entries
                .iter()
                .map(|(url, values)| PhotoRecord {
                    image_url: url.to_string(),
                    embedding: Embedding::new(values.to_vec()),
                })
                .collect(),
        )
        .unwrap()
    }

    fn query(values: &[f32]) -> Embedding {
        Embedding::new(values.to_vec())
    }

    #[test]
    fn test_two_record_scenario() {
        // b.jpg scores 0.0, below the 0.3 floor; only a.jpg survives.
        let store = store(&[("a.jpg", &[1.0, 0.0]), ("b.jpg", &[0.0, 1.0])]);
        let result = LinearScan::new(&store)
            .search(
                &query(&[1.0, 0.0]),
                SearchParams {
                    top_k: 20,
                    min_score: 0.3,
                },
            )
            .unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].image_url, "a.jpg");
        assert!((result[0].score - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_empty_store_returns_nothing() {
        let store = PhotoStore::default();
        let result = LinearScan::new(&store)
            .search(&query(&[1.0, 0.0]), SearchParams::default())
            .unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn test_dimension_mismatch_is_an_error() {
        let store = store(&[("a.jpg", &[1.0, 0.0])]);
        let err = LinearScan::new(&store)
            .search(&query(&[1.0, 0.0, 0.0]), SearchParams::default())
            .unwrap_err();
        assert!(matches!(
            err,
            MatchError::DimensionMismatch { query: 3, store: 2 }
        ));
    }

    #[test]
    fn test_results_sorted_descending_and_truncated() {
        let store = store(&[
            ("low.jpg", &[0.5, 0.866]),
            ("exact.jpg", &[1.0, 0.0]),
            ("mid.jpg", &[0.866, 0.5]),
        ]);
        let result = LinearScan::new(&store)
            .search(
                &query(&[1.0, 0.0]),
                SearchParams {
                    top_k: 2,
                    min_score: -1.0,
                },
            )
            .unwrap();
        assert_eq!(result.len(), 2);
        assert_eq!(result[0].image_url, "exact.jpg");
        assert_eq!(result[1].image_url, "mid.jpg");
        assert!(result[0].score >= result[1].score);
    }

    #[test]
    fn test_ties_keep_insertion_order() {
        let store = store(&[
            ("first.jpg", &[1.0, 0.0]),
            ("second.jpg", &[2.0, 0.0]),
            ("third.jpg", &[3.0, 0.0]),
        ]);
        // All three are colinear with the query: identical scores.
        let result = LinearScan::new(&store)
            .search(
                &query(&[1.0, 0.0]),
                SearchParams {
                    top_k: 3,
                    min_score: 0.0,
                },
            )
            .unwrap();
        let urls: Vec<_> = result.iter().map(|m| m.image_url.as_str()).collect();
        assert_eq!(urls, ["first.jpg", "second.jpg", "third.jpg"]);
    }

    #[test]
    fn test_score_exactly_at_floor_is_kept() {
        // The floor is inclusive: score == min_score survives the filter.
        let store = store(&[("orthogonal.jpg", &[0.0, 1.0]), ("exact.jpg", &[1.0, 0.0])]);
        let result = LinearScan::new(&store)
            .search(
                &query(&[1.0, 0.0]),
                SearchParams {
                    top_k: 10,
                    min_score: 0.0,
                },
            )
            .unwrap();
        let urls: Vec<_> = result.iter().map(|m| m.image_url.as_str()).collect();
        assert_eq!(urls, ["exact.jpg", "orthogonal.jpg"]);
    }

    #[test]
    fn test_min_score_filters_everything() {
        let store = store(&[("a.jpg", &[0.0, 1.0])]);
        let result = LinearScan::new(&store)
            .search(
                &query(&[1.0, 0.0]),
                SearchParams {
                    top_k: 5,
                    min_score: 0.9,
                },
            )
            .unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn test_at_most_top_k_results_all_above_floor() {
        let store = store(&[
            ("a.jpg", &[1.0, 0.0]),
            ("b.jpg", &[0.9, 0.1]),
            ("c.jpg", &[0.8, 0.2]),
            ("d.jpg", &[0.0, 1.0]),
        ]);
        let params = SearchParams {
            top_k: 2,
            min_score: 0.5,
        };
        let result = LinearScan::new(&store).search(&query(&[1.0, 0.0]), params).unwrap();
        assert!(result.len() <= params.top_k);
        assert!(result.iter().all(|m| m.score >= params.min_score));
    }

    #[test]
    fn test_invalid_params_rejected() {
        let store = store(&[("a.jpg", &[1.0, 0.0])]);
        let scan = LinearScan::new(&store);
        assert!(matches!(
            scan.search(&query(&[1.0, 0.0]), SearchParams { top_k: 0, min_score: 0.3 }),
            Err(MatchError::InvalidTopK)
        ));
        assert!(matches!(
            scan.search(&query(&[1.0, 0.0]), SearchParams { top_k: 1, min_score: 1.5 }),
            Err(MatchError::InvalidMinScore(_))
        ));
    }
}
