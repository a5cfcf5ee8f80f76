//! facefind-core — face detection, embeddings, and similarity search.
//!
//! Uses SCRFD for face detection and ArcFace for embedding extraction, both
//! running via ONNX Runtime for CPU inference. The embedding store and the
//! linear-scan matcher live here too, so the daemon and the indexer share
//! one implementation of every piece.

pub mod alignment;
pub mod analyzer;
pub mod detector;
pub mod matcher;
pub mod recognizer;
pub mod store;
pub mod types;

pub use analyzer::{AnalyzerError, FaceAnalyzer};
pub use matcher::{LinearScan, MatchError, NearestNeighbor, SearchParams};
pub use store::{PhotoStore, StoreError};
pub use types::{BoundingBox, Embedding, Face, Match, PhotoRecord};

use std::path::PathBuf;

/// Default directory searched for ONNX model files.
pub fn default_model_dir() -> PathBuf {
    PathBuf::from("models")
}

/// SCRFD detection model filename expected inside the model dir.
pub const DETECTOR_MODEL_FILE: &str = "det_10g.onnx";

/// ArcFace recognition model filename expected inside the model dir.
pub const RECOGNIZER_MODEL_FILE: &str = "w600k_r50.onnx";
