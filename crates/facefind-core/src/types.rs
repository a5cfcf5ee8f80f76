use serde::{Deserialize, Serialize};

/// Bounding box for a detected face, with optional facial landmarks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub confidence: f32,
    /// Five-point facial landmarks: [left_eye, right_eye, nose, left_mouth, right_mouth].
    pub landmarks: Option<[(f32, f32); 5]>,
}

/// Face embedding vector (512-dimensional for ArcFace).
///
/// Serializes as a bare JSON array so stored records stay compatible with
/// the `embeddings.json` format produced by earlier versions of the indexer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Embedding {
    pub values: Vec<f32>,
}

impl Embedding {
    pub fn new(values: Vec<f32>) -> Self {
        Self { values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Compute cosine similarity between two embeddings.
    ///
    /// Returns a value in [-1, 1]. Higher = more similar. Divides by both
    /// norms, so the result is insensitive to embedding magnitude even when
    /// an upstream model skipped L2 normalization.
    pub fn similarity(&self, other: &Embedding) -> f32 {
        let mut dot = 0.0f32;
        let mut norm_a = 0.0f32;
        let mut norm_b = 0.0f32;

        for (a, b) in self.values.iter().zip(other.values.iter()) {
            dot += a * b;
            norm_a += a * a;
            norm_b += b * b;
        }

        let denom = norm_a.sqrt() * norm_b.sqrt();
        if denom > 0.0 { dot / denom } else { 0.0 }
    }
}

/// A face found in an image: where it is, and what it looks like.
#[derive(Debug, Clone)]
pub struct Face {
    pub bbox: BoundingBox,
    pub embedding: Embedding,
}

/// One indexed face: the hosted URL of its source photo plus its embedding.
///
/// Produced exclusively by the index builder and never mutated afterwards.
/// A multi-face photo yields several records sharing one URL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhotoRecord {
    #[serde(rename = "imageUrl")]
    pub image_url: String,
    pub embedding: Embedding,
}

/// A scored search hit, returned to the caller. Transient, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Match {
    #[serde(rename = "imageUrl")]
    pub image_url: String,
    /// Cosine similarity of the matched face, in [-1, 1].
    pub score: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cosine_similarity_identical() {
        let a = Embedding::new(vec![1.0, 0.0, 0.0]);
        let b = Embedding::new(vec![1.0, 0.0, 0.0]);
        assert!((a.similarity(&b) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_similarity_orthogonal() {
        let a = Embedding::new(vec![1.0, 0.0]);
        let b = Embedding::new(vec![0.0, 1.0]);
        assert!(a.similarity(&b).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_similarity_opposite() {
        let a = Embedding::new(vec![1.0, 0.0]);
        let b = Embedding::new(vec![-1.0, 0.0]);
        assert!((a.similarity(&b) + 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_similarity_symmetric() {
        let a = Embedding::new(vec![0.3, -0.7, 0.2]);
        let b = Embedding::new(vec![0.1, 0.4, -0.9]);
        assert_eq!(a.similarity(&b), b.similarity(&a));
    }

    #[test]
    fn test_cosine_similarity_scale_invariant() {
        let a = Embedding::new(vec![1.0, 2.0]);
        let b = Embedding::new(vec![2.0, 4.0]);
        assert!((a.similarity(&b) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_similarity_zero_vector() {
        let a = Embedding::new(vec![0.0, 0.0]);
        let b = Embedding::new(vec![1.0, 0.0]);
        assert_eq!(a.similarity(&b), 0.0);
    }

    #[test]
    fn test_embedding_serializes_as_bare_array() {
        let e = Embedding::new(vec![1.0, 0.5]);
        assert_eq!(serde_json::to_string(&e).unwrap(), "[1.0,0.5]");
    }

    #[test]
    fn test_photo_record_wire_format() {
        let json = r#"{"imageUrl":"https://cdn.example/a.jpg","embedding":[1.0,0.0]}"#;
        let rec: PhotoRecord = serde_json::from_str(json).unwrap();
        assert_eq!(rec.image_url, "https://cdn.example/a.jpg");
        assert_eq!(rec.embedding.values, vec![1.0, 0.0]);
    }
}
