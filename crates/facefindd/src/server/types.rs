use serde::Serialize;

use facefind_core::Match;

/// Response body for `POST /find`.
#[derive(Debug, Serialize)]
pub struct FindResponse {
    pub matches: Vec<Match>,
}

/// Response body for `GET /health`.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    /// Number of indexed face records.
    pub records: usize,
    /// Embedding dimension of the loaded store, if non-empty.
    pub dimension: Option<usize>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_response_shape() {
        let body = FindResponse {
            matches: vec![Match {
                image_url: "https://cdn.example/a.jpg".into(),
                score: 0.9,
            }],
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["matches"][0]["imageUrl"], "https://cdn.example/a.jpg");
        assert_eq!(json["matches"][0]["score"], 0.9);
    }
}
