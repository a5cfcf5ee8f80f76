use std::path::PathBuf;

/// Daemon configuration, loaded from environment variables.
pub struct Config {
    /// Address the HTTP server binds to.
    pub listen_addr: String,
    /// Directory containing ONNX model files.
    pub model_dir: PathBuf,
    /// Path to the JSON embedding store produced by the indexer.
    pub store_path: PathBuf,
    /// Maximum number of matches returned per query.
    pub top_k: usize,
    /// Cosine similarity floor below which a face is not reported.
    pub min_score: f32,
    /// Timeout in seconds for one face-analysis request.
    pub request_timeout_secs: u64,
    /// Upload size cap in bytes.
    pub max_upload_bytes: usize,
}

impl Config {
    /// Load configuration from `FACEFIND_*` environment variables with defaults.
    pub fn from_env() -> Self {
        let model_dir = std::env::var("FACEFIND_MODEL_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| facefind_core::default_model_dir());

        let store_path = std::env::var("FACEFIND_STORE_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("embeddings.json"));

        Self {
            listen_addr: std::env::var("FACEFIND_LISTEN_ADDR")
                .unwrap_or_else(|_| "0.0.0.0:8000".to_string()),
            model_dir,
            store_path,
            top_k: env_usize("FACEFIND_TOP_K", 20),
            min_score: env_f32("FACEFIND_MIN_SCORE", 0.3),
            request_timeout_secs: env_u64("FACEFIND_REQUEST_TIMEOUT_SECS", 30),
            max_upload_bytes: env_usize("FACEFIND_MAX_UPLOAD_BYTES", 10 * 1024 * 1024),
        }
    }

    /// Path to the SCRFD detection model.
    pub fn detector_model_path(&self) -> String {
        self.model_dir
            .join(facefind_core::DETECTOR_MODEL_FILE)
            .to_string_lossy()
            .into_owned()
    }

    /// Path to the ArcFace recognition model.
    pub fn recognizer_model_path(&self) -> String {
        self.model_dir
            .join(facefind_core::RECOGNIZER_MODEL_FILE)
            .to_string_lossy()
            .into_owned()
    }
}

fn env_f32(key: &str, default: f32) -> f32 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_u64(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_usize(key: &str, default: usize) -> usize {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
