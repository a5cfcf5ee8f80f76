//! Inference engine on a dedicated OS thread.
//!
//! ort sessions need `&mut self` to run, so all face analysis is serialized
//! on one thread that owns both models. HTTP handlers talk to it through a
//! bounded channel; a full channel pushes back on uploads instead of piling
//! unbounded work onto the CPU-bound inference loop.

use image::RgbImage;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};

use facefind_core::{AnalyzerError, Face, FaceAnalyzer};

/// How many analysis requests may queue before senders wait.
const ENGINE_QUEUE_DEPTH: usize = 4;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("analyzer error: {0}")]
    Analyzer(#[from] AnalyzerError),
    #[error("engine thread exited")]
    ChannelClosed,
}

struct AnalyzeRequest {
    image: RgbImage,
    reply: oneshot::Sender<Result<Vec<Face>, EngineError>>,
}

/// Clone-safe handle to the engine thread.
#[derive(Clone)]
pub struct EngineHandle {
    tx: mpsc::Sender<AnalyzeRequest>,
}

impl EngineHandle {
    /// Detect faces and extract embeddings for one photo.
    pub async fn analyze(&self, image: RgbImage) -> Result<Vec<Face>, EngineError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(AnalyzeRequest {
                image,
                reply: reply_tx,
            })
            .await
            .map_err(|_| EngineError::ChannelClosed)?;
        reply_rx.await.map_err(|_| EngineError::ChannelClosed)?
    }
}

/// Spawn the engine on a dedicated OS thread.
///
/// Loads both ONNX models synchronously so a missing model file fails the
/// daemon at startup, then enters the request loop.
pub fn spawn_engine(detector_path: &str, recognizer_path: &str) -> Result<EngineHandle, EngineError> {
    let mut analyzer = FaceAnalyzer::load(detector_path, recognizer_path)?;
    tracing::info!(
        detector = detector_path,
        recognizer = recognizer_path,
        "face analyzer loaded"
    );

    let (tx, mut rx) = mpsc::channel::<AnalyzeRequest>(ENGINE_QUEUE_DEPTH);

    std::thread::Builder::new()
        .name("facefind-engine".into())
        .spawn(move || {
            tracing::info!("engine thread started");
            while let Some(req) = rx.blocking_recv() {
                let result = analyzer.analyze(&req.image).map_err(EngineError::from);
                let _ = req.reply.send(result);
            }
            tracing::info!("engine thread exiting");
        })
        .expect("failed to spawn engine thread");

    Ok(EngineHandle { tx })
}
