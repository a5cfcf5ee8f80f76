//! Detector + recognizer facade.
//!
//! Mirrors the shape of InsightFace's `FaceAnalysis`: hand it a photo, get
//! back every detected face with its embedding. Both the indexer and the
//! query daemon go through this one entry point.

use image::RgbImage;
use thiserror::Error;

use crate::detector::{DetectorError, FaceDetector};
use crate::recognizer::{FaceRecognizer, RecognizerError};
use crate::types::Face;

#[derive(Error, Debug)]
pub enum AnalyzerError {
    #[error("detector: {0}")]
    Detector(#[from] DetectorError),
    #[error("recognizer: {0}")]
    Recognizer(#[from] RecognizerError),
}

/// Face detection and embedding extraction over whole photos.
///
/// Holds both ONNX sessions; `analyze` takes `&mut self` because ort
/// sessions do. Callers wanting concurrent analysis put this behind a
/// dedicated thread, not a lock.
pub struct FaceAnalyzer {
    detector: FaceDetector,
    recognizer: FaceRecognizer,
}

impl FaceAnalyzer {
    /// Load both models, failing fast if either file is missing.
    pub fn load(detector_path: &str, recognizer_path: &str) -> Result<Self, AnalyzerError> {
        let detector = FaceDetector::load(detector_path)?;
        let recognizer = FaceRecognizer::load(recognizer_path)?;
        Ok(Self {
            detector,
            recognizer,
        })
    }

    /// Detect every face in the photo and extract an embedding for each.
    ///
    /// Faces come back ordered by detection confidence, best first. An empty
    /// result means no face cleared the detector's confidence threshold; it
    /// is not an error here — callers decide whether that is fatal.
    pub fn analyze(&mut self, image: &RgbImage) -> Result<Vec<Face>, AnalyzerError> {
        let boxes = self.detector.detect(image)?;
        let mut faces = Vec::with_capacity(boxes.len());

        for bbox in boxes {
            let embedding = self.recognizer.extract(image, &bbox)?;
            faces.push(Face { bbox, embedding });
        }

        Ok(faces)
    }
}
