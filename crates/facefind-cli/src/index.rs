//! Offline index builder.
//!
//! Scans one directory of event photos, runs face detection and embedding
//! extraction on each, and writes the record list the daemon loads at
//! startup. One bad photo never aborts the run: it is logged and skipped.

use std::path::{Path, PathBuf};

use anyhow::Result;
use image::RgbImage;

use facefind_core::{Face, PhotoRecord};

/// Image file extensions the builder will pick up (case-insensitive).
const IMAGE_EXTENSIONS: [&str; 5] = ["jpg", "jpeg", "png", "bmp", "webp"];

/// Counters reported after a build run.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct BuildStats {
    /// Photos that yielded at least one face.
    pub images_indexed: usize,
    /// Photos skipped because no face was detected.
    pub images_without_faces: usize,
    /// Photos skipped because decoding or inference failed.
    pub images_failed: usize,
    /// Total face records emitted.
    pub faces_found: usize,
}

/// List indexable image files directly inside `dir` (non-recursive),
/// sorted by filename so record order is reproducible.
pub fn scan_directory(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && has_image_extension(path))
        .collect();
    files.sort();
    Ok(files)
}

fn has_image_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            IMAGE_EXTENSIONS.contains(&ext.as_str())
        })
        .unwrap_or(false)
}

/// Join the hosting base URL with a photo's filename.
///
/// The photos themselves are uploaded to the host separately; the index
/// only records where each one will live.
pub fn image_url(base_url: &str, file_name: &str) -> String {
    if base_url.ends_with('/') {
        format!("{base_url}{file_name}")
    } else {
        format!("{base_url}/{file_name}")
    }
}

/// Build records for a set of photo files.
///
/// `analyze` is the face pipeline (injected so tests can fake it). Produces
/// one record per detected face; a multi-face photo contributes several
/// records sharing one URL.
pub fn build_records(
    files: &[PathBuf],
    base_url: &str,
    mut analyze: impl FnMut(&RgbImage) -> Result<Vec<Face>>,
) -> (Vec<PhotoRecord>, BuildStats) {
    let mut records = Vec::new();
    let mut stats = BuildStats::default();

    for path in files {
        let file_name = match path.file_name().and_then(|n| n.to_str()) {
            Some(name) => name,
            None => {
                tracing::warn!(path = %path.display(), "skipping file with non-UTF-8 name");
                stats.images_failed += 1;
                continue;
            }
        };

        let faces = match load_and_analyze(path, &mut analyze) {
            Ok(faces) => faces,
            Err(err) => {
                tracing::warn!(file = file_name, error = %err, "skipping photo after error");
                stats.images_failed += 1;
                continue;
            }
        };

        if faces.is_empty() {
            tracing::warn!(file = file_name, "no faces found, skipping");
            stats.images_without_faces += 1;
            continue;
        }

        let url = image_url(base_url, file_name);
        tracing::info!(file = file_name, faces = faces.len(), "indexed");
        stats.images_indexed += 1;
        stats.faces_found += faces.len();

        for face in faces {
            records.push(PhotoRecord {
                image_url: url.clone(),
                embedding: face.embedding,
            });
        }
    }

    (records, stats)
}

fn load_and_analyze(
    path: &Path,
    analyze: &mut impl FnMut(&RgbImage) -> Result<Vec<Face>>,
) -> Result<Vec<Face>> {
    let image = image::open(path)?.to_rgb8();
    analyze(&image)
}
