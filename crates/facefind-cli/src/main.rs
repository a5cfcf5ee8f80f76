use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};

use facefind_core::{
    store, FaceAnalyzer, LinearScan, NearestNeighbor, PhotoStore, SearchParams,
};

mod index;

#[derive(Parser)]
#[command(name = "facefind", about = "facefind offline tools: build and query the photo index")]
struct Cli {
    /// Directory containing the ONNX model files.
    #[arg(long, global = true)]
    model_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the embedding index from a directory of event photos
    Index {
        /// Directory of photos to scan (non-recursive)
        images_dir: PathBuf,
        /// Base URL where the photos are hosted, e.g.
        /// "https://res.cloudinary.com/your-cloud/image/upload/events/"
        base_url: String,
        /// Output store file
        #[arg(short, long, default_value = "embeddings.json")]
        output: PathBuf,
    },
    /// Print stats about an existing store file
    Inspect {
        /// Store file to inspect
        store: PathBuf,
    },
    /// Match a selfie against a store file locally, without the daemon
    Find {
        /// Store file to search
        store: PathBuf,
        /// Selfie to match
        image: PathBuf,
        /// Maximum number of matches to print
        #[arg(long, default_value_t = 20)]
        top_k: usize,
        /// Minimum cosine similarity to report
        #[arg(long, default_value_t = 0.3)]
        min_score: f32,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let model_dir = cli
        .model_dir
        .clone()
        .unwrap_or_else(facefind_core::default_model_dir);

    match cli.command {
        Commands::Index {
            images_dir,
            base_url,
            output,
        } => run_index(&model_dir, &images_dir, &base_url, &output),
        Commands::Inspect { store } => run_inspect(&store),
        Commands::Find {
            store,
            image,
            top_k,
            min_score,
        } => run_find(&model_dir, &store, &image, top_k, min_score),
    }
}

fn load_analyzer(model_dir: &std::path::Path) -> Result<FaceAnalyzer> {
    FaceAnalyzer::load(
        &model_dir
            .join(facefind_core::DETECTOR_MODEL_FILE)
            .to_string_lossy(),
        &model_dir
            .join(facefind_core::RECOGNIZER_MODEL_FILE)
            .to_string_lossy(),
    )
    .context("loading ONNX models")
}

fn run_index(
    model_dir: &std::path::Path,
    images_dir: &std::path::Path,
    base_url: &str,
    output: &std::path::Path,
) -> Result<()> {
    if !images_dir.is_dir() {
        bail!("{} is not a directory", images_dir.display());
    }
    if !base_url.starts_with("http") {
        tracing::warn!(base_url, "base URL does not start with http(s); recorded links may be dead");
    }

    let mut analyzer = load_analyzer(model_dir)?;

    let files = index::scan_directory(images_dir)
        .with_context(|| format!("scanning {}", images_dir.display()))?;
    tracing::info!(count = files.len(), "found candidate photos");

    let (records, stats) =
        index::build_records(&files, base_url, |img| Ok(analyzer.analyze(img)?));

    store::write_records(output, &records)
        .with_context(|| format!("writing {}", output.display()))?;

    println!(
        "indexed {} photos ({} faces) into {}",
        stats.images_indexed,
        stats.faces_found,
        output.display()
    );
    println!(
        "skipped: {} without faces, {} failed",
        stats.images_without_faces, stats.images_failed
    );
    Ok(())
}

fn run_inspect(store_path: &std::path::Path) -> Result<()> {
    let store = PhotoStore::load(store_path)
        .with_context(|| format!("loading {}", store_path.display()))?;
    println!("records:   {}", store.len());
    match store.dimension() {
        Some(dim) => println!("dimension: {dim}"),
        None => println!("dimension: (empty store)"),
    }
    Ok(())
}

fn run_find(
    model_dir: &std::path::Path,
    store_path: &std::path::Path,
    image_path: &std::path::Path,
    top_k: usize,
    min_score: f32,
) -> Result<()> {
    let store = PhotoStore::load(store_path)
        .with_context(|| format!("loading {}", store_path.display()))?;
    let mut analyzer = load_analyzer(model_dir)?;

    let image = image::open(image_path)
        .with_context(|| format!("opening {}", image_path.display()))?
        .to_rgb8();
    let faces = analyzer.analyze(&image)?;
    let Some(face) = faces.first() else {
        bail!("no face detected in {}", image_path.display());
    };
    if faces.len() > 1 {
        tracing::warn!(
            faces = faces.len(),
            "multiple faces in query image; using the most confident one"
        );
    }

    let matches = LinearScan::new(&store).search(&face.embedding, SearchParams { top_k, min_score })?;
    if matches.is_empty() {
        println!("no matches above {min_score}");
        return Ok(());
    }
    for m in matches {
        println!("{:.4}  {}", m.score, m.image_url);
    }
    Ok(())
}
