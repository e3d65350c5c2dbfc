//! Workspace umbrella crate for Copyguard.
//!
//! Copyguard tells whether a newly published post is a copy or near-copy of
//! recent posts. This crate stitches the workspace together so callers get a
//! single API entry point:
//!
//! - [`canonical`]: markup stripping and text normalization
//! - [`perceptual`]: text shingles, image dHash, per-second video and audio hashes
//! - [`matcher`]: the [`Scanner`] that compares a source against a candidate
//!   window and classifies every match
//!
//! On top of the re-exports it provides the YAML [`CopyguardConfig`] and a few
//! file-oriented helpers used by the `copyguard` binary.

pub mod config;

pub use canonical::{
    hash_bytes, hash_text, normalize, normalize_with, normalize_with_tokens, strip_markup,
    CanonicalError, CanonicalizeConfig, Token,
};
pub use matcher::{
    classify, compare, similarity_percent, CacheKey, CandidateWindow, Content, FingerprintCache,
    Item, ItemContent, LruFingerprintCache, MatchError, MatchResult, MatchType, ScanConfig,
    ScanMetrics, ScanReport, Scanner, SimilarityThresholds,
};
pub use perceptual::{
    extract_audio_fingerprint, extract_frame_hashes, frame_ahash, hash_image, hash_image_bytes,
    jaccard, sequence_overlap, shingle, AudioChunkHash, AudioChunkHashSequence, AudioConfig,
    AudioSource, Fingerprint, FrameHash, FrameHashSequence, Hash64, ImageHash, MediaError,
    Modality, MonoPcm, PerceptualConfig, PerceptualError, TextShingleSet, VideoConfig,
    VideoSource,
};

pub use crate::config::{ConfigLoadError, CopyguardConfig};

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

/// Errors surfaced by the file-oriented helpers of this crate.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigLoadError),

    #[error("scan failed: {0}")]
    Match(#[from] MatchError),

    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{modality} content at {path} produced no fingerprint")]
    NoFingerprint { modality: Modality, path: PathBuf },
}

/// Build a [`Scanner`] from a loaded configuration file.
pub fn scanner_from_config(config: &CopyguardConfig) -> Result<Scanner, PipelineError> {
    let scanner = Scanner::new(
        config.canonical_config(),
        config.perceptual_config(),
        config.scan_config(),
    )?;
    Ok(scanner)
}

/// Turn a file on disk into [`Content`] of the given modality.
///
/// Text and images are read into memory; video and audio stay on disk and
/// are decoded lazily by the extractors.
pub fn load_content(modality: Modality, path: &Path) -> Result<Content, PipelineError> {
    let read_err = |source| PipelineError::Read {
        path: path.to_path_buf(),
        source,
    };
    let content = match modality {
        Modality::Text => Content::Text(fs::read_to_string(path).map_err(read_err)?),
        Modality::Image => Content::Image {
            bytes: fs::read(path).map_err(read_err)?,
            mime: mime_from_extension(path).to_string(),
        },
        Modality::Video => Content::Video(path.to_path_buf()),
        Modality::Audio => Content::Audio(path.to_path_buf()),
    };
    debug!(modality = %modality, path = %path.display(), "content_loaded");
    Ok(content)
}

/// Fingerprint a single file.
pub fn fingerprint_file(
    scanner: &Scanner,
    modality: Modality,
    path: &Path,
) -> Result<Fingerprint, PipelineError> {
    let content = load_content(modality, path)?;
    scanner
        .fingerprint_content(&content)
        .ok_or_else(|| PipelineError::NoFingerprint {
            modality,
            path: path.to_path_buf(),
        })
}

/// Scan `source` against the single candidate `candidate`.
///
/// The items are named `source` and `candidate` so that comparing a file
/// with itself is not suppressed as a self-match.
pub fn compare_files(
    scanner: &Scanner,
    modality: Modality,
    source: &Path,
    candidate: &Path,
) -> Result<ScanReport, PipelineError> {
    let source = Item::new("source", ItemContent::Raw(load_content(modality, source)?));
    let candidate = Item::new(
        "candidate",
        ItemContent::Raw(load_content(modality, candidate)?),
    );
    let report = scanner.scan(&source, &CandidateWindow::new(vec![candidate]))?;
    Ok(report)
}

/// Best-effort MIME type from a file extension. Unknown extensions fall back
/// to content sniffing in the image decoder.
fn mime_from_extension(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        Some("bmp") => "image/bmp",
        _ => "application/octet-stream",
    }
}
