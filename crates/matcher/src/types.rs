use std::path::PathBuf;

use canonical::CanonicalError;
use chrono::{DateTime, Utc};
use perceptual::{Fingerprint, Modality, PerceptualError, HASH_BITS};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Strength bucket of a similarity score.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum MatchType {
    /// Below the `low` threshold. Never surfaced in a [`ScanReport`].
    None,
    Low,
    Moderate,
    High,
    Exact,
}

/// Percent thresholds that partition `[0, 100]` into the [`MatchType`]
/// buckets. Each threshold is the inclusive lower bound of its bucket.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct SimilarityThresholds {
    #[serde(default = "SimilarityThresholds::default_exact")]
    pub exact: u8,
    #[serde(default = "SimilarityThresholds::default_high")]
    pub high: u8,
    #[serde(default = "SimilarityThresholds::default_moderate")]
    pub moderate: u8,
    #[serde(default = "SimilarityThresholds::default_low")]
    pub low: u8,
}

impl SimilarityThresholds {
    pub(crate) fn default_exact() -> u8 {
        95
    }

    pub(crate) fn default_high() -> u8 {
        80
    }

    pub(crate) fn default_moderate() -> u8 {
        60
    }

    pub(crate) fn default_low() -> u8 {
        30
    }

    /// Thresholds must be strictly ordered `0 < low < moderate < high < exact <= 100`.
    pub fn validate(&self) -> Result<(), MatchError> {
        if self.low == 0 {
            return Err(MatchError::InvalidConfig(
                "thresholds.low must be greater than zero".into(),
            ));
        }
        if !(self.low < self.moderate && self.moderate < self.high && self.high < self.exact) {
            return Err(MatchError::InvalidConfig(format!(
                "thresholds must satisfy low < moderate < high < exact (got {}/{}/{}/{})",
                self.low, self.moderate, self.high, self.exact
            )));
        }
        if self.exact > 100 {
            return Err(MatchError::InvalidConfig(format!(
                "thresholds.exact must be <= 100 (got {})",
                self.exact
            )));
        }
        Ok(())
    }
}

impl Default for SimilarityThresholds {
    fn default() -> Self {
        Self {
            exact: Self::default_exact(),
            high: Self::default_high(),
            moderate: Self::default_moderate(),
            low: Self::default_low(),
        }
    }
}

/// Scan-wide comparison and ranking settings.
///
/// `ScanConfig` is cheap to clone and serde-friendly so it can be embedded in
/// higher-level configuration files.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScanConfig {
    #[serde(default)]
    pub thresholds: SimilarityThresholds,
    /// Largest image hash distance still counted as a near-duplicate.
    #[serde(default = "ScanConfig::default_max_distance")]
    pub image_max_distance: u32,
    /// Largest frame hash distance for two video frames to match.
    #[serde(default = "ScanConfig::default_max_distance")]
    pub frame_max_distance: u32,
    /// Largest chunk hash distance for two audio chunks to match.
    #[serde(default = "ScanConfig::default_max_distance")]
    pub audio_max_distance: u32,
    /// Worker threads used to compare candidates; 0 means one per core.
    #[serde(default)]
    pub max_workers: usize,
    /// Truncate the ranked result list to this many entries.
    #[serde(default)]
    pub max_results: Option<usize>,
}

impl ScanConfig {
    pub(crate) fn default_max_distance() -> u32 {
        10
    }

    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_thresholds(mut self, thresholds: SimilarityThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    pub fn with_image_max_distance(mut self, distance: u32) -> Self {
        self.image_max_distance = distance;
        self
    }

    pub fn with_frame_max_distance(mut self, distance: u32) -> Self {
        self.frame_max_distance = distance;
        self
    }

    pub fn with_audio_max_distance(mut self, distance: u32) -> Self {
        self.audio_max_distance = distance;
        self
    }

    pub fn with_max_workers(mut self, workers: usize) -> Self {
        self.max_workers = workers;
        self
    }

    pub fn with_max_results(mut self, max_results: Option<usize>) -> Self {
        self.max_results = max_results;
        self
    }

    /// Validate the scan configuration.
    pub fn validate(&self) -> Result<(), MatchError> {
        self.thresholds.validate()?;
        for (name, value) in [
            ("image_max_distance", self.image_max_distance),
            ("frame_max_distance", self.frame_max_distance),
            ("audio_max_distance", self.audio_max_distance),
        ] {
            if value > HASH_BITS {
                return Err(MatchError::InvalidConfig(format!(
                    "{name} must be <= {HASH_BITS} (got {value})"
                )));
            }
        }
        if self.max_results == Some(0) {
            return Err(MatchError::InvalidConfig(
                "max_results must be greater than zero when set".into(),
            ));
        }
        Ok(())
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            thresholds: SimilarityThresholds::default(),
            image_max_distance: Self::default_max_distance(),
            frame_max_distance: Self::default_max_distance(),
            audio_max_distance: Self::default_max_distance(),
            max_workers: 0,
            max_results: None,
        }
    }
}

/// Raw content of a post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Content {
    /// Post body: plain text or HTML.
    Text(String),
    /// Image bytes with their declared MIME type.
    Image { bytes: Vec<u8>, mime: String },
    /// Path to a video file.
    Video(PathBuf),
    /// Path to an audio file, or a video file whose audio track is used.
    Audio(PathBuf),
}

impl Content {
    pub fn modality(&self) -> Modality {
        match self {
            Content::Text(_) => Modality::Text,
            Content::Image { .. } => Modality::Image,
            Content::Video(_) => Modality::Video,
            Content::Audio(_) => Modality::Audio,
        }
    }
}

/// What an [`Item`] carries: raw content to fingerprint, or a fingerprint the
/// caller stored earlier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemContent {
    Raw(Content),
    Fingerprint(Fingerprint),
}

impl ItemContent {
    pub fn modality(&self) -> Modality {
        match self {
            ItemContent::Raw(content) => content.modality(),
            ItemContent::Fingerprint(fp) => fp.modality(),
        }
    }
}

/// A post taking part in a scan, either as the source or as a candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    pub id: String,
    /// Publication time; used to break ranking ties (newer first).
    pub published_at: Option<DateTime<Utc>>,
    pub content: ItemContent,
}

impl Item {
    pub fn new(id: impl Into<String>, content: ItemContent) -> Self {
        Self {
            id: id.into(),
            published_at: None,
            content,
        }
    }

    pub fn text(id: impl Into<String>, body: impl Into<String>) -> Self {
        Self::new(id, ItemContent::Raw(Content::Text(body.into())))
    }

    pub fn image(id: impl Into<String>, bytes: Vec<u8>, mime: impl Into<String>) -> Self {
        Self::new(
            id,
            ItemContent::Raw(Content::Image {
                bytes,
                mime: mime.into(),
            }),
        )
    }

    pub fn video(id: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self::new(id, ItemContent::Raw(Content::Video(path.into())))
    }

    pub fn audio(id: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self::new(id, ItemContent::Raw(Content::Audio(path.into())))
    }

    pub fn fingerprint(id: impl Into<String>, fingerprint: Fingerprint) -> Self {
        Self::new(id, ItemContent::Fingerprint(fingerprint))
    }

    pub fn with_published_at(mut self, published_at: DateTime<Utc>) -> Self {
        self.published_at = Some(published_at);
        self
    }

    pub fn modality(&self) -> Modality {
        self.content.modality()
    }
}

/// Caller-selected candidates for one scan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CandidateWindow {
    pub candidates: Vec<Item>,
    /// Keep only the N most recent candidates.
    pub max_candidates: Option<usize>,
}

impl CandidateWindow {
    pub fn new(candidates: Vec<Item>) -> Self {
        Self {
            candidates,
            max_candidates: None,
        }
    }

    pub fn with_max_candidates(mut self, max_candidates: usize) -> Self {
        self.max_candidates = Some(max_candidates);
        self
    }
}

/// One surfaced match.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MatchResult {
    pub candidate_id: String,
    /// Integer similarity in `[0, 100]`.
    pub similarity_percent: u8,
    pub match_type: MatchType,
}

/// Outcome of a scan.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScanReport {
    pub source_id: String,
    pub modality: Modality,
    /// Ranked matches: similarity descending, then newer candidates first,
    /// then candidate id ascending.
    pub matches: Vec<MatchResult>,
    /// The source had too little content to compare; `matches` is empty.
    pub insufficient_signal: bool,
    /// Candidates whose similarity was computed.
    pub candidates_compared: usize,
    /// Candidates passed over for a modality mismatch or too little signal.
    pub candidates_skipped: usize,
}

/// Errors produced by the matching layer.
///
/// Only configuration problems surface here. Content that cannot be
/// fingerprinted is reported through [`ScanReport`] instead.
#[derive(Debug, Error)]
pub enum MatchError {
    /// Invalid scan configuration or scan request.
    #[error("invalid scan config: {0}")]
    InvalidConfig(String),
    /// Text normalization config rejected.
    #[error("canonical config rejected: {0}")]
    Canonical(#[from] CanonicalError),
    /// Fingerprint config rejected.
    #[error("perceptual config rejected: {0}")]
    Perceptual(#[from] PerceptualError),
    /// The comparison worker pool could not be created.
    #[error("failed to build scan worker pool: {0}")]
    WorkerPool(String),
}
