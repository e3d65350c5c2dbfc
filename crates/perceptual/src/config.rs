//! Configuration and error types for perceptual fingerprinting.
//!
//! Everything here is plain data: no I/O and no environment lookups, so an
//! extractor is a pure function of `(content, config)` apart from the media
//! decoding it delegates to a [`VideoSource`](crate::VideoSource) or
//! [`AudioSource`](crate::AudioSource).

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Sample rate audio is resampled to before chunk hashing.
pub const DEFAULT_AUDIO_SAMPLE_RATE: u32 = 5512;

/// Default cap on sampled seconds of video and audio.
pub const DEFAULT_MAX_SECONDS: u32 = 300;

/// Default wall-clock budget for one video or audio extraction.
pub const DEFAULT_EXTRACT_TIMEOUT_SECS: u64 = 60;

/// Number of energy sub-segments per audio chunk; one per hash bit.
pub const AUDIO_SEGMENTS: usize = 64;

/// Text shingling parameters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TextConfig {
    /// Number of tokens per shingle.
    pub shingle_size: usize,
    /// Minimum number of distinct shingles before a text is worth comparing.
    /// Below this the text is reported as insufficient signal.
    pub min_shingles: usize,
}

impl Default for TextConfig {
    fn default() -> Self {
        Self {
            shingle_size: 3,
            min_shingles: 3,
        }
    }
}

/// Per-second video frame hashing parameters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VideoConfig {
    /// Upper bound on sampled seconds.
    pub max_frames: u32,
    /// Wall-clock budget; on expiry the frames hashed so far are returned.
    pub timeout_secs: u64,
}

impl VideoConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for VideoConfig {
    fn default() -> Self {
        Self {
            max_frames: DEFAULT_MAX_SECONDS,
            timeout_secs: DEFAULT_EXTRACT_TIMEOUT_SECS,
        }
    }
}

/// Per-second audio chunk hashing parameters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AudioConfig {
    /// Target mono sample rate; also the chunk length in samples.
    pub sample_rate: u32,
    /// Upper bound on hashed one-second chunks.
    pub max_chunks: u32,
    /// Wall-clock budget; on expiry the chunks hashed so far are returned.
    pub timeout_secs: u64,
}

impl AudioConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            sample_rate: DEFAULT_AUDIO_SAMPLE_RATE,
            max_chunks: DEFAULT_MAX_SECONDS,
            timeout_secs: DEFAULT_EXTRACT_TIMEOUT_SECS,
        }
    }
}

/// Configuration for every perceptual extractor.
///
/// Fingerprints are only comparable when produced under the same `version`
/// and the same per-modality parameters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PerceptualConfig {
    /// Configuration schema version; bump on any change that alters output.
    pub version: u32,
    #[serde(default)]
    pub text: TextConfig,
    #[serde(default)]
    pub video: VideoConfig,
    #[serde(default)]
    pub audio: AudioConfig,
}

impl PerceptualConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the shingle size (tokens per shingle).
    pub fn with_shingle_size(mut self, n: usize) -> Self {
        self.text.shingle_size = n;
        self
    }

    /// Set the minimum shingle count required for a comparable text.
    pub fn with_min_shingles(mut self, min: usize) -> Self {
        self.text.min_shingles = min;
        self
    }

    pub fn with_max_frames(mut self, max_frames: u32) -> Self {
        self.video.max_frames = max_frames;
        self
    }

    pub fn with_max_chunks(mut self, max_chunks: u32) -> Self {
        self.audio.max_chunks = max_chunks;
        self
    }

    /// Set the same wall-clock budget for video and audio extraction.
    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.video.timeout_secs = secs;
        self.audio.timeout_secs = secs;
        self
    }

    /// Validate configuration parameters.
    pub fn validate(&self) -> Result<(), PerceptualError> {
        if self.version == 0 {
            return Err(PerceptualError::InvalidConfigVersion {
                version: self.version,
            });
        }
        if self.text.shingle_size == 0 {
            return Err(PerceptualError::InvalidConfigShingleSize {
                n: self.text.shingle_size,
            });
        }
        if self.text.min_shingles == 0 {
            return Err(PerceptualError::InvalidConfigMinShingles {
                min: self.text.min_shingles,
            });
        }
        if self.video.max_frames == 0 {
            return Err(PerceptualError::InvalidConfigMaxFrames {
                max: self.video.max_frames,
            });
        }
        if self.audio.max_chunks == 0 {
            return Err(PerceptualError::InvalidConfigMaxChunks {
                max: self.audio.max_chunks,
            });
        }
        // Every energy sub-segment needs at least one sample.
        if (self.audio.sample_rate as usize) < AUDIO_SEGMENTS {
            return Err(PerceptualError::InvalidConfigSampleRate {
                rate: self.audio.sample_rate,
            });
        }
        Ok(())
    }
}

impl Default for PerceptualConfig {
    fn default() -> Self {
        Self {
            version: 1,
            text: TextConfig::default(),
            video: VideoConfig::default(),
            audio: AudioConfig::default(),
        }
    }
}

/// Errors returned by the perceptual layer.
///
/// Media extraction itself never fails (it degrades to an empty sequence);
/// these cover configuration, image decoding and stored-hash parsing.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PerceptualError {
    #[error("invalid config version {version}; expected >= 1")]
    InvalidConfigVersion { version: u32 },

    #[error("invalid config: shingle_size must be >= 1 (got {n})")]
    InvalidConfigShingleSize { n: usize },

    #[error("invalid config: min_shingles must be >= 1 (got {min})")]
    InvalidConfigMinShingles { min: usize },

    #[error("invalid config: max_frames must be >= 1 (got {max})")]
    InvalidConfigMaxFrames { max: u32 },

    #[error("invalid config: max_chunks must be >= 1 (got {max})")]
    InvalidConfigMaxChunks { max: u32 },

    #[error("invalid config: audio sample_rate must be >= 64 Hz (got {rate})")]
    InvalidConfigSampleRate { rate: u32 },

    #[error("image decode failed: {0}")]
    ImageDecode(String),

    #[error("invalid hash hex {0:?}; expected 16 hex characters")]
    InvalidHashHex(String),
}
