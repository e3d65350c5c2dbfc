//! YAML configuration file support for Copyguard.
//!
//! A single file configures every stage: text canonicalization, the
//! per-modality fingerprint extractors and the scan orchestrator. Every
//! section is optional and falls back to the library defaults; only
//! `version` is required.
//!
//! ## Example YAML Configuration
//!
//! ```yaml
//! version: "1.0"
//! name: "forum posts"
//!
//! canonical:
//!   version: 1
//!   strip_markup: true
//!   normalize_unicode: true
//!   strip_punctuation: true
//!   lowercase: true
//!
//! text:
//!   shingle_size: 3
//!   min_shingles: 3
//!
//! video:
//!   max_frames: 300
//!   timeout_secs: 60
//!
//! audio:
//!   sample_rate: 5512
//!   max_chunks: 300
//!   timeout_secs: 60
//!
//! scan:
//!   thresholds:
//!     exact: 95
//!     high: 80
//!     moderate: 60
//!     low: 30
//!   image_max_distance: 10
//!   frame_max_distance: 10
//!   audio_max_distance: 10
//!   max_workers: 0
//!   max_results: 50
//! ```

use std::fs;
use std::path::Path;

use canonical::CanonicalizeConfig;
use matcher::ScanConfig;
use perceptual::{
    AudioConfig, PerceptualConfig, TextConfig, VideoConfig, DEFAULT_AUDIO_SAMPLE_RATE,
    DEFAULT_EXTRACT_TIMEOUT_SECS, DEFAULT_MAX_SECONDS,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur when loading YAML configuration files
#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("unsupported config version: {0}")]
    UnsupportedVersion(String),
}

/// Top-level YAML configuration for a Copyguard deployment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct CopyguardConfig {
    /// Configuration format version
    pub version: String,

    /// Optional configuration name/description
    #[serde(default)]
    pub name: Option<String>,

    /// Text canonicalization applied before shingling
    #[serde(default)]
    pub canonical: CanonicalYamlConfig,

    #[serde(default)]
    pub text: TextYamlConfig,

    #[serde(default)]
    pub video: VideoYamlConfig,

    #[serde(default)]
    pub audio: AudioYamlConfig,

    /// Thresholds, Hamming limits, worker count and result cap
    #[serde(default)]
    pub scan: ScanConfig,
}

impl CopyguardConfig {
    /// Load a YAML configuration file from the given path
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigLoadError> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse YAML configuration from a string
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigLoadError> {
        let config: CopyguardConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the version and every section against the library validators.
    pub fn validate(&self) -> Result<(), ConfigLoadError> {
        match self.version.as_str() {
            "1.0" | "1" => Ok(()),
            v => Err(ConfigLoadError::UnsupportedVersion(v.to_string())),
        }?;

        self.canonical_config()
            .validate()
            .map_err(|e| ConfigLoadError::Validation(format!("canonical: {e}")))?;
        self.perceptual_config()
            .validate()
            .map_err(|e| ConfigLoadError::Validation(format!("perceptual: {e}")))?;
        self.scan
            .validate()
            .map_err(|e| ConfigLoadError::Validation(format!("scan: {e}")))?;

        Ok(())
    }

    pub fn canonical_config(&self) -> CanonicalizeConfig {
        CanonicalizeConfig {
            version: self.canonical.version,
            strip_markup: self.canonical.strip_markup,
            normalize_unicode: self.canonical.normalize_unicode,
            strip_punctuation: self.canonical.strip_punctuation,
            lowercase: self.canonical.lowercase,
        }
    }

    /// The `text`, `video` and `audio` sections folded into one
    /// [`PerceptualConfig`].
    pub fn perceptual_config(&self) -> PerceptualConfig {
        PerceptualConfig {
            text: TextConfig {
                shingle_size: self.text.shingle_size,
                min_shingles: self.text.min_shingles,
            },
            video: VideoConfig {
                max_frames: self.video.max_frames,
                timeout_secs: self.video.timeout_secs,
            },
            audio: AudioConfig {
                sample_rate: self.audio.sample_rate,
                max_chunks: self.audio.max_chunks,
                timeout_secs: self.audio.timeout_secs,
            },
            ..PerceptualConfig::default()
        }
    }

    pub fn scan_config(&self) -> ScanConfig {
        self.scan.clone()
    }
}

impl Default for CopyguardConfig {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            name: None,
            canonical: CanonicalYamlConfig::default(),
            text: TextYamlConfig::default(),
            video: VideoYamlConfig::default(),
            audio: AudioYamlConfig::default(),
            scan: ScanConfig::default(),
        }
    }
}

/// Canonicalization stage YAML configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalYamlConfig {
    #[serde(default = "default_version")]
    pub version: u32,

    #[serde(default = "true_value")]
    pub strip_markup: bool,

    #[serde(default = "true_value")]
    pub normalize_unicode: bool,

    #[serde(default = "true_value")]
    pub strip_punctuation: bool,

    #[serde(default = "true_value")]
    pub lowercase: bool,
}

impl Default for CanonicalYamlConfig {
    fn default() -> Self {
        Self {
            version: 1,
            strip_markup: true,
            normalize_unicode: true,
            strip_punctuation: true,
            lowercase: true,
        }
    }
}

/// Text shingling YAML configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextYamlConfig {
    #[serde(default = "default_shingle_size")]
    pub shingle_size: usize,

    /// Texts with fewer distinct shingles are reported as insufficient signal
    #[serde(default = "default_min_shingles")]
    pub min_shingles: usize,
}

impl Default for TextYamlConfig {
    fn default() -> Self {
        Self {
            shingle_size: default_shingle_size(),
            min_shingles: default_min_shingles(),
        }
    }
}

/// Video frame hashing YAML configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoYamlConfig {
    #[serde(default = "default_max_seconds")]
    pub max_frames: u32,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for VideoYamlConfig {
    fn default() -> Self {
        Self {
            max_frames: default_max_seconds(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Audio chunk hashing YAML configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioYamlConfig {
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,

    #[serde(default = "default_max_seconds")]
    pub max_chunks: u32,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for AudioYamlConfig {
    fn default() -> Self {
        Self {
            sample_rate: default_sample_rate(),
            max_chunks: default_max_seconds(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

// Helper functions for serde defaults
fn default_version() -> u32 {
    1
}
fn true_value() -> bool {
    true
}
fn default_shingle_size() -> usize {
    TextConfig::default().shingle_size
}
fn default_min_shingles() -> usize {
    TextConfig::default().min_shingles
}
fn default_max_seconds() -> u32 {
    DEFAULT_MAX_SECONDS
}
fn default_timeout_secs() -> u64 {
    DEFAULT_EXTRACT_TIMEOUT_SECS
}
fn default_sample_rate() -> u32 {
    DEFAULT_AUDIO_SAMPLE_RATE
}
