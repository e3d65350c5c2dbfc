//! Configuration types for the canonical text pipeline.
//!
//! [`CanonicalizeConfig`] controls how raw posts (plain text or HTML) are
//! reduced to the normalized form that shingling runs over.
//!
//! # Versioning
//!
//! Any change to normalization behavior, even a bug fix, must come with a
//! version bump. Shingle sets computed under different versions are not
//! comparable.
//!
//! # Examples
//!
//! ```rust
//! use canonical::CanonicalizeConfig;
//!
//! let config = CanonicalizeConfig::default();
//! assert_eq!(config.version, 1);
//! assert!(config.strip_markup);
//! assert!(config.normalize_unicode);
//! assert!(config.strip_punctuation);
//! assert!(config.lowercase);
//! ```

use serde::{Deserialize, Serialize};

use crate::error::CanonicalError;

/// Configuration for the canonical text pipeline.
///
/// Cheap to clone and serializable so it can be embedded in the YAML
/// configuration of the umbrella crate.
///
/// ```json
/// {
///   "version": 1,
///   "strip_markup": true,
///   "normalize_unicode": true,
///   "strip_punctuation": true,
///   "lowercase": true
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CanonicalizeConfig {
    /// Semantic version of the normalization behavior.
    ///
    /// Must be >= 1; version 0 is reserved and rejected with
    /// [`CanonicalError::InvalidConfig`].
    pub version: u32,

    /// If true, HTML tags, comments, `<script>`/`<style>` bodies and
    /// character entities are reduced to plain text before anything else.
    ///
    /// ```text
    /// "<p>Hello&nbsp;<b>world</b></p>" → "Hello world"
    /// ```
    pub strip_markup: bool,

    /// If true, apply Unicode NFKC normalization so that composed and
    /// decomposed forms of the same character compare equal.
    pub normalize_unicode: bool,

    /// If true, remove punctuation characters without introducing a word
    /// boundary.
    ///
    /// ```text
    /// "Don't stop, believing!" → "dont stop believing"
    /// ```
    ///
    /// Whitespace stays the only token delimiter, so contractions and
    /// hyphenated words remain a single token.
    pub strip_punctuation: bool,

    /// If true, apply locale-free Unicode lowercasing.
    pub lowercase: bool,
}

impl CanonicalizeConfig {
    /// Create a configuration with the default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable markup stripping.
    pub fn with_strip_markup(mut self, strip_markup: bool) -> Self {
        self.strip_markup = strip_markup;
        self
    }

    /// Enable or disable NFKC normalization.
    pub fn with_normalize_unicode(mut self, normalize_unicode: bool) -> Self {
        self.normalize_unicode = normalize_unicode;
        self
    }

    /// Enable or disable punctuation stripping.
    pub fn with_strip_punctuation(mut self, strip_punctuation: bool) -> Self {
        self.strip_punctuation = strip_punctuation;
        self
    }

    /// Enable or disable lowercasing.
    pub fn with_lowercase(mut self, lowercase: bool) -> Self {
        self.lowercase = lowercase;
        self
    }

    /// Validate configuration parameters.
    pub fn validate(&self) -> Result<(), CanonicalError> {
        if self.version == 0 {
            return Err(CanonicalError::InvalidConfig(
                "config version must be >= 1".into(),
            ));
        }
        Ok(())
    }
}

impl Default for CanonicalizeConfig {
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
