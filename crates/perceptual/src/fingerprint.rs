//! Fingerprint types produced by the perceptual extractors.
//!
//! The serialized shape of these types is a public contract: callers persist
//! them next to the owning content and hand them back as scan candidates.
//! Any incompatible change must bump the config `version`.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::hash::Hash64;
use crate::shingles::TextShingleSet;

/// Content modality a fingerprint was derived from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Modality {
    Text,
    Image,
    Video,
    Audio,
}

impl Modality {
    pub fn as_str(self) -> &'static str {
        match self {
            Modality::Text => "text",
            Modality::Image => "image",
            Modality::Video => "video",
            Modality::Audio => "audio",
        }
    }
}

impl fmt::Display for Modality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// aHash of the frame sampled at one whole second of a video.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameHash {
    /// Sampled second; equal to `timestamp_seconds`.
    pub frame_index: u32,
    pub hash: Hash64,
    pub timestamp_seconds: u32,
}

/// Ordered per-second frame hashes.
///
/// Indices are strictly increasing. Seconds whose frame could not be decoded,
/// or was blank, are absent, so gaps are expected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FrameHashSequence(pub Vec<FrameHash>);

impl FrameHashSequence {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FrameHash> {
        self.0.iter()
    }

    pub fn hashes(&self) -> impl Iterator<Item = Hash64> + '_ {
        self.0.iter().map(|f| f.hash)
    }
}

/// Energy aHash of one non-silent one-second audio chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioChunkHash {
    pub chunk_index: u32,
    pub hash: Hash64,
}

/// Ordered per-second audio chunk hashes. Silent chunks are absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AudioChunkHashSequence(pub Vec<AudioChunkHash>);

impl AudioChunkHashSequence {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, AudioChunkHash> {
        self.0.iter()
    }

    pub fn hashes(&self) -> impl Iterator<Item = Hash64> + '_ {
        self.0.iter().map(|c| c.hash)
    }
}

/// A fingerprint of any modality.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum Fingerprint {
    Text(TextShingleSet),
    Image(Hash64),
    Video(FrameHashSequence),
    Audio(AudioChunkHashSequence),
}

impl Fingerprint {
    pub fn modality(&self) -> Modality {
        match self {
            Fingerprint::Text(_) => Modality::Text,
            Fingerprint::Image(_) => Modality::Image,
            Fingerprint::Video(_) => Modality::Video,
            Fingerprint::Audio(_) => Modality::Audio,
        }
    }

    /// True when the fingerprint carries nothing to compare.
    ///
    /// An image hash always counts as present; an undecodable image never
    /// produces a fingerprint in the first place. The text minimum shingle
    /// count is a scan setting and is checked by the caller.
    pub fn is_empty(&self) -> bool {
        match self {
            Fingerprint::Text(set) => set.is_empty(),
            Fingerprint::Image(_) => false,
            Fingerprint::Video(seq) => seq.is_empty(),
            Fingerprint::Audio(seq) => seq.is_empty(),
        }
    }
}

impl From<TextShingleSet> for Fingerprint {
    fn from(set: TextShingleSet) -> Self {
        Fingerprint::Text(set)
    }
}

impl From<Hash64> for Fingerprint {
    fn from(hash: Hash64) -> Self {
        Fingerprint::Image(hash)
    }
}

impl From<FrameHashSequence> for Fingerprint {
    fn from(seq: FrameHashSequence) -> Self {
        Fingerprint::Video(seq)
    }
}

impl From<AudioChunkHashSequence> for Fingerprint {
    fn from(seq: AudioChunkHashSequence) -> Self {
        Fingerprint::Audio(seq)
    }
}
