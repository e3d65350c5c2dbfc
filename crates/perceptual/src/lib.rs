//! # Copyguard Perceptual Fingerprinting
//!
//! Compact, similarity-preserving fingerprints for four content modalities:
//!
//! | Modality | Fingerprint                | Algorithm                                  |
//! |----------|----------------------------|--------------------------------------------|
//! | Text     | [`TextShingleSet`]         | word n-gram shingles, compared by Jaccard  |
//! | Image    | [`Hash64`]                 | 9×8 difference hash (dHash)                |
//! | Video    | [`FrameHashSequence`]      | one 8×8 average hash (aHash) per second    |
//! | Audio    | [`AudioChunkHashSequence`] | one 64-segment energy aHash per second     |
//!
//! Still images use dHash because it captures the gradient structure of a
//! single picture. Video frames and audio chunks use aHash, whose global
//! threshold tolerates the uniform brightness and gain shifts introduced by
//! re-encoding.
//!
//! ## Contract
//!
//! - Text shingling consumes normalized text from the `canonical` crate; it
//!   does no normalization of its own.
//! - Extraction is deterministic: the same content and the same
//!   [`PerceptualConfig`] always give the same fingerprint.
//! - Media extractors never fail. Undecodable seconds are skipped, a file
//!   that cannot be read at all yields an empty sequence, and a wall-clock
//!   timeout returns what was extracted so far.
//! - Decoding is delegated to a [`VideoSource`] or [`AudioSource`]. The
//!   [`FfmpegVideo`] and [`FfmpegAudio`] backends drive the `ffmpeg`
//!   command-line tools.
//!
//! ## Example
//!
//! ```
//! use perceptual::{jaccard, shingle};
//!
//! let a = shingle("the quick brown fox jumps over", 3);
//! let b = shingle("the quick brown fox leaps over", 3);
//!
//! assert_eq!(a.len(), 4);
//! assert!(jaccard(&a, &b) > 0.0 && jaccard(&a, &b) < 1.0);
//! ```
pub mod audio;
pub mod config;
pub mod fingerprint;
pub mod hash;
pub mod image_hash;
pub mod media;
pub mod shingles;
pub mod similarity;
pub mod video;

pub use crate::audio::{
    chunk_hash, extract_audio_fingerprint, resample_linear, AudioSource, MonoPcm,
};
pub use crate::config::{
    AudioConfig, PerceptualConfig, PerceptualError, TextConfig, VideoConfig, AUDIO_SEGMENTS,
    DEFAULT_AUDIO_SAMPLE_RATE, DEFAULT_EXTRACT_TIMEOUT_SECS, DEFAULT_MAX_SECONDS,
};
pub use crate::fingerprint::{
    AudioChunkHash, AudioChunkHashSequence, Fingerprint, FrameHash, FrameHashSequence, Modality,
};
pub use crate::hash::{Hash64, HASH_BITS};
pub use crate::image_hash::{hash_image, hash_image_bytes};
pub use crate::media::{
    audio_fingerprint_file, video_fingerprint_file, FfmpegAudio, FfmpegVideo, MediaError,
};
pub use crate::shingles::{shingle, shingle_tokens, TextShingleSet};
pub use crate::similarity::{jaccard, sequence_overlap};
pub use crate::video::{extract_frame_hashes, frame_ahash, VideoSource};

/// Image hash: a 64-bit dHash.
pub type ImageHash = Hash64;
