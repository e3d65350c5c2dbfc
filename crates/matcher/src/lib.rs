//! # Copyguard Matcher (`matcher`)
//!
//! ## Purpose
//!
//! `matcher` sits on top of the fingerprinting crates (`canonical` and
//! `perceptual`). Given a source post and a caller-selected window of
//! candidate posts it fingerprints whatever is not already fingerprinted,
//! compares every candidate of the same modality against the source, buckets
//! the similarity into a [`MatchType`] and returns a ranked [`ScanReport`].
//!
//! It never queries storage: candidate selection belongs to the caller, which
//! also persists fingerprints and passes them back as
//! [`ItemContent::Fingerprint`] on later scans.
//!
//! ## Core Types
//!
//! - [`Item`]: an id, an optional publication time and either raw
//!   [`Content`] or a stored [`Fingerprint`](perceptual::Fingerprint).
//! - [`CandidateWindow`]: the candidates for one scan, optionally capped to
//!   the most recent N.
//! - [`ScanConfig`]: [`SimilarityThresholds`], per-modality Hamming limits,
//!   worker count and result cap.
//! - [`Scanner`]: owns the configuration and a rayon worker pool; runs scans.
//! - [`MatchResult`] / [`ScanReport`]: the output.
//!
//! ## Per-modality similarity
//!
//! | Modality | Similarity percent                                                     |
//! |----------|------------------------------------------------------------------------|
//! | Text     | Jaccard similarity of shingle sets × 100                                |
//! | Image    | `(64 − distance) / 64 × 100`; 0 beyond `image_max_distance`              |
//! | Video    | share of source frames with a candidate frame within `frame_max_distance`|
//! | Audio    | share of source chunks with a candidate chunk within `audio_max_distance`|
//!
//! ## Example Usage
//!
//! ```
//! use matcher::{CandidateWindow, Item, MatchType, Scanner};
//!
//! let scanner = Scanner::with_defaults().unwrap();
//! let source = Item::text("post-1", "<p>The quick brown fox jumps over the lazy dog</p>");
//! let window = CandidateWindow::new(vec![
//!     Item::text("post-1", "the quick brown fox jumps over the lazy dog"),
//!     Item::text("post-2", "The quick brown fox jumps over the lazy dog!"),
//!     Item::text("post-3", "An entirely unrelated post about gardening tips"),
//! ]);
//!
//! let report = scanner.scan(&source, &window).unwrap();
//! assert_eq!(report.matches.len(), 1);
//! assert_eq!(report.matches[0].candidate_id, "post-2");
//! assert_eq!(report.matches[0].match_type, MatchType::Exact);
//! ```
//!
//! ## Observability
//!
//! Every scan runs inside a `scan` tracing span and ends with a
//! `scan_complete` (or `scan_insufficient_signal`) event. Attach a
//! [`ScanMetrics`] implementation with [`Scanner::with_metrics`] to record
//! per-scan latency and counts, and a [`FingerprintCache`] with
//! [`Scanner::with_cache`] to reuse fingerprints of raw content across scans.

pub mod cache;
pub mod classify;
pub mod compare;
pub mod engine;
pub mod extract;
pub mod metrics;
pub mod types;

pub use crate::cache::{CacheKey, FingerprintCache, LruFingerprintCache};
pub use crate::classify::{classify, similarity_percent};
pub use crate::compare::{compare, image_similarity};
pub use crate::engine::Scanner;
pub use crate::extract::{content_hash, extract_fingerprint, has_signal};
pub use crate::metrics::ScanMetrics;
pub use crate::types::{
    CandidateWindow, Content, Item, ItemContent, MatchError, MatchResult, MatchType, ScanConfig,
    ScanReport, SimilarityThresholds,
};
