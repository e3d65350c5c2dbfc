//! Pairwise fingerprint comparison.

use perceptual::{jaccard, sequence_overlap, Fingerprint, Hash64, HASH_BITS};

use crate::classify::similarity_percent;
use crate::types::ScanConfig;

/// Similarity percent of `candidate` relative to `source`.
///
/// Returns `None` when the two fingerprints have different modalities.
///
/// - Text: Jaccard similarity of the shingle sets.
/// - Image: `(64 - distance) / 64`, or 0 beyond `image_max_distance`.
/// - Video and audio: share of source entries whose nearest candidate entry
///   lies within `frame_max_distance` / `audio_max_distance`.
pub fn compare(source: &Fingerprint, candidate: &Fingerprint, cfg: &ScanConfig) -> Option<u8> {
    let percent = match (source, candidate) {
        (Fingerprint::Text(a), Fingerprint::Text(b)) => similarity_percent(jaccard(a, b)),
        (Fingerprint::Image(a), Fingerprint::Image(b)) => {
            image_similarity(*a, *b, cfg.image_max_distance)
        }
        (Fingerprint::Video(a), Fingerprint::Video(b)) => {
            let a: Vec<Hash64> = a.hashes().collect();
            let b: Vec<Hash64> = b.hashes().collect();
            similarity_percent(sequence_overlap(&a, &b, cfg.frame_max_distance))
        }
        (Fingerprint::Audio(a), Fingerprint::Audio(b)) => {
            let a: Vec<Hash64> = a.hashes().collect();
            let b: Vec<Hash64> = b.hashes().collect();
            similarity_percent(sequence_overlap(&a, &b, cfg.audio_max_distance))
        }
        _ => return None,
    };
    Some(percent)
}

/// Image similarity percent for two dHashes.
pub fn image_similarity(a: Hash64, b: Hash64, max_distance: u32) -> u8 {
    let distance = a.hamming_distance(b);
    if distance > max_distance {
        return 0;
    }
    similarity_percent(f64::from(HASH_BITS - distance) / f64::from(HASH_BITS))
}
