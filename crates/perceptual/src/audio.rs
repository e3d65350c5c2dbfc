//! Per-second audio energy hashing.
//!
//! Audio is decoded to mono at a fixed low sample rate and cut into
//! non-overlapping one-second chunks. Each chunk is split into 64 equal
//! sub-segments; a segment whose RMS energy is non-zero and at or above the
//! chunk's mean energy sets its bit. Silent chunks hash to zero and are
//! dropped.

use std::time::Instant;

use tracing::{debug, warn};

use crate::config::{AudioConfig, AUDIO_SEGMENTS};
use crate::fingerprint::{AudioChunkHash, AudioChunkHashSequence};
use crate::hash::Hash64;
use crate::media::MediaError;

/// Mono PCM samples at their own sample rate.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MonoPcm {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
}

/// A decodable audio stream.
pub trait AudioSource {
    /// Decode at most `max_seconds` of audio, downmixed to mono and resampled
    /// to `sample_rate`.
    fn decode_mono(&mut self, sample_rate: u32, max_seconds: u32) -> Result<Vec<f32>, MediaError>;

    /// Decode at most `max_seconds` of audio, downmixed to mono at the
    /// stream's own sample rate.
    fn decode_native(&mut self, max_seconds: u32) -> Result<MonoPcm, MediaError>;
}

/// Hash one chunk per second of audio.
///
/// Never fails. When the resampling decode fails the native-rate decode is
/// tried and resampled here; when both fail the sequence is empty.
///
/// `cfg.timeout()` bounds decoding only and is enforced by the source: a
/// decoder cut off at its deadline hands back the PCM it produced, and every
/// whole second of it is hashed. Hashing itself is bounded by
/// `cfg.max_chunks`.
pub fn extract_audio_fingerprint<S: AudioSource + ?Sized>(
    source: &mut S,
    cfg: &AudioConfig,
) -> AudioChunkHashSequence {
    let started = Instant::now();
    let rate = cfg.sample_rate;

    let samples = match source.decode_mono(rate, cfg.max_chunks) {
        Ok(samples) => samples,
        Err(primary) => {
            warn!(error = %primary, sample_rate = rate, "audio_primary_decode_failed");
            match source.decode_native(cfg.max_chunks) {
                Ok(pcm) => resample_linear(&pcm.samples, pcm.sample_rate, rate),
                Err(fallback) => {
                    warn!(error = %fallback, "audio_fallback_decode_failed");
                    return AudioChunkHashSequence::default();
                }
            }
        }
    };

    let chunk_len = rate as usize;
    if chunk_len == 0 {
        return AudioChunkHashSequence::default();
    }

    let mut chunks = Vec::new();
    let mut silent = 0usize;
    for (index, chunk) in samples
        .chunks_exact(chunk_len)
        .take(cfg.max_chunks as usize)
        .enumerate()
    {
        let hash = chunk_hash(chunk);
        if hash.is_zero() {
            silent += 1;
            continue;
        }
        chunks.push(AudioChunkHash {
            chunk_index: index as u32,
            hash,
        });
    }

    debug!(
        chunks = chunks.len(),
        silent,
        samples = samples.len(),
        elapsed_micros = started.elapsed().as_micros() as u64,
        "audio_extract_complete"
    );
    AudioChunkHashSequence(chunks)
}

/// Energy aHash of one chunk.
///
/// Segment `i` covers samples `[i * len / 64, (i + 1) * len / 64)`.
pub fn chunk_hash(chunk: &[f32]) -> Hash64 {
    let len = chunk.len();
    let mut energies = [0f64; AUDIO_SEGMENTS];
    for (i, energy) in energies.iter_mut().enumerate() {
        let segment = &chunk[i * len / AUDIO_SEGMENTS..(i + 1) * len / AUDIO_SEGMENTS];
        *energy = rms(segment);
    }
    let mean = energies.iter().sum::<f64>() / AUDIO_SEGMENTS as f64;
    Hash64::from_bits(energies.iter().map(|&e| e > 0.0 && e >= mean))
}

fn rms(segment: &[f32]) -> f64 {
    if segment.is_empty() {
        return 0.0;
    }
    let sum_sq: f64 = segment.iter().map(|&s| f64::from(s) * f64::from(s)).sum();
    (sum_sq / segment.len() as f64).sqrt()
}

/// Linear-interpolation resampler.
pub fn resample_linear(samples: &[f32], from_rate: u32, to_rate: u32) -> Vec<f32> {
    if from_rate == 0 || to_rate == 0 || samples.is_empty() {
        return Vec::new();
    }
    if from_rate == to_rate {
        return samples.to_vec();
    }

    let out_len = (samples.len() as u64 * u64::from(to_rate) / u64::from(from_rate)) as usize;
    let step = f64::from(from_rate) / f64::from(to_rate);
    (0..out_len)
        .map(|i| {
            let pos = i as f64 * step;
            let idx = pos as usize;
            let frac = (pos - idx as f64) as f32;
            let a = samples[idx];
            let b = samples.get(idx + 1).copied().unwrap_or(a);
            a + (b - a) * frac
        })
        .collect()
}
