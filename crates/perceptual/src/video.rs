//! Per-second video frame hashing.
//!
//! One frame is sampled at every whole second `t` in
//! `0..min(floor(duration), max_frames)`. Each frame is center-cropped to its
//! largest square, reduced to 8×8 luma and hashed with aHash: a cell at or
//! above the mean of all 64 cells sets its bit.

use std::time::Instant;

use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView};
use tracing::{debug, warn};

use crate::config::VideoConfig;
use crate::fingerprint::{FrameHash, FrameHashSequence};
use crate::hash::Hash64;
use crate::image_hash::luma601;
use crate::media::MediaError;

const AHASH_SIDE: u32 = 8;

/// A seekable, decodable video.
pub trait VideoSource {
    /// Total duration in seconds.
    fn duration_seconds(&mut self) -> Result<f64, MediaError>;

    /// Decode the frame shown at `second`.
    fn frame_at(&mut self, second: u32) -> Result<DynamicImage, MediaError>;
}

/// Sample and hash one frame per second.
///
/// Never fails. An unreadable duration gives an empty sequence; a frame that
/// fails to decode, or is blank, leaves a gap. When `cfg.timeout()` elapses
/// the frames hashed so far are returned.
pub fn extract_frame_hashes<S: VideoSource + ?Sized>(
    source: &mut S,
    cfg: &VideoConfig,
) -> FrameHashSequence {
    let started = Instant::now();
    let deadline = started + cfg.timeout();

    let duration = match source.duration_seconds() {
        Ok(d) if d.is_finite() && d > 0.0 => d,
        Ok(d) => {
            debug!(duration = d, "video_duration_unusable");
            return FrameHashSequence::default();
        }
        Err(err) => {
            warn!(error = %err, "video_probe_failed");
            return FrameHashSequence::default();
        }
    };

    let seconds = (duration.floor() as u64).min(u64::from(cfg.max_frames)) as u32;
    let mut frames = Vec::with_capacity(seconds as usize);

    for t in 0..seconds {
        if Instant::now() >= deadline {
            warn!(
                sampled = t,
                planned = seconds,
                kept = frames.len(),
                timeout_secs = cfg.timeout_secs,
                "video_extract_timeout"
            );
            break;
        }
        match source.frame_at(t) {
            Ok(frame) => match frame_ahash(&frame) {
                Some(hash) => frames.push(FrameHash {
                    frame_index: t,
                    hash,
                    timestamp_seconds: t,
                }),
                None => debug!(second = t, "video_frame_blank"),
            },
            Err(err) => debug!(second = t, error = %err, "video_frame_decode_failed"),
        }
    }

    debug!(
        frames = frames.len(),
        planned = seconds,
        elapsed_micros = started.elapsed().as_micros() as u64,
        "video_extract_complete"
    );
    FrameHashSequence(frames)
}

/// aHash of a single frame, or `None` when the frame is blank.
///
/// A frame is blank when its 1×1 downsample is fully transparent or pure
/// black; decoders emit such frames when a seek lands before the first
/// keyframe.
pub fn frame_ahash(frame: &DynamicImage) -> Option<Hash64> {
    let (width, height) = frame.dimensions();
    if width == 0 || height == 0 || is_blank(frame) {
        return None;
    }

    let side = width.min(height);
    let square = frame.crop_imm((width - side) / 2, (height - side) / 2, side, side);
    let small = square
        .resize_exact(AHASH_SIDE, AHASH_SIDE, FilterType::Triangle)
        .to_rgb8();

    let values: Vec<f32> = small
        .pixels()
        .map(|p| {
            let [r, g, b] = p.0;
            luma601(r, g, b)
        })
        .collect();
    let mean = values.iter().sum::<f32>() / values.len() as f32;
    Some(Hash64::from_bits(values.iter().map(|&v| v >= mean)))
}

fn is_blank(frame: &DynamicImage) -> bool {
    let pixel = frame.resize_exact(1, 1, FilterType::Triangle).to_rgba8();
    let [r, g, b, a] = pixel.get_pixel(0, 0).0;
    a == 0 || (r == 0 && g == 0 && b == 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage, Rgba, RgbaImage};
    use std::collections::HashSet;

    /// In-memory video: a duration plus a frame generator.
    struct SyntheticVideo<F> {
        duration: Result<f64, ()>,
        frame: F,
        requested: Vec<u32>,
    }

    impl<F: FnMut(u32) -> Option<DynamicImage>> SyntheticVideo<F> {
        fn new(duration: f64, frame: F) -> Self {
            Self {
                duration: Ok(duration),
                frame,
                requested: Vec::new(),
            }
        }
    }

    impl<F: FnMut(u32) -> Option<DynamicImage>> VideoSource for SyntheticVideo<F> {
        fn duration_seconds(&mut self) -> Result<f64, MediaError> {
            self.duration
                .map_err(|_| MediaError::Probe("no duration".to_string()))
        }

        fn frame_at(&mut self, second: u32) -> Result<DynamicImage, MediaError> {
            self.requested.push(second);
            (self.frame)(second).ok_or(MediaError::FrameDecode {
                second,
                reason: "synthetic failure".to_string(),
            })
        }
    }

    fn solid(w: u32, h: u32, rgb: [u8; 3]) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_pixel(w, h, Rgb(rgb)))
    }

    fn checker(w: u32, h: u32, cell: u32) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_fn(w, h, |x, y| {
            if (x / cell + y / cell) % 2 == 0 {
                Rgb([250, 250, 250])
            } else {
                Rgb([20, 20, 20])
            }
        }))
    }

    #[test]
    fn static_color_video_yields_identical_hashes() {
        let mut video = SyntheticVideo::new(10.0, |_| Some(solid(64, 36, [200, 40, 40])));
        let seq = extract_frame_hashes(&mut video, &VideoConfig::default());

        assert_eq!(seq.len(), 10);
        let first = seq.0[0].hash;
        assert!(seq.hashes().all(|h| h.hamming_distance(first) == 0));
        let indices: Vec<u32> = seq.iter().map(|f| f.frame_index).collect();
        assert_eq!(indices, (0..10).collect::<Vec<_>>());
        assert!(seq.iter().all(|f| f.frame_index == f.timestamp_seconds));
    }

    #[test]
    fn fractional_duration_is_floored() {
        let mut video = SyntheticVideo::new(4.9, |_| Some(checker(32, 32, 4)));
        let seq = extract_frame_hashes(&mut video, &VideoConfig::default());
        assert_eq!(seq.len(), 4);
        assert_eq!(video.requested, vec![0, 1, 2, 3]);
    }

    #[test]
    fn bounded_by_max_frames() {
        let cfg = VideoConfig {
            max_frames: 5,
            ..Default::default()
        };
        let mut video = SyntheticVideo::new(3600.0, |_| Some(checker(32, 32, 4)));
        let seq = extract_frame_hashes(&mut video, &cfg);
        assert_eq!(seq.len(), 5);
        assert_eq!(video.requested.len(), 5);
    }

    #[test]
    fn decode_failures_and_blank_frames_leave_gaps() {
        let mut video = SyntheticVideo::new(6.0, |t| match t {
            1 => None,
            3 => Some(solid(16, 16, [0, 0, 0])),
            4 => Some(DynamicImage::ImageRgba8(RgbaImage::from_pixel(
                16,
                16,
                Rgba([255, 255, 255, 0]),
            ))),
            _ => Some(checker(32, 32, 4)),
        });
        let seq = extract_frame_hashes(&mut video, &VideoConfig::default());
        let indices: Vec<u32> = seq.iter().map(|f| f.frame_index).collect();
        assert_eq!(indices, vec![0, 2, 5]);
    }

    #[test]
    fn unreadable_duration_gives_empty_sequence() {
        let mut video = SyntheticVideo::new(10.0, |_| Some(checker(8, 8, 1)));
        video.duration = Err(());
        assert!(extract_frame_hashes(&mut video, &VideoConfig::default()).is_empty());

        let mut video = SyntheticVideo::new(f64::NAN, |_| Some(checker(8, 8, 1)));
        assert!(extract_frame_hashes(&mut video, &VideoConfig::default()).is_empty());
    }

    #[test]
    fn sub_second_video_is_empty() {
        let mut video = SyntheticVideo::new(0.8, |_| Some(checker(8, 8, 1)));
        assert!(extract_frame_hashes(&mut video, &VideoConfig::default()).is_empty());
    }

    #[test]
    fn expired_deadline_returns_what_was_collected() {
        let cfg = VideoConfig {
            timeout_secs: 0,
            ..Default::default()
        };
        let mut video = SyntheticVideo::new(10.0, |_| Some(checker(8, 8, 1)));
        assert!(extract_frame_hashes(&mut video, &cfg).is_empty());
        assert!(video.requested.is_empty());
    }

    #[test]
    fn deadline_mid_video_keeps_earlier_frames_in_order() {
        let cfg = VideoConfig {
            timeout_secs: 1,
            ..Default::default()
        };
        // Deadline checks land at roughly 0.0s, 0.4s, 0.8s and 1.2s.
        let mut video = SyntheticVideo::new(10.0, |t| {
            std::thread::sleep(std::time::Duration::from_millis(400));
            Some(checker(8 + t * 8, 8 + t * 8, 1 + t))
        });
        let seq = extract_frame_hashes(&mut video, &cfg);

        let seconds: Vec<u32> = seq.iter().map(|f| f.timestamp_seconds).collect();
        assert_eq!(seconds, vec![0, 1, 2]);
        assert_eq!(video.requested, vec![0, 1, 2]);
        for (expected, frame) in seq.iter().enumerate() {
            let t = expected as u32;
            assert_eq!(frame.frame_index, t);
            assert_eq!(Some(frame.hash), frame_ahash(&checker(8 + t * 8, 8 + t * 8, 1 + t)));
        }
    }

    #[test]
    fn center_crop_ignores_letterbox_bars() {
        // A square checkerboard padded left and right with solid bars.
        let inner = checker(64, 64, 8).to_rgb8();
        let padded = DynamicImage::ImageRgb8(RgbImage::from_fn(128, 64, |x, y| {
            if (32..96).contains(&x) {
                *inner.get_pixel(x - 32, y)
            } else {
                Rgb([255, 0, 255])
            }
        }));
        let bare = DynamicImage::ImageRgb8(inner);
        assert_eq!(frame_ahash(&padded), frame_ahash(&bare));
    }

    #[test]
    fn distinct_frames_hash_differently() {
        let hashes: HashSet<Hash64> = [checker(64, 64, 8), checker(64, 64, 16), checker(64, 64, 32)]
            .iter()
            .filter_map(frame_ahash)
            .collect();
        assert_eq!(hashes.len(), 3);
    }
}
