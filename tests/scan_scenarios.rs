//! End-to-end scan scenarios across every modality.

use std::io::Cursor;

use copyguard::{
    extract_audio_fingerprint, extract_frame_hashes, AudioConfig, AudioSource, CandidateWindow,
    Fingerprint, Item, MatchError, MatchType, MediaError, Modality, MonoPcm, PerceptualConfig,
    ScanReport, Scanner, VideoConfig, VideoSource,
};
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};

fn scanner() -> Scanner {
    Scanner::with_defaults().expect("default scanner")
}

fn ids(report: &ScanReport) -> Vec<&str> {
    report
        .matches
        .iter()
        .map(|m| m.candidate_id.as_str())
        .collect()
}

fn gradient_png(width: u32, height: u32, rising: bool) -> Vec<u8> {
    let img = DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, _| {
        let v = (x * 255 / (width - 1)) as u8;
        let v = if rising { v } else { 255 - v };
        Rgb([v, v, v])
    }));
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
        .expect("png encode");
    buf
}

/// Frames switch from `first` to `second` at `switch_at`.
struct ScriptedVideo {
    seconds: f64,
    switch_at: u32,
    first: DynamicImage,
    second: DynamicImage,
}

impl VideoSource for ScriptedVideo {
    fn duration_seconds(&mut self) -> Result<f64, MediaError> {
        Ok(self.seconds)
    }

    fn frame_at(&mut self, second: u32) -> Result<DynamicImage, MediaError> {
        if second < self.switch_at {
            Ok(self.first.clone())
        } else {
            Ok(self.second.clone())
        }
    }
}

fn left_bright() -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_fn(64, 64, |x, _| {
        if x < 32 {
            Rgb([220, 220, 220])
        } else {
            Rgb([20, 20, 20])
        }
    }))
}

fn top_bright() -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_fn(64, 64, |_, y| {
        if y < 32 {
            Rgb([220, 220, 220])
        } else {
            Rgb([20, 20, 20])
        }
    }))
}

fn video_fingerprint(source: &mut ScriptedVideo) -> Fingerprint {
    Fingerprint::Video(extract_frame_hashes(source, &VideoConfig::default()))
}

/// One-second chunks whose 64 energy segments are loud where the pattern
/// bit is set (most significant bit first).
struct PatternAudio {
    patterns: Vec<u64>,
}

impl PatternAudio {
    fn samples(&self, rate: u32) -> Vec<f32> {
        let len = rate as usize;
        let mut out = Vec::with_capacity(len * self.patterns.len());
        for &pattern in &self.patterns {
            for i in 0..64 {
                let amplitude = if (pattern >> (63 - i)) & 1 == 1 { 0.8 } else { 0.05 };
                let start = i * len / 64;
                let end = (i + 1) * len / 64;
                out.extend(std::iter::repeat(amplitude).take(end - start));
            }
        }
        out
    }
}

impl AudioSource for PatternAudio {
    fn decode_mono(&mut self, sample_rate: u32, _max_seconds: u32) -> Result<Vec<f32>, MediaError> {
        Ok(self.samples(sample_rate))
    }

    fn decode_native(&mut self, _max_seconds: u32) -> Result<MonoPcm, MediaError> {
        Err(MediaError::Probe("unused".into()))
    }
}

fn audio_fingerprint(patterns: &[u64]) -> Fingerprint {
    let mut source = PatternAudio {
        patterns: patterns.to_vec(),
    };
    Fingerprint::Audio(extract_audio_fingerprint(&mut source, &AudioConfig::default()))
}

const P1: u64 = 0x0000_0000_FFFF_FFFF;
const P2: u64 = 0xFFFF_FFFF_0000_0000;
const P3: u64 = 0x00FF_00FF_00FF_00FF;
const P4: u64 = 0x0F0F_0F0F_0F0F_0F0F;

#[test]
fn repost_of_an_article_is_flagged() -> Result<(), MatchError> {
    let original = "<article><h1>Ten tips for spring gardening</h1>\
        <p>Start by clearing dead leaves and loosening the soil before planting.</p></article>";
    let repost = "Ten tips for spring gardening. Start by clearing dead leaves \
        and loosening the soil before planting!";
    let edited = "Ten tips for spring gardening. Start by clearing dead leaves \
        and turning the compost before planting.";
    let unrelated = "Quarterly earnings beat expectations across the retail sector this year.";

    let source = Item::text("post-new", original);
    let window = CandidateWindow::new(vec![
        Item::text("post-unrelated", unrelated),
        Item::text("post-edited", edited),
        Item::text("post-repost", repost),
    ]);

    let report = scanner().scan(&source, &window)?;
    assert_eq!(report.modality, Modality::Text);
    assert_eq!(report.candidates_compared, 3);
    assert_eq!(ids(&report), vec!["post-repost", "post-edited"]);
    assert_eq!(report.matches[0].similarity_percent, 100);
    assert_eq!(report.matches[0].match_type, MatchType::Exact);
    assert!(report.matches[1].similarity_percent < 100);
    assert!(report.matches[1].match_type >= MatchType::Low);
    Ok(())
}

#[test]
fn rescaled_image_matches_and_inverted_image_does_not() -> Result<(), MatchError> {
    let source = Item::image("img-src", gradient_png(64, 48, true), "image/png");
    let window = CandidateWindow::new(vec![
        Item::image("img-rescaled", gradient_png(160, 120, true), "image/png"),
        Item::image("img-inverted", gradient_png(64, 48, false), "image/png"),
        Item::text("post-text", "a text post in the same window as the images"),
    ]);

    let report = scanner().scan(&source, &window)?;
    assert_eq!(report.modality, Modality::Image);
    assert_eq!(report.candidates_compared, 2);
    assert_eq!(report.candidates_skipped, 1);
    assert_eq!(ids(&report), vec!["img-rescaled"]);
    assert_eq!(report.matches[0].match_type, MatchType::Exact);
    Ok(())
}

#[test]
fn static_video_yields_one_identical_hash_per_second() {
    let mut video = ScriptedVideo {
        seconds: 10.4,
        switch_at: u32::MAX,
        first: left_bright(),
        second: top_bright(),
    };
    let Fingerprint::Video(frames) = video_fingerprint(&mut video) else {
        panic!("expected a video fingerprint");
    };

    assert_eq!(frames.len(), 10);
    let indices: Vec<u32> = frames.iter().map(|f| f.frame_index).collect();
    assert_eq!(indices, (0..10).collect::<Vec<_>>());
    let first = frames.0[0].hash;
    assert!(frames.iter().all(|f| f.hash.hamming_distance(first) == 0));
}

#[test]
fn partially_reused_video_scores_share_of_source_frames() -> Result<(), MatchError> {
    let source = video_fingerprint(&mut ScriptedVideo {
        seconds: 10.0,
        switch_at: 5,
        first: left_bright(),
        second: top_bright(),
    });
    let full_copy = video_fingerprint(&mut ScriptedVideo {
        seconds: 10.0,
        switch_at: 5,
        first: left_bright(),
        second: top_bright(),
    });
    let half_copy = video_fingerprint(&mut ScriptedVideo {
        seconds: 10.0,
        switch_at: u32::MAX,
        first: left_bright(),
        second: top_bright(),
    });

    let window = CandidateWindow::new(vec![
        Item::fingerprint("vid-half", half_copy),
        Item::fingerprint("vid-full", full_copy),
    ]);
    let report = scanner().scan(&Item::fingerprint("vid-src", source), &window)?;

    assert_eq!(ids(&report), vec!["vid-full", "vid-half"]);
    assert_eq!(report.matches[0].similarity_percent, 100);
    assert_eq!(report.matches[1].similarity_percent, 50);
    assert_eq!(report.matches[1].match_type, MatchType::Low);
    Ok(())
}

#[test]
fn audio_chunk_hashes_follow_energy_pattern() {
    let Fingerprint::Audio(chunks) = audio_fingerprint(&[P1, P2, P3]) else {
        panic!("expected an audio fingerprint");
    };
    let hashes: Vec<u64> = chunks.iter().map(|c| c.hash.0).collect();
    assert_eq!(hashes, vec![P1, P2, P3]);
}

#[test]
fn silent_audio_has_no_signal() -> Result<(), MatchError> {
    let silent = Fingerprint::Audio(extract_audio_fingerprint(
        &mut PatternAudio { patterns: vec![] },
        &AudioConfig::default(),
    ));
    assert!(silent.is_empty());

    let report = scanner().scan(
        &Item::fingerprint("aud-silent", silent),
        &CandidateWindow::new(vec![Item::fingerprint("aud-1", audio_fingerprint(&[P1]))]),
    )?;
    assert!(report.insufficient_signal);
    assert!(report.matches.is_empty());
    Ok(())
}

#[test]
fn audio_with_one_replaced_second_is_moderate() -> Result<(), MatchError> {
    let source = audio_fingerprint(&[P1, P2, P3, P4]);
    // The complement of P4 is 64 bits from it and 32 bits from the others.
    let candidate = audio_fingerprint(&[P1, P2, P3, !P4]);

    let report = scanner().scan(
        &Item::fingerprint("aud-src", source),
        &CandidateWindow::new(vec![Item::fingerprint("aud-edit", candidate)]),
    )?;
    assert_eq!(report.matches.len(), 1);
    assert_eq!(report.matches[0].similarity_percent, 75);
    assert_eq!(report.matches[0].match_type, MatchType::Moderate);
    Ok(())
}

#[test]
fn stored_fingerprints_compare_like_raw_content() -> Result<(), MatchError> {
    let scanner = scanner();
    let body = "the same post body posted twice on the same afternoon";
    let stored = scanner
        .fingerprint(&Item::text("post-old", body))
        .expect("text always fingerprints");

    let report = scanner.scan(
        &Item::text("post-new", body),
        &CandidateWindow::new(vec![Item::fingerprint("post-old", stored)]),
    )?;
    assert_eq!(ids(&report), vec!["post-old"]);
    assert_eq!(report.matches[0].similarity_percent, 100);
    Ok(())
}

#[test]
fn report_serializes_to_json() -> Result<(), MatchError> {
    let report = scanner().scan(
        &Item::text("a", "one two three four five"),
        &CandidateWindow::new(vec![Item::text("b", "one two three four five")]),
    )?;
    let json = serde_json::to_value(&report).expect("serialize report");
    assert_eq!(json["source_id"], "a");
    assert_eq!(json["modality"], "text");
    assert_eq!(json["matches"][0]["candidate_id"], "b");
    assert_eq!(json["matches"][0]["similarity_percent"], 100);
    assert_eq!(json["matches"][0]["match_type"], "exact");
    Ok(())
}

#[test]
fn config_tuned_shingle_size_changes_signal() -> Result<(), MatchError> {
    let body = "five words in this post";
    let default_scanner = scanner();
    let source = Item::text("src", body);
    let window = CandidateWindow::new(vec![Item::text("copy", body)]);

    // Five tokens give three 3-shingles: just enough by default.
    assert!(!default_scanner.scan(&source, &window)?.insufficient_signal);

    let strict = Scanner::new(
        Default::default(),
        PerceptualConfig::default().with_min_shingles(4),
        Default::default(),
    )?;
    assert!(strict.scan(&source, &window)?.insufficient_signal);
    Ok(())
}
