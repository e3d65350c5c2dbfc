//! Fingerprint extraction dispatched on content modality.

use std::fs::File;
use std::io::BufReader;

use canonical::{hash_bytes, hash_reader, hash_text, normalize_with_tokens, CanonicalizeConfig};
use perceptual::{
    audio_fingerprint_file, hash_image_bytes, shingle_tokens, video_fingerprint_file,
    Fingerprint, PerceptualConfig,
};
use tracing::{debug, warn};

use crate::types::Content;

/// Build the fingerprint of raw content.
///
/// Returns `None` only for images that cannot be decoded. Text and media
/// always produce a fingerprint, possibly an empty one; see [`has_signal`].
pub fn extract_fingerprint(
    content: &Content,
    canonical: &CanonicalizeConfig,
    perceptual: &PerceptualConfig,
) -> Option<Fingerprint> {
    match content {
        Content::Text(body) => {
            let (_, tokens) = normalize_with_tokens(body, canonical);
            Some(Fingerprint::Text(shingle_tokens(
                &tokens,
                perceptual.text.shingle_size,
            )))
        }
        Content::Image { bytes, mime } => match hash_image_bytes(bytes, mime) {
            Ok(hash) => Some(Fingerprint::Image(hash)),
            Err(err) => {
                warn!(mime = %mime, bytes = bytes.len(), error = %err, "image_fingerprint_failed");
                None
            }
        },
        Content::Video(path) => Some(Fingerprint::Video(video_fingerprint_file(
            path,
            &perceptual.video,
        ))),
        Content::Audio(path) => Some(Fingerprint::Audio(audio_fingerprint_file(
            path,
            &perceptual.audio,
        ))),
    }
}

/// Whether a fingerprint carries enough content to be compared.
///
/// Text needs at least `min_shingles` shingles; video and audio need at least
/// one entry; an image hash always qualifies.
pub fn has_signal(fingerprint: &Fingerprint, perceptual: &PerceptualConfig) -> bool {
    match fingerprint {
        Fingerprint::Text(set) => set.has_signal(perceptual.text.min_shingles),
        other => !other.is_empty(),
    }
}

/// SHA-256 of the raw content, used as part of the cache key.
///
/// Media files are streamed from disk; an unreadable file has no hash and is
/// simply not cached.
pub fn content_hash(content: &Content) -> Option<String> {
    match content {
        Content::Text(body) => Some(hash_text(body)),
        Content::Image { bytes, .. } => Some(hash_bytes(bytes)),
        Content::Video(path) | Content::Audio(path) => {
            let hashed = File::open(path).and_then(|file| hash_reader(BufReader::new(file)));
            match hashed {
                Ok(hash) => Some(hash),
                Err(err) => {
                    debug!(path = %path.display(), error = %err, "content_hash_unavailable");
                    None
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn text_is_normalized_before_shingling() {
        let html = Content::Text("<p>The <b>Quick</b> brown fox!</p>".into());
        let plain = Content::Text("the quick brown fox".into());
        let cfg = (CanonicalizeConfig::default(), PerceptualConfig::default());
        assert_eq!(
            extract_fingerprint(&html, &cfg.0, &cfg.1),
            extract_fingerprint(&plain, &cfg.0, &cfg.1)
        );
    }

    #[test]
    fn text_shingles_follow_normalized_words() {
        let body = "<p>Council <em>approves</em> the budget, again!</p>";
        let fp = extract_fingerprint(
            &Content::Text(body.into()),
            &CanonicalizeConfig::default(),
            &PerceptualConfig::default(),
        );
        assert_eq!(
            fp,
            Some(Fingerprint::Text(perceptual::shingle(&canonical::normalize(body), 3)))
        );
    }

    #[test]
    fn short_text_lacks_signal() {
        let cfg = PerceptualConfig::default();
        let fp = extract_fingerprint(
            &Content::Text("only four words here".into()),
            &CanonicalizeConfig::default(),
            &cfg,
        )
        .unwrap();
        // Four tokens give two shingles, under the default minimum of three.
        assert!(!has_signal(&fp, &cfg));
    }

    #[test]
    fn undecodable_image_has_no_fingerprint() {
        let content = Content::Image {
            bytes: b"not an image".to_vec(),
            mime: "image/png".into(),
        };
        assert!(extract_fingerprint(
            &content,
            &CanonicalizeConfig::default(),
            &PerceptualConfig::default()
        )
        .is_none());
    }

    #[test]
    fn media_content_hash_streams_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"fake media bytes").unwrap();
        let hash = content_hash(&Content::Video(file.path().to_path_buf())).unwrap();
        assert_eq!(hash, hash_bytes(b"fake media bytes"));
    }

    #[test]
    fn missing_media_file_has_no_hash() {
        assert!(content_hash(&Content::Audio("/definitely/not/here.mp3".into())).is_none());
    }
}
