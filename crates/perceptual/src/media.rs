//! Media decoding backends built on the `ffmpeg` and `ffprobe` command-line
//! tools.
//!
//! Every subprocess runs under a deadline. When the deadline passes the child
//! is killed and whatever it already wrote to stdout is kept, so a long file
//! still yields a partial fingerprint.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use image::{DynamicImage, ImageFormat};
use thiserror::Error;
use tracing::{debug, warn};

use crate::audio::{extract_audio_fingerprint, AudioSource, MonoPcm};
use crate::config::{AudioConfig, VideoConfig};
use crate::fingerprint::{AudioChunkHashSequence, FrameHashSequence};
use crate::video::{extract_frame_hashes, VideoSource};

const FFMPEG: &str = "ffmpeg";
const FFPROBE: &str = "ffprobe";
const POLL_INTERVAL: Duration = Duration::from_millis(10);
const STDERR_TAIL: usize = 512;

/// Errors raised while decoding media.
///
/// Extractors swallow these (skipping a frame, or yielding an empty sequence)
/// after logging them.
#[derive(Debug, Error)]
pub enum MediaError {
    #[error("failed to run {program}: {source}")]
    Spawn {
        program: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} exited with {status}: {stderr}")]
    ExitStatus {
        program: &'static str,
        status: String,
        stderr: String,
    },

    #[error("unexpected probe output {0:?}")]
    Probe(String),

    #[error("frame at {second}s could not be decoded: {reason}")]
    FrameDecode { second: u32, reason: String },

    #[error("{program} produced no output before the deadline")]
    Timeout { program: &'static str },
}

/// Captured stdout of a finished (or killed) subprocess.
#[derive(Debug)]
pub(crate) struct Captured {
    pub stdout: Vec<u8>,
    pub timed_out: bool,
}

/// Run `command` to completion or until `deadline`, whichever comes first.
///
/// A non-zero exit is an error. A deadline kill is not: the caller decides
/// whether partial output is usable.
pub(crate) fn run_with_deadline(
    mut command: Command,
    program: &'static str,
    deadline: Instant,
) -> Result<Captured, MediaError> {
    let mut child = command
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|source| MediaError::Spawn { program, source })?;

    // Drain both pipes on their own threads so a chatty child never blocks.
    let stdout = child.stdout.take();
    let stderr = child.stderr.take();
    let stdout_reader = thread::spawn(move || drain(stdout));
    let stderr_reader = thread::spawn(move || drain(stderr));

    let mut timed_out = false;
    let status = loop {
        match child.try_wait() {
            Ok(Some(status)) => break Some(status),
            Ok(None) if Instant::now() >= deadline => {
                let _ = child.kill();
                let _ = child.wait();
                timed_out = true;
                break None;
            }
            Ok(None) => thread::sleep(POLL_INTERVAL),
            Err(source) => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(MediaError::Spawn { program, source });
            }
        }
    };

    let stdout = stdout_reader.join().unwrap_or_default();
    let stderr = stderr_reader.join().unwrap_or_default();

    match status {
        Some(status) if !status.success() => Err(MediaError::ExitStatus {
            program,
            status: status.to_string(),
            stderr: stderr_tail(&stderr),
        }),
        _ => Ok(Captured { stdout, timed_out }),
    }
}

fn drain<R: Read>(pipe: Option<R>) -> Vec<u8> {
    let mut buf = Vec::new();
    if let Some(mut pipe) = pipe {
        let _ = pipe.read_to_end(&mut buf);
    }
    buf
}

fn stderr_tail(stderr: &[u8]) -> String {
    let text = String::from_utf8_lossy(stderr);
    let text = text.trim();
    let start = text
        .char_indices()
        .rev()
        .nth(STDERR_TAIL)
        .map(|(i, _)| i)
        .unwrap_or(0);
    text[start..].to_string()
}

fn parse_probe_number(stdout: &[u8]) -> Result<f64, MediaError> {
    let text = String::from_utf8_lossy(stdout);
    let line = text.lines().map(str::trim).find(|l| !l.is_empty()).unwrap_or("");
    line.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| MediaError::Probe(line.to_string()))
}

fn pcm_from_f32le(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(4)
        .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect()
}

fn far_future() -> Instant {
    Instant::now() + Duration::from_secs(24 * 60 * 60)
}

/// Seekable video handle backed by `ffprobe` and `ffmpeg`.
#[derive(Debug, Clone)]
pub struct FfmpegVideo {
    path: PathBuf,
    deadline: Instant,
    duration: Option<f64>,
}

impl FfmpegVideo {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            deadline: far_future(),
            duration: None,
        }
    }

    /// Kill any decoder still running at `deadline`.
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = deadline;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl VideoSource for FfmpegVideo {
    fn duration_seconds(&mut self) -> Result<f64, MediaError> {
        if let Some(duration) = self.duration {
            return Ok(duration);
        }
        let mut cmd = Command::new(FFPROBE);
        cmd.args(["-v", "error", "-show_entries", "format=duration"])
            .args(["-of", "default=noprint_wrappers=1:nokey=1"])
            .arg(&self.path);
        let captured = run_with_deadline(cmd, FFPROBE, self.deadline)?;
        let duration = parse_probe_number(&captured.stdout)?;
        self.duration = Some(duration);
        Ok(duration)
    }

    fn frame_at(&mut self, second: u32) -> Result<DynamicImage, MediaError> {
        let mut cmd = Command::new(FFMPEG);
        cmd.args(["-v", "error", "-ss"])
            .arg(second.to_string())
            .arg("-i")
            .arg(&self.path)
            .args(["-frames:v", "1", "-f", "image2pipe", "-vcodec", "png", "-"]);
        let captured = run_with_deadline(cmd, FFMPEG, self.deadline)?;
        if captured.timed_out {
            return Err(MediaError::Timeout { program: FFMPEG });
        }
        if captured.stdout.is_empty() {
            return Err(MediaError::FrameDecode {
                second,
                reason: "no frame at this position".to_string(),
            });
        }
        image::load_from_memory_with_format(&captured.stdout, ImageFormat::Png).map_err(|err| {
            MediaError::FrameDecode {
                second,
                reason: err.to_string(),
            }
        })
    }
}

/// Audio handle backed by `ffmpeg`. Video files are accepted and their first
/// audio track is used.
#[derive(Debug, Clone)]
pub struct FfmpegAudio {
    path: PathBuf,
    deadline: Instant,
}

impl FfmpegAudio {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            deadline: far_future(),
        }
    }

    /// Kill any decoder still running at `deadline`; its partial output is kept.
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = deadline;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn decode(&self, sample_rate: Option<u32>, max_seconds: u32) -> Result<Vec<f32>, MediaError> {
        let mut cmd = Command::new(FFMPEG);
        cmd.args(["-v", "error", "-i"])
            .arg(&self.path)
            .args(["-vn", "-ac", "1"]);
        if let Some(rate) = sample_rate {
            cmd.arg("-ar").arg(rate.to_string());
        }
        cmd.arg("-t")
            .arg(max_seconds.to_string())
            .args(["-f", "f32le", "-acodec", "pcm_f32le", "-"]);

        let captured = run_with_deadline(cmd, FFMPEG, self.deadline)?;
        if captured.timed_out {
            warn!(
                path = %self.path.display(),
                decoded_bytes = captured.stdout.len(),
                "audio_decoder_deadline"
            );
        }
        Ok(pcm_from_f32le(&captured.stdout))
    }

    fn native_sample_rate(&self) -> Result<u32, MediaError> {
        let mut cmd = Command::new(FFPROBE);
        cmd.args(["-v", "error", "-select_streams", "a:0"])
            .args(["-show_entries", "stream=sample_rate"])
            .args(["-of", "default=noprint_wrappers=1:nokey=1"])
            .arg(&self.path);
        let captured = run_with_deadline(cmd, FFPROBE, self.deadline)?;
        let rate = parse_probe_number(&captured.stdout)?;
        if rate < 1.0 || rate > f64::from(u32::MAX) {
            return Err(MediaError::Probe(rate.to_string()));
        }
        Ok(rate as u32)
    }
}

impl AudioSource for FfmpegAudio {
    fn decode_mono(&mut self, sample_rate: u32, max_seconds: u32) -> Result<Vec<f32>, MediaError> {
        self.decode(Some(sample_rate), max_seconds)
    }

    fn decode_native(&mut self, max_seconds: u32) -> Result<MonoPcm, MediaError> {
        let sample_rate = self.native_sample_rate()?;
        debug!(path = %self.path.display(), sample_rate, "audio_native_decode");
        let samples = self.decode(None, max_seconds)?;
        Ok(MonoPcm {
            samples,
            sample_rate,
        })
    }
}

/// Hash one frame per second of the video file at `path`.
pub fn video_fingerprint_file(path: &Path, cfg: &VideoConfig) -> FrameHashSequence {
    let mut source = FfmpegVideo::new(path).with_deadline(Instant::now() + cfg.timeout());
    extract_frame_hashes(&mut source, cfg)
}

/// Hash one chunk per second of the audio track of the file at `path`.
pub fn audio_fingerprint_file(path: &Path, cfg: &AudioConfig) -> AudioChunkHashSequence {
    let mut source = FfmpegAudio::new(path).with_deadline(Instant::now() + cfg.timeout());
    extract_audio_fingerprint(&mut source, cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn probe_number_parsing() {
        assert_eq!(parse_probe_number(b"12.480000\n").unwrap(), 12.48);
        assert_eq!(parse_probe_number(b"\n44100\n").unwrap(), 44100.0);
        assert!(matches!(parse_probe_number(b"N/A\n"), Err(MediaError::Probe(s)) if s == "N/A"));
        assert!(parse_probe_number(b"").is_err());
    }

    #[test]
    fn f32le_decoding_drops_trailing_partial_sample() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&0.5f32.to_le_bytes());
        bytes.extend_from_slice(&(-1.0f32).to_le_bytes());
        bytes.push(0xAA);
        assert_eq!(pcm_from_f32le(&bytes), vec![0.5, -1.0]);
    }

    #[test]
    fn stderr_tail_keeps_the_end() {
        let long = "x".repeat(2000) + "final error";
        let tail = stderr_tail(long.as_bytes());
        assert!(tail.ends_with("final error"));
        assert!(tail.chars().count() <= STDERR_TAIL + 1);
    }

    #[test]
    fn missing_program_is_a_spawn_error() {
        let cmd = Command::new("copyguard-no-such-program");
        let err = run_with_deadline(cmd, "missing", far_future()).unwrap_err();
        assert!(matches!(err, MediaError::Spawn { program: "missing", .. }));
    }

    #[cfg(unix)]
    #[test]
    fn captures_stdout_of_finished_child() {
        let mut cmd = Command::new("sh");
        cmd.args(["-c", "printf abc"]);
        let captured = run_with_deadline(cmd, "sh", far_future()).unwrap();
        assert_eq!(captured.stdout, b"abc");
        assert!(!captured.timed_out);
    }

    #[cfg(unix)]
    #[test]
    fn non_zero_exit_is_reported() {
        let mut cmd = Command::new("sh");
        cmd.args(["-c", "echo broken >&2; exit 3"]);
        let err = run_with_deadline(cmd, "sh", far_future()).unwrap_err();
        match err {
            MediaError::ExitStatus { stderr, .. } => assert_eq!(stderr, "broken"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn deadline_kills_slow_child() {
        let mut cmd = Command::new("sh");
        cmd.args(["-c", "exec sleep 5"]);
        let started = Instant::now();
        let captured =
            run_with_deadline(cmd, "sh", Instant::now() + Duration::from_millis(50)).unwrap();
        assert!(captured.timed_out);
        assert!(started.elapsed() < Duration::from_secs(4));
    }
}
