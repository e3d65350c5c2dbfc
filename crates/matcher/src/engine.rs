use std::borrow::Cow;
use std::cmp::Ordering;
use std::sync::Arc;
use std::time::Instant;

use canonical::CanonicalizeConfig;
use chrono::{DateTime, Utc};
use perceptual::{Fingerprint, PerceptualConfig};
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use tracing::{debug, info, Level};

use crate::cache::{CacheKey, FingerprintCache};
use crate::classify::classify;
use crate::compare::compare;
use crate::extract::{content_hash, extract_fingerprint, has_signal};
use crate::metrics::ScanMetrics;
use crate::types::{
    CandidateWindow, Content, Item, ItemContent, MatchError, MatchResult, MatchType, ScanConfig,
    ScanReport,
};


/// Compares a source item against a candidate window and ranks the matches.
///
/// A scanner owns its configuration and a bounded worker pool; candidates are
/// compared concurrently on that pool. It holds no state between scans apart
/// from an optional injected [`FingerprintCache`].
pub struct Scanner {
    canonical_cfg: CanonicalizeConfig,
    perceptual_cfg: PerceptualConfig,
    scan_cfg: ScanConfig,
    pool: ThreadPool,
    cache: Option<Arc<dyn FingerprintCache>>,
    metrics: Option<Arc<dyn ScanMetrics>>,
}

enum Outcome {
    /// Similarity computed; carries the match if it reached the `low` bucket.
    Compared(Option<Ranked>),
    Skipped,
}

struct Ranked {
    result: MatchResult,
    published_at: Option<DateTime<Utc>>,
}

impl Scanner {
    /// Validate every config and build the worker pool.
    pub fn new(
        canonical_cfg: CanonicalizeConfig,
        perceptual_cfg: PerceptualConfig,
        scan_cfg: ScanConfig,
    ) -> Result<Self, MatchError> {
        canonical_cfg.validate()?;
        perceptual_cfg.validate()?;
        scan_cfg.validate()?;

        let pool = ThreadPoolBuilder::new()
            .num_threads(scan_cfg.max_workers)
            .thread_name(|i| format!("copyguard-scan-{i}"))
            .build()
            .map_err(|e| MatchError::WorkerPool(e.to_string()))?;

        Ok(Self {
            canonical_cfg,
            perceptual_cfg,
            scan_cfg,
            pool,
            cache: None,
            metrics: None,
        })
    }

    /// Scanner with default configuration everywhere.
    pub fn with_defaults() -> Result<Self, MatchError> {
        Self::new(
            CanonicalizeConfig::default(),
            PerceptualConfig::default(),
            ScanConfig::default(),
        )
    }

    /// Look fingerprints of raw content up in, and store them into, `cache`.
    pub fn with_cache(mut self, cache: Arc<dyn FingerprintCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Report every scan to `metrics`.
    pub fn with_metrics(mut self, metrics: Arc<dyn ScanMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn canonical_config(&self) -> &CanonicalizeConfig {
        &self.canonical_cfg
    }

    pub fn perceptual_config(&self) -> &PerceptualConfig {
        &self.perceptual_cfg
    }

    pub fn scan_config(&self) -> &ScanConfig {
        &self.scan_cfg
    }

    /// Fingerprint raw content with this scanner's configuration. The cache
    /// is not consulted.
    pub fn fingerprint_content(&self, content: &Content) -> Option<Fingerprint> {
        extract_fingerprint(content, &self.canonical_cfg, &self.perceptual_cfg)
    }

    /// Fingerprint of an item, going through the cache for raw content.
    pub fn fingerprint(&self, item: &Item) -> Option<Fingerprint> {
        self.resolve(item).map(Cow::into_owned)
    }

    /// Scan `source` against `window`.
    ///
    /// The source's own id is never reported. Candidates of another modality,
    /// or without enough content, are skipped. Matches below the `low`
    /// threshold are dropped; the rest are ranked by similarity, then
    /// recency (undated last), then candidate id.
    pub fn scan(&self, source: &Item, window: &CandidateWindow) -> Result<ScanReport, MatchError> {
        if source.id.trim().is_empty() {
            return Err(MatchError::InvalidConfig(
                "source id must not be empty".into(),
            ));
        }
        if window.max_candidates == Some(0) {
            return Err(MatchError::InvalidConfig(
                "max_candidates must be greater than zero when set".into(),
            ));
        }

        let start = Instant::now();
        let modality = source.modality();
        let span = tracing::span!(
            Level::INFO,
            "scan",
            source_id = %source.id,
            modality = %modality,
            window = window.candidates.len()
        );
        let _guard = span.enter();

        let source_fp = self
            .resolve(source)
            .filter(|fp| has_signal(fp, &self.perceptual_cfg));
        let Some(source_fp) = source_fp else {
            info!(
                elapsed_micros = start.elapsed().as_micros() as u64,
                "scan_insufficient_signal"
            );
            let report = ScanReport {
                source_id: source.id.clone(),
                modality,
                matches: Vec::new(),
                insufficient_signal: true,
                candidates_compared: 0,
                candidates_skipped: 0,
            };
            self.record(&report, start);
            return Ok(report);
        };

        let candidates = select_candidates(source, window);
        let outcomes: Vec<Outcome> = self.pool.install(|| {
            candidates
                .par_iter()
                .map(|candidate| self.evaluate(&source_fp, candidate))
                .collect()
        });

        let mut compared = 0usize;
        let mut skipped = 0usize;
        let mut ranked = Vec::new();
        for outcome in outcomes {
            match outcome {
                Outcome::Compared(hit) => {
                    compared += 1;
                    ranked.extend(hit);
                }
                Outcome::Skipped => skipped += 1,
            }
        }

        ranked.sort_by(|a, b| {
            b.result
                .similarity_percent
                .cmp(&a.result.similarity_percent)
                .then_with(|| newest_first(a.published_at, b.published_at))
                .then_with(|| a.result.candidate_id.cmp(&b.result.candidate_id))
        });
        if let Some(max) = self.scan_cfg.max_results {
            ranked.truncate(max);
        }

        let report = ScanReport {
            source_id: source.id.clone(),
            modality,
            matches: ranked.into_iter().map(|r| r.result).collect(),
            insufficient_signal: false,
            candidates_compared: compared,
            candidates_skipped: skipped,
        };

        info!(
            matches = report.matches.len(),
            compared,
            skipped,
            elapsed_micros = start.elapsed().as_micros() as u64,
            "scan_complete"
        );
        self.record(&report, start);
        Ok(report)
    }

    fn evaluate(&self, source_fp: &Fingerprint, candidate: &Item) -> Outcome {
        // Checked before fingerprinting so mismatched media is never decoded.
        if candidate.modality() != source_fp.modality() {
            debug!(candidate_id = %candidate.id, reason = "modality_mismatch", "candidate_skipped");
            return Outcome::Skipped;
        }
        let Some(candidate_fp) = self
            .resolve(candidate)
            .filter(|fp| has_signal(fp, &self.perceptual_cfg))
        else {
            debug!(
                candidate_id = %candidate.id,
                reason = "insufficient_signal",
                "candidate_skipped"
            );
            return Outcome::Skipped;
        };
        let Some(percent) = compare(source_fp, &candidate_fp, &self.scan_cfg) else {
            debug!(candidate_id = %candidate.id, reason = "modality_mismatch", "candidate_skipped");
            return Outcome::Skipped;
        };

        let match_type = classify(percent, &self.scan_cfg.thresholds);
        if match_type == MatchType::None {
            return Outcome::Compared(None);
        }
        Outcome::Compared(Some(Ranked {
            result: MatchResult {
                candidate_id: candidate.id.clone(),
                similarity_percent: percent,
                match_type,
            },
            published_at: candidate.published_at,
        }))
    }

    fn resolve<'a>(&self, item: &'a Item) -> Option<Cow<'a, Fingerprint>> {
        match &item.content {
            ItemContent::Fingerprint(fp) => Some(Cow::Borrowed(fp)),
            ItemContent::Raw(content) => self.fingerprint_raw(&item.id, content).map(Cow::Owned),
        }
    }

    fn fingerprint_raw(&self, id: &str, content: &Content) -> Option<Fingerprint> {
        let Some(cache) = &self.cache else {
            return self.fingerprint_content(content);
        };
        let Some(hash) = content_hash(content) else {
            return self.fingerprint_content(content);
        };

        let key = CacheKey::new(id, hash);
        if let Some(fp) = cache.get(&key) {
            debug!(content_id = %id, "fingerprint_cache_hit");
            return Some(fp);
        }
        let fp = self.fingerprint_content(content)?;
        cache.put(key, fp.clone());
        Some(fp)
    }

    fn record(&self, report: &ScanReport, start: Instant) {
        if let Some(metrics) = &self.metrics {
            metrics.record_scan(
                report.modality,
                start.elapsed(),
                report.candidates_compared,
                report.matches.len(),
            );
        }
    }
}

/// Window candidates minus the source itself, capped to the most recent
/// `max_candidates`.
fn select_candidates<'a>(source: &Item, window: &'a CandidateWindow) -> Vec<&'a Item> {
    let mut candidates: Vec<&Item> = window
        .candidates
        .iter()
        .filter(|c| c.id != source.id)
        .collect();

    let excluded = window.candidates.len() - candidates.len();
    if excluded > 0 {
        debug!(excluded, "self_match_suppressed");
    }

    if let Some(max) = window.max_candidates {
        if candidates.len() > max {
            candidates.sort_by(|a, b| newest_first(a.published_at, b.published_at));
            candidates.truncate(max);
        }
    }
    candidates
}

/// Newer timestamps first; undated items after dated ones.
fn newest_first(a: Option<DateTime<Utc>>, b: Option<DateTime<Utc>>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => b.cmp(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
